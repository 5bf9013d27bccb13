use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    store::{SharedStore, StoreEvent},
    ReminderApi,
};

pub const CLEAR_CONFIRMATION_PROMPT: &str =
    "Are you sure you want to delete all reminders? This cannot be undone.";
pub const CLEAR_SUCCESS_FALLBACK: &str = "All reminders cleared.";
pub const CLEAR_FAILURE_FALLBACK: &str = "Failed to clear reminders";

/// Blocking yes/no gate shown before an irreversible action.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Gate for callers that already obtained consent, e.g. a `--yes` flag.
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmationGate for AlwaysConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing cached or a clear already in flight; the gate was not shown.
    Disabled,
    Declined,
    Cleared {
        message: String,
        deleted_count: Option<u64>,
    },
    Failed(String),
}

pub struct BulkClearWorkflow {
    api: Arc<dyn ReminderApi>,
    store: SharedStore,
}

impl BulkClearWorkflow {
    pub fn new(api: Arc<dyn ReminderApi>, store: SharedStore) -> Self {
        Self { api, store }
    }

    pub async fn is_enabled(&self) -> bool {
        self.store.lock().await.can_clear()
    }

    pub async fn clear_all(&self, gate: &dyn ConfirmationGate) -> ClearOutcome {
        if !self.is_enabled().await {
            return ClearOutcome::Disabled;
        }
        if !gate.confirm(CLEAR_CONFIRMATION_PROMPT).await {
            info!("bulk_clear: declined by user");
            return ClearOutcome::Declined;
        }

        {
            // The list may have changed while the gate was open.
            let mut store = self.store.lock().await;
            if !store.can_clear() {
                return ClearOutcome::Disabled;
            }
            store.apply(StoreEvent::ClearStarted);
        }

        let result = self.api.clear_all_reminders().await;

        let mut store = self.store.lock().await;
        match result {
            Ok(response) => {
                info!(deleted_count = ?response.deleted_count, "bulk_clear: reminders cleared");
                let message = response
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| CLEAR_SUCCESS_FALLBACK.to_string());
                store.apply(StoreEvent::ClearSucceeded(message.clone()));
                ClearOutcome::Cleared {
                    message,
                    deleted_count: response.deleted_count,
                }
            }
            Err(err) => {
                warn!(error = %err, "bulk_clear: clear failed");
                let message = err.user_message(CLEAR_FAILURE_FALLBACK);
                store.apply(StoreEvent::ClearFailed(message.clone()));
                ClearOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/bulk_clear_tests.rs"]
mod tests;
