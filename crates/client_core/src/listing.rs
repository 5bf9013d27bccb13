use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{info, warn};

use crate::{
    store::{RequestStatus, SharedStore, StoreEvent},
    ReminderApi,
};

pub const LIST_FAILURE_FALLBACK: &str = "Failed to load reminders";

/// Keeps the cached reminder list in step with the backend.
pub struct ListingWorkflow {
    api: Arc<dyn ReminderApi>,
    store: SharedStore,
    activated: AtomicBool,
}

impl ListingWorkflow {
    pub fn new(api: Arc<dyn ReminderApi>, store: SharedStore) -> Self {
        Self {
            api,
            store,
            activated: AtomicBool::new(false),
        }
    }

    /// Fetches the collection the first time the view is shown. Later calls
    /// do nothing and return `false`.
    pub async fn activate(&self) -> bool {
        if self.activated.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.refresh().await;
        true
    }

    /// Explicit re-fetch. Ignored while a fetch is already in flight.
    pub async fn refresh(&self) -> RequestStatus<usize> {
        {
            let mut store = self.store.lock().await;
            if store.listing().is_loading() {
                return RequestStatus::Loading;
            }
            store.apply(StoreEvent::ListingStarted);
        }

        let result = self.api.list_reminders().await;

        let mut store = self.store.lock().await;
        match result {
            Ok(reminders) => {
                info!(count = reminders.len(), "listing: reminders loaded");
                store.apply(StoreEvent::ListingLoaded(reminders));
            }
            Err(err) => {
                warn!(error = %err, "listing: fetch failed");
                store.apply(StoreEvent::ListingFailed(
                    err.user_message(LIST_FAILURE_FALLBACK),
                ));
            }
        }
        store.listing().clone()
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
