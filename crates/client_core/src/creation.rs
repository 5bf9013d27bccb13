use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{domain::Reminder, protocol::CreateReminderRequest};
use tracing::{debug, info, warn};

use crate::{
    dictation::{DictationCapability, DictationSignal},
    error::ClientError,
    store::{SharedStore, StoreEvent},
    ReminderApi,
};

pub const CREATE_FAILURE_FALLBACK: &str = "Failed to schedule reminder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Reminder),
    Rejected(String),
    /// Draft incomplete or a submission already in flight; nothing was sent.
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationOutcome {
    Transcript(String),
    /// The session ended without speech.
    Silence,
    Failed { code: String },
    /// Another session is still running.
    Busy,
}

/// Composes and submits a single new reminder.
pub struct CreationWorkflow {
    api: Arc<dyn ReminderApi>,
    store: SharedStore,
    dictation: DictationCapability,
    dictating: AtomicBool,
}

/// Releases the dictation slot when the session ends or is dropped.
struct DictationSlot<'a>(&'a AtomicBool);

impl Drop for DictationSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CreationWorkflow {
    pub fn new(api: Arc<dyn ReminderApi>, store: SharedStore, dictation: DictationCapability) -> Self {
        Self {
            api,
            store,
            dictation,
            dictating: AtomicBool::new(false),
        }
    }

    pub fn dictation_available(&self) -> bool {
        self.dictation.is_available()
    }

    pub async fn edit_user_id(&self, user_id: impl Into<String>) {
        self.store
            .lock()
            .await
            .apply(StoreEvent::UserIdEdited(user_id.into()));
    }

    pub async fn edit_text(&self, text: impl Into<String>) {
        self.store.lock().await.apply(StoreEvent::TextEdited(text.into()));
    }

    pub async fn can_submit(&self) -> bool {
        self.store.lock().await.can_submit()
    }

    pub async fn submit(&self) -> SubmitOutcome {
        // Reset and snapshot under one lock so no stale status is visible
        // once the request is out.
        let request = {
            let mut store = self.store.lock().await;
            if !store.can_submit() {
                debug!("creation: submit ignored, draft incomplete or request in flight");
                return SubmitOutcome::NotReady;
            }
            store.apply(StoreEvent::SubmitStarted);
            let draft = store.draft();
            CreateReminderRequest::from_draft(&draft.user_id, draft.text.clone())
        };

        info!(user_id = ?request.user_id, "creation: submitting reminder");
        let result = self.api.create_reminder(&request).await;

        let mut store = self.store.lock().await;
        match result {
            Ok(reminder) => {
                info!(
                    user_id = reminder.user_id.0,
                    scheduled_time = %reminder.scheduled_time,
                    "creation: reminder scheduled"
                );
                store.apply(StoreEvent::SubmitSucceeded(reminder.clone()));
                SubmitOutcome::Created(reminder)
            }
            Err(err) => {
                warn!(error = %err, "creation: submit failed");
                let message = err.user_message(CREATE_FAILURE_FALLBACK);
                store.apply(StoreEvent::SubmitFailed(message.clone()));
                SubmitOutcome::Rejected(message)
            }
        }
    }

    /// Runs one dictation session, appending its transcript to the draft.
    ///
    /// Fails with [`ClientError::UnsupportedCapability`] before touching any
    /// state when the platform has no speech recognition.
    pub async fn dictate(&self) -> Result<DictationOutcome, ClientError> {
        let adapter = self.dictation.adapter()?;
        // Claimed until the session's last signal, not just until the
        // recognizer reports that it started.
        if self
            .dictating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("creation: dictation ignored, session already running");
            return Ok(DictationOutcome::Busy);
        }
        let _slot = DictationSlot(&self.dictating);
        self.store
            .lock()
            .await
            .apply(StoreEvent::Dictation(DictationSignal::ListeningStarted));

        let mut session = adapter.activate();
        let mut outcome = DictationOutcome::Silence;
        while let Some(signal) = session.next_signal().await {
            match &signal {
                DictationSignal::Transcript(transcript) => {
                    outcome = DictationOutcome::Transcript(transcript.clone());
                }
                DictationSignal::Failed { code } => {
                    outcome = DictationOutcome::Failed { code: code.clone() };
                }
                DictationSignal::ListeningStarted | DictationSignal::Ended => {}
            }
            self.store.lock().await.apply(StoreEvent::Dictation(signal));
        }
        debug!(?outcome, "creation: dictation session finished");
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/creation_tests.rs"]
mod tests;
