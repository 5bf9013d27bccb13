//! Client-side reminder state and the reducer that mutates it.
//!
//! Each workflow owns one slice: creation owns the draft, its request status
//! and the dictation state; listing and bulk-clear share the cached list. All
//! mutations go through [`ReminderStore::apply`].

use std::sync::Arc;

use shared::domain::Reminder;
use tokio::sync::Mutex;

use crate::dictation::{DictationSignal, DictationState};

pub type SharedStore = Arc<Mutex<ReminderStore>>;

pub fn new_shared_store() -> SharedStore {
    Arc::new(Mutex::new(ReminderStore::default()))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> RequestStatus<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Unsaved form input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub user_id: String,
    pub text: String,
}

impl Draft {
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_empty() && !self.text.is_empty()
    }

    pub fn append_transcript(&mut self, transcript: &str) {
        self.text = compose_transcript(&self.text, transcript);
    }
}

/// Appends a dictated transcript to existing text, one space apart.
pub fn compose_transcript(existing: &str, transcript: &str) -> String {
    if existing.is_empty() {
        transcript.to_string()
    } else {
        format!("{existing} {transcript}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    UserIdEdited(String),
    TextEdited(String),
    Dictation(DictationSignal),
    SubmitStarted,
    SubmitSucceeded(Reminder),
    SubmitFailed(String),
    ListingStarted,
    ListingLoaded(Vec<Reminder>),
    ListingFailed(String),
    ClearStarted,
    ClearSucceeded(String),
    ClearFailed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ReminderStore {
    draft: Draft,
    creation: RequestStatus<Reminder>,
    dictation: DictationState,
    reminders: Vec<Reminder>,
    listing: RequestStatus<usize>,
    clear: RequestStatus<String>,
}

impl ReminderStore {
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::UserIdEdited(user_id) => self.draft.user_id = user_id,
            StoreEvent::TextEdited(text) => self.draft.text = text,
            StoreEvent::Dictation(signal) => self.apply_dictation(signal),
            StoreEvent::SubmitStarted => self.creation = RequestStatus::Loading,
            StoreEvent::SubmitSucceeded(reminder) => {
                self.creation = RequestStatus::Success(reminder);
                self.draft.text.clear();
            }
            StoreEvent::SubmitFailed(message) => self.creation = RequestStatus::Error(message),
            StoreEvent::ListingStarted => self.listing = RequestStatus::Loading,
            StoreEvent::ListingLoaded(reminders) => {
                self.listing = RequestStatus::Success(reminders.len());
                self.reminders = reminders;
            }
            // The last good list stays visible next to the error.
            StoreEvent::ListingFailed(message) => self.listing = RequestStatus::Error(message),
            StoreEvent::ClearStarted => self.clear = RequestStatus::Loading,
            StoreEvent::ClearSucceeded(message) => {
                self.reminders.clear();
                self.clear = RequestStatus::Success(message);
            }
            StoreEvent::ClearFailed(message) => self.clear = RequestStatus::Error(message),
        }
    }

    fn apply_dictation(&mut self, signal: DictationSignal) {
        match signal {
            DictationSignal::ListeningStarted => self.dictation = DictationState::Listening,
            DictationSignal::Transcript(transcript) => {
                self.draft.append_transcript(&transcript);
                self.dictation = DictationState::Idle;
            }
            DictationSignal::Failed { code } => self.dictation = DictationState::Failed { code },
            DictationSignal::Ended => {
                if self.dictation.is_listening() {
                    self.dictation = DictationState::Idle;
                }
            }
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn creation(&self) -> &RequestStatus<Reminder> {
        &self.creation
    }

    pub fn last_created(&self) -> Option<&Reminder> {
        self.creation.success()
    }

    pub fn creation_error(&self) -> Option<&str> {
        self.creation.error()
    }

    pub fn dictation(&self) -> &DictationState {
        &self.dictation
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn listing(&self) -> &RequestStatus<usize> {
        &self.listing
    }

    pub fn clear_status(&self) -> &RequestStatus<String> {
        &self.clear
    }

    pub fn can_submit(&self) -> bool {
        self.draft.is_complete() && !self.creation.is_loading()
    }

    pub fn can_clear(&self) -> bool {
        !self.reminders.is_empty() && !self.clear.is_loading()
    }
}
