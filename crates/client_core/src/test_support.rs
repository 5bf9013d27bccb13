//! In-memory doubles for the workflow seams.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Reminder, UserId},
    protocol::{ClearRemindersResponse, CreateReminderRequest, HealthResponse},
};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::{
    bulk_clear::ConfirmationGate,
    dictation::{RecognitionEvent, RecognitionOptions, SpeechRecognizer},
    error::ClientError,
    ReminderApi,
};

pub(crate) fn reminder(user_id: i64, text: &str, scheduled_time: &str) -> Reminder {
    Reminder {
        user_id: UserId(user_id),
        original_text: text.to_string(),
        scheduled_time: scheduled_time.to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    create_results: Mutex<VecDeque<Result<Reminder, ClientError>>>,
    list_results: Mutex<VecDeque<Result<Vec<Reminder>, ClientError>>>,
    clear_results: Mutex<VecDeque<Result<ClearRemindersResponse, ClientError>>>,
    pub(crate) create_requests: Mutex<Vec<CreateReminderRequest>>,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) clear_calls: AtomicUsize,
    /// When set, the next call waits for this before answering.
    hold: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) async fn push_create(&self, result: Result<Reminder, ClientError>) {
        self.create_results.lock().await.push_back(result);
    }

    pub(crate) async fn push_list(&self, result: Result<Vec<Reminder>, ClientError>) {
        self.list_results.lock().await.push_back(result);
    }

    pub(crate) async fn push_clear(&self, result: Result<ClearRemindersResponse, ClientError>) {
        self.clear_results.lock().await.push_back(result);
    }

    /// Makes the next call block until the returned sender fires.
    pub(crate) async fn hold_next_call(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock().await = Some(rx);
        tx
    }

    async fn enter(&self) {
        let hold = self.hold.lock().await.take();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
    }
}

fn unscripted(call: &str) -> ClientError {
    ClientError::Network(format!("no scripted result for {call}"))
}

#[async_trait]
impl ReminderApi for FakeApi {
    async fn create_reminder(
        &self,
        request: &CreateReminderRequest,
    ) -> Result<Reminder, ClientError> {
        self.create_requests.lock().await.push(request.clone());
        self.enter().await;
        self.create_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("create_reminder")))
    }

    async fn list_reminders(&self) -> Result<Vec<Reminder>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        self.list_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("list_reminders")))
    }

    async fn clear_all_reminders(&self) -> Result<ClearRemindersResponse, ClientError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        self.clear_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("clear_all_reminders")))
    }

    async fn check_health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            message: None,
        }
    }
}

/// Recognizer that replays a fixed event script per session.
pub(crate) struct ScriptedRecognizer {
    script: Vec<RecognitionEvent>,
    fail_to_start: bool,
    hold_open: bool,
    open_senders: std::sync::Mutex<Vec<mpsc::Sender<RecognitionEvent>>>,
    pub(crate) sessions: AtomicUsize,
    pub(crate) last_options: std::sync::Mutex<Option<RecognitionOptions>>,
}

impl ScriptedRecognizer {
    fn build(script: Vec<RecognitionEvent>, fail_to_start: bool, hold_open: bool) -> Arc<Self> {
        Arc::new(Self {
            script,
            fail_to_start,
            hold_open,
            open_senders: std::sync::Mutex::new(Vec::new()),
            sessions: AtomicUsize::new(0),
            last_options: std::sync::Mutex::new(None),
        })
    }

    pub(crate) fn new(script: Vec<RecognitionEvent>) -> Arc<Self> {
        Self::build(script, false, false)
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::build(Vec::new(), true, false)
    }

    /// Replays the script, then keeps each session open until [`Self::release`].
    pub(crate) fn held_open(script: Vec<RecognitionEvent>) -> Arc<Self> {
        Self::build(script, false, true)
    }

    /// Closes every held session's event channel.
    pub(crate) fn release(&self) {
        if let Ok(mut senders) = self.open_senders.lock() {
            senders.clear();
        }
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_options.lock() {
            *last = Some(options.clone());
        }
        if self.fail_to_start {
            return Err(anyhow!("microphone permission denied"));
        }
        let (tx, rx) = mpsc::channel(self.script.len().max(1));
        for event in &self.script {
            tx.try_send(event.clone())
                .map_err(|err| anyhow!("script overflow: {err}"))?;
        }
        if self.hold_open {
            if let Ok(mut senders) = self.open_senders.lock() {
                senders.push(tx);
            }
        }
        Ok(rx)
    }
}

pub(crate) struct FixedGate {
    answer: bool,
    pub(crate) prompts: std::sync::Mutex<Vec<String>>,
}

impl FixedGate {
    pub(crate) fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn times_asked(&self) -> usize {
        self.prompts.lock().map(|prompts| prompts.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ConfirmationGate for FixedGate {
    async fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answer
    }
}
