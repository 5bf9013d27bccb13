//! Voice-to-text capture for the reminder draft.
//!
//! A [`SpeechRecognizer`] is the platform capability: it runs one recognition
//! session and reports raw [`RecognitionEvent`]s. [`DictationSession`] turns
//! that raw stream into the single-shot [`DictationSignal`] sequence the draft
//! consumes, whatever order or multiplicity the recognizer actually produces.

use std::{process::Stdio, sync::Arc};

use anyhow::{Context, Result};
use tokio::{process::Command, sync::mpsc};
use tracing::{debug, info, warn};

use crate::error::ClientError;

pub const DEFAULT_LANGUAGE: &str = "en-US";
/// Error code reported when the recognizer could not be started at all.
pub const START_FAILED_CODE: &str = "start-failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Raw events reported by a recognizer during one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    Result(String),
    Error(String),
    Ended,
}

pub trait SpeechRecognizer: Send + Sync {
    /// Begins one recognition session. The session is over once `Ended` is
    /// delivered or the returned channel closes.
    fn start(&self, options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DictationState {
    #[default]
    Idle,
    Listening,
    /// Back to idle after a recognition error.
    Failed { code: String },
}

impl DictationState {
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Listening)
    }
}

/// Normalized session signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationSignal {
    ListeningStarted,
    Transcript(String),
    Failed { code: String },
    /// Terminal; always the last signal of a session.
    Ended,
}

pub struct DictationSession {
    events: mpsc::Receiver<RecognitionEvent>,
    state: DictationState,
    transcript_delivered: bool,
    finished: bool,
}

impl DictationSession {
    fn new(events: mpsc::Receiver<RecognitionEvent>) -> Self {
        Self {
            events,
            state: DictationState::Idle,
            transcript_delivered: false,
            finished: false,
        }
    }

    fn failed_to_start() -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 on a fresh channel; the send cannot fail.
        let _ = tx.try_send(RecognitionEvent::Error(START_FAILED_CODE.to_string()));
        Self::new(rx)
    }

    pub fn state(&self) -> &DictationState {
        &self.state
    }

    /// Next signal of the session, or `None` once `Ended` has been returned.
    pub async fn next_signal(&mut self) -> Option<DictationSignal> {
        while !self.finished {
            let Some(event) = self.events.recv().await else {
                return Some(self.finish());
            };

            match event {
                RecognitionEvent::Started => {
                    if self.state != DictationState::Idle || self.transcript_delivered {
                        continue;
                    }
                    self.state = DictationState::Listening;
                    return Some(DictationSignal::ListeningStarted);
                }
                RecognitionEvent::Result(transcript) => {
                    let transcript = transcript.trim().to_string();
                    if self.transcript_delivered
                        || transcript.is_empty()
                        || matches!(self.state, DictationState::Failed { .. })
                    {
                        debug!("dictation: dropping extra or empty result");
                        continue;
                    }
                    self.transcript_delivered = true;
                    self.state = DictationState::Idle;
                    return Some(DictationSignal::Transcript(transcript));
                }
                RecognitionEvent::Error(code) => {
                    if self.transcript_delivered
                        || matches!(self.state, DictationState::Failed { .. })
                    {
                        debug!(code = %code, "dictation: ignoring error after outcome");
                        continue;
                    }
                    warn!(code = %code, "dictation: recognition error");
                    self.state = DictationState::Failed { code: code.clone() };
                    return Some(DictationSignal::Failed { code });
                }
                RecognitionEvent::Ended => return Some(self.finish()),
            }
        }
        None
    }

    fn finish(&mut self) -> DictationSignal {
        self.finished = true;
        if self.state.is_listening() {
            self.state = DictationState::Idle;
        }
        DictationSignal::Ended
    }
}

#[derive(Clone)]
pub struct DictationAdapter {
    recognizer: Arc<dyn SpeechRecognizer>,
    options: RecognitionOptions,
}

impl DictationAdapter {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, options: RecognitionOptions) -> Self {
        Self {
            recognizer,
            options,
        }
    }

    pub fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// Starts one single-shot session. A recognizer that fails to start
    /// yields a session that reports a [`START_FAILED_CODE`] error and ends.
    pub fn activate(&self) -> DictationSession {
        match self.recognizer.start(&self.options) {
            Ok(events) => DictationSession::new(events),
            Err(err) => {
                warn!(error = %err, "dictation: recognizer failed to start");
                DictationSession::failed_to_start()
            }
        }
    }
}

/// Whether the platform offers speech recognition.
#[derive(Clone, Default)]
pub enum DictationCapability {
    Available(DictationAdapter),
    #[default]
    Unavailable,
}

impl DictationCapability {
    pub fn detect(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        options: RecognitionOptions,
    ) -> Self {
        match recognizer {
            Some(recognizer) => Self::Available(DictationAdapter::new(recognizer, options)),
            None => Self::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn adapter(&self) -> Result<&DictationAdapter, ClientError> {
        match self {
            Self::Available(adapter) => Ok(adapter),
            Self::Unavailable => Err(ClientError::UnsupportedCapability),
        }
    }
}

/// Recognizer backed by an external speech-to-text program.
///
/// The program receives the language tag in `DICTATION_LANGUAGE`, records one
/// utterance, and prints the transcript on stdout. A non-zero exit is an
/// error; empty output is silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a whitespace-separated command line. Returns `None` when blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(&self, options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .env("DICTATION_LANGUAGE", &options.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn dictation command '{}'", self.program))?;

        let (tx, rx) = mpsc::channel(4);
        let program = self.program.clone();
        tokio::spawn(async move {
            let _ = tx.send(RecognitionEvent::Started).await;
            match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if transcript.is_empty() {
                        info!(program = %program, "dictation: no speech detected");
                    } else {
                        let _ = tx.send(RecognitionEvent::Result(transcript)).await;
                    }
                }
                Ok(output) => {
                    let code = output
                        .status
                        .code()
                        .map(|code| format!("exit-{code}"))
                        .unwrap_or_else(|| "terminated".to_string());
                    let _ = tx.send(RecognitionEvent::Error(code)).await;
                }
                Err(err) => {
                    warn!(program = %program, error = %err, "dictation: command failed");
                    let _ = tx.send(RecognitionEvent::Error("io".to_string())).await;
                }
            }
            let _ = tx.send(RecognitionEvent::Ended).await;
        });
        Ok(rx)
    }
}

#[cfg(test)]
#[path = "tests/dictation_tests.rs"]
mod tests;
