use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::Reminder,
    error::ErrorDetail,
    protocol::{ClearRemindersResponse, CreateReminderRequest, HealthResponse},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod bulk_clear;
pub mod creation;
pub mod dictation;
pub mod error;
pub mod listing;
pub mod store;
#[cfg(test)]
mod test_support;

pub use bulk_clear::{AlwaysConfirm, BulkClearWorkflow, ClearOutcome, ConfirmationGate};
pub use creation::{CreationWorkflow, DictationOutcome, SubmitOutcome};
pub use dictation::{
    CommandRecognizer, DictationAdapter, DictationCapability, DictationSession, DictationSignal,
    DictationState, RecognitionEvent, RecognitionOptions, SpeechRecognizer,
};
pub use error::ClientError;
pub use listing::ListingWorkflow;
pub use store::{Draft, ReminderStore, RequestStatus, SharedStore, StoreEvent};

const HEALTH_PATH: &str = "";
const REMINDERS_PATH: &str = "api/reminders/";
const ALL_REMINDERS_PATH: &str = "api/all/reminders/";

/// Status reported by [`ReminderApi::check_health`] when the service cannot be
/// reached or answers with something other than a health document.
pub const UNREACHABLE_STATUS: &str = "unreachable";

/// Connection settings for the reminder backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Network(format!("invalid endpoint '{path}': {err}")))
    }
}

#[async_trait]
pub trait ReminderApi: Send + Sync {
    async fn create_reminder(&self, request: &CreateReminderRequest)
        -> Result<Reminder, ClientError>;
    /// Full current collection. Anything other than a JSON array is read as
    /// an empty collection.
    async fn list_reminders(&self) -> Result<Vec<Reminder>, ClientError>;
    async fn clear_all_reminders(&self) -> Result<ClearRemindersResponse, ClientError>;
    /// Best-effort probe; never fails. See [`UNREACHABLE_STATUS`].
    async fn check_health(&self) -> HealthResponse;
}

/// HTTP implementation of [`ReminderApi`].
pub struct ReminderClient {
    http: Client,
    config: ClientConfig,
}

impl ReminderClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_shared(self) -> Arc<dyn ReminderApi> {
        Arc::new(self)
    }

    async fn fetch_health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.config.endpoint(HEALTH_PATH)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        decode(&body, "health")
    }
}

fn rejection(status: StatusCode, body: &str) -> ClientError {
    ClientError::Validation {
        status: status.as_u16(),
        detail: ErrorDetail::from_body(body).message(),
    }
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|err| {
        warn!(error = %err, what, "malformed response body");
        ClientError::Network(format!("malformed {what} response: {err}"))
    })
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String), ClientError> {
    let status = response.status();
    let body = response.text().await.map_err(|err| {
        warn!(error = %err, status = status.as_u16(), "failed to read response body");
        ClientError::from(err)
    })?;
    Ok((status, body))
}

#[async_trait]
impl ReminderApi for ReminderClient {
    async fn create_reminder(
        &self,
        request: &CreateReminderRequest,
    ) -> Result<Reminder, ClientError> {
        let url = self.config.endpoint(REMINDERS_PATH)?;
        let response = self.http.post(url).json(request).send().await.map_err(|err| {
            warn!(error = %err, "create_reminder: request failed");
            ClientError::from(err)
        })?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            let err = rejection(status, &body);
            info!(status = status.as_u16(), "create_reminder: rejected by backend");
            return Err(err);
        }
        decode(&body, "reminder")
    }

    async fn list_reminders(&self) -> Result<Vec<Reminder>, ClientError> {
        let url = self.config.endpoint(ALL_REMINDERS_PATH)?;
        let response = self.http.get(url).send().await.map_err(|err| {
            warn!(error = %err, "list_reminders: request failed");
            ClientError::from(err)
        })?;
        let (status, body) = read_body(response).await?;
        // The backend answers an empty collection with 404 "No reminders found".
        if status == StatusCode::NOT_FOUND {
            debug!("list_reminders: backend reported no reminders");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(rejection(status, &body));
        }

        let value: serde_json::Value = decode(&body, "reminder list")?;
        match value {
            serde_json::Value::Array(_) => serde_json::from_value(value).map_err(|err| {
                warn!(error = %err, "list_reminders: malformed reminder entry");
                ClientError::Network(format!("malformed reminder list entry: {err}"))
            }),
            other => {
                warn!(kind = json_kind(&other), "list_reminders: non-array body read as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn clear_all_reminders(&self) -> Result<ClearRemindersResponse, ClientError> {
        let url = self.config.endpoint(ALL_REMINDERS_PATH)?;
        let response = self.http.delete(url).send().await.map_err(|err| {
            warn!(error = %err, "clear_all_reminders: request failed");
            ClientError::from(err)
        })?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(rejection(status, &body));
        }
        decode(&body, "clear reminders")
    }

    async fn check_health(&self) -> HealthResponse {
        match self.fetch_health().await {
            Ok(health) => health,
            Err(err) => {
                debug!(error = %err, "check_health: service unreachable");
                HealthResponse {
                    status: UNREACHABLE_STATUS.to_string(),
                    message: None,
                }
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// The three reminder workflows wired to one store.
pub struct ReminderWorkflows {
    store: SharedStore,
    pub creation: CreationWorkflow,
    pub listing: ListingWorkflow,
    pub bulk_clear: BulkClearWorkflow,
}

impl ReminderWorkflows {
    pub fn new(api: Arc<dyn ReminderApi>, dictation: DictationCapability) -> Self {
        let store = store::new_shared_store();
        Self {
            creation: CreationWorkflow::new(api.clone(), store.clone(), dictation),
            listing: ListingWorkflow::new(api.clone(), store.clone()),
            bulk_clear: BulkClearWorkflow::new(api, store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
