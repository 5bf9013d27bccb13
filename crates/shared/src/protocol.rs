use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Body of `POST /api/reminders/`.
///
/// A `user_id` that could not be read as an integer is sent as `null` so the
/// backend reports the validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReminderRequest {
    pub user_id: Option<UserId>,
    pub raw_text: String,
}

impl CreateReminderRequest {
    pub fn from_draft(user_id: &str, raw_text: impl Into<String>) -> Self {
        Self {
            user_id: UserId::parse_lenient(user_id),
            raw_text: raw_text.into(),
        }
    }
}

/// Body returned by `DELETE /api/all/reminders/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearRemindersResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

/// Body returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
