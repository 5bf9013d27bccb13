use thiserror::Error;

/// Notice shown when dictation is requested on a platform without speech
/// recognition.
pub const UNSUPPORTED_DICTATION_NOTICE: &str =
    "Speech recognition is not supported on this platform.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The backend answered with a non-success status. `detail` holds the
    /// backend's own explanation when it sent one.
    #[error("backend rejected request with status {status}: {}", detail.as_deref().unwrap_or("<no detail>"))]
    Validation { status: u16, detail: Option<String> },
    /// The request did not complete or its response could not be decoded.
    #[error("network error: {0}")]
    Network(String),
    #[error("speech recognition capability unavailable")]
    UnsupportedCapability,
}

impl ClientError {
    /// Display text for the user. Backend details are surfaced verbatim;
    /// transport and decoding failures are replaced by `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Validation { detail: None, .. } | Self::Network(_) => fallback.to_string(),
            Self::UnsupportedCapability => UNSUPPORTED_DICTATION_NOTICE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}
