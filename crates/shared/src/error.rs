use serde::{Deserialize, Serialize};

/// One entry of a framework-generated validation failure
/// (`{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailBody {
    Text(String),
    Issues(Vec<ValidationIssue>),
    Other(serde_json::Value),
}

/// Failure body returned by the backend on non-success statuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<DetailBody>,
}

impl ErrorDetail {
    pub fn text(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(DetailBody::Text(detail.into())),
        }
    }

    /// Parses a failure body, yielding an empty detail for anything that is
    /// not the expected JSON object.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Human-readable detail, if the backend supplied one.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            DetailBody::Text(text) if text.trim().is_empty() => None,
            DetailBody::Text(text) => Some(text.clone()),
            DetailBody::Issues(issues) if issues.is_empty() => None,
            DetailBody::Issues(issues) => Some(
                issues
                    .iter()
                    .map(|issue| issue.msg.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            DetailBody::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_detail_is_returned_verbatim() {
        let detail = ErrorDetail::from_body(r#"{"detail":"user_id must be a positive integer"}"#);
        assert_eq!(
            detail.message().as_deref(),
            Some("user_id must be a positive integer")
        );
    }

    #[test]
    fn validation_list_is_flattened() {
        let detail = ErrorDetail::from_body(
            r#"{"detail":[{"loc":["body","user_id"],"msg":"Input should be a valid integer","type":"int_type"},{"loc":["body","raw_text"],"msg":"Field required","type":"missing"}]}"#,
        );
        assert_eq!(
            detail.message().as_deref(),
            Some("Input should be a valid integer; Field required")
        );
    }

    #[test]
    fn unparseable_body_has_no_message() {
        assert_eq!(ErrorDetail::from_body("<html>oops</html>").message(), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":{"code":3}}"#).message(), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":"  "}"#).message(), None);
    }
}
