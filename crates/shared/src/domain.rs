use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);

impl UserId {
    /// Converts a raw form value the way the reminder form does: surrounding
    /// whitespace is ignored and anything that is not an integer yields `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted reminder as returned by the backend.
///
/// `scheduled_time` is computed and formatted server-side; the client treats it
/// as an opaque display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub user_id: UserId,
    pub original_text: String,
    pub scheduled_time: String,
}
