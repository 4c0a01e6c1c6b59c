use serde::{Deserialize, Serialize};

/// Body of every non-2xx reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootMessage {
    pub message: String,
}

impl Default for RootMessage {
    fn default() -> Self {
        Self {
            message: "Urban Doodle synthetic analysis API, POST /analyze".into(),
        }
    }
}
