//! Contract with the remote analysis service.
//!
//! Transport is abstracted behind [`AnalysisBackend`] so the session can be driven
//! by the HTTP client in the GUI or by canned replies in tests. Interpreting a
//! reply (status + body) into a result is a pure function of the bytes received.

use crate::contract::{AnalysisResponse, UserPolygon};
use serde::Deserialize;
use std::future::Future;

/// Shown when a non-2xx reply carries no usable `detail`.
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed";

/// Shown when the exchange with the backend did not complete.
pub const CONNECTIVITY_MESSAGE: &str =
    "Failed to connect to analysis server. Make sure the backend is running and reachable.";

/// Raw reply from the backend.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl BackendReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Why an analysis attempt did not complete. Both kinds end in the same state;
/// only the message differs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("{0}")]
    Server(String),
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity,
}

impl AnalysisError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Issues the single analysis request for a polygon.
pub trait AnalysisBackend {
    fn submit(
        &self,
        polygon: &UserPolygon,
    ) -> impl Future<Output = Result<BackendReply, TransportError>> + Send;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

fn server_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail),
        _ => None,
    }
}

/// Turns a raw reply into a response or a user-facing error.
pub fn interpret_reply(reply: &BackendReply) -> Result<AnalysisResponse, AnalysisError> {
    if !reply.is_success() {
        let message =
            server_detail(&reply.body).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        log::warn!("analysis rejected with status {}: {}", reply.status, message);
        return Err(AnalysisError::Server(message));
    }
    serde_json::from_slice::<AnalysisResponse>(&reply.body).map_err(|err| {
        log::warn!("undecodable analysis reply: {}", err);
        AnalysisError::Connectivity
    })
}

/// Submits the polygon and interprets whatever comes back.
pub async fn run_analysis<B: AnalysisBackend>(
    backend: &B,
    polygon: &UserPolygon,
) -> Result<AnalysisResponse, AnalysisError> {
    match backend.submit(polygon).await {
        Ok(reply) => interpret_reply(&reply),
        Err(err) => {
            log::warn!("analysis request failed: {}", err);
            Err(AnalysisError::Connectivity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_used_verbatim() {
        let reply = BackendReply::new(400, r#"{"detail": "Analysis zone too large"}"#);
        assert_eq!(
            interpret_reply(&reply),
            Err(AnalysisError::Server("Analysis zone too large".into()))
        );
    }

    #[test]
    fn missing_or_structured_detail_falls_back() {
        for body in [
            "",
            "<html>bad gateway</html>",
            r#"{"error": "x"}"#,
            r#"{"detail": ""}"#,
            r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#,
        ] {
            let reply = BackendReply::new(502, body);
            assert_eq!(
                interpret_reply(&reply),
                Err(AnalysisError::Server(GENERIC_FAILURE_MESSAGE.into()))
            );
        }
    }

    #[test]
    fn undecodable_success_is_not_accepted() {
        let reply = BackendReply::new(200, "{\"type\": \"FeatureCollection\"}");
        assert_eq!(interpret_reply(&reply), Err(AnalysisError::Connectivity));
        assert_eq!(AnalysisError::Connectivity.message(), CONNECTIVITY_MESSAGE);
    }
}
