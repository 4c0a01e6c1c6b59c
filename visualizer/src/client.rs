use doodlecore::backend::{BackendReply, TransportError};
use doodlecore::config::ClientConfig;
use doodlecore::{AnalysisBackend, UserPolygon};

/// Posts zones to `{API_BASE}/analyze`. No timeout: a request runs until the
/// server answers or the connection fails.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    analyze_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            analyze_url: config.analyze_url(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }
}

impl AnalysisBackend for HttpBackend {
    async fn submit(&self, polygon: &UserPolygon) -> Result<BackendReply, TransportError> {
        let response = self
            .client
            .post(&self.analyze_url)
            .json(polygon)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(BackendReply::new(status, body.to_vec()))
    }
}

/// Downloads the static satellite image for one viewport.
pub async fn fetch_basemap(client: reqwest::Client, url: String) -> Result<Vec<u8>, String> {
    let response = client
        .get(&url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| e.to_string())?;
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}
