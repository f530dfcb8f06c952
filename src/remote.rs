use std::future::Future;
use std::time::Duration;

use log::debug;
use thiserror::Error;

use crate::messages::BeaconSnapshot;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {0} from status endpoint")]
    Status(u16),
    #[error("malformed status body: {0}")]
    Decode(String),
}

/// Source of beacon snapshots. One call is one request; callers never retry.
pub trait RemoteStateClient: Send + Sync {
    fn poll(&self) -> impl Future<Output = Result<BeaconSnapshot, PollError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpStateClient {
    client: reqwest::Client,
    url: String,
}

impl HttpStateClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PollError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(HttpStateClient { client, url })
    }
}

impl RemoteStateClient for HttpStateClient {
    async fn poll(&self) -> Result<BeaconSnapshot, PollError> {
        debug!("Polling {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PollError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;
        parse_snapshot(&body)
    }
}

fn parse_snapshot(body: &[u8]) -> Result<BeaconSnapshot, PollError> {
    serde_json::from_slice(body).map_err(|e| PollError::Decode(e.to_string()))
}
