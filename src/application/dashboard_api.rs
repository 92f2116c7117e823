// Dashboard API - The three calls the dashboard front end depends on
use crate::domain::dashboard::DashboardPayload;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("server reported failure: {0}")]
    Rejected(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{operation} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Device identifiers in the order the backend returns them
    async fn list_devices(&self) -> Result<Vec<String>, FetchError>;

    /// Dates (`YYYY-MM-DD`) with data for a device
    async fn list_dates(&self, device: &str) -> Result<Vec<String>, FetchError>;

    /// Full dashboard payload for one device and date
    async fn get_payload(&self, device: &str, date: &str) -> Result<DashboardPayload, FetchError>;
}
