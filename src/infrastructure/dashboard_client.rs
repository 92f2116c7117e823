// HTTP implementation of the dashboard API
use crate::application::dashboard_api::{DashboardApi, FetchError};
use crate::domain::dashboard::DashboardPayload;
use crate::infrastructure::http_response::ApiEnvelope;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub struct HttpDashboardApi {
    http_client: Client,
    base_url: String,
}

impl HttpDashboardApi {
    /// Requests carry no deadline of their own; the session bounds each fetch.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` and unwrap the `data` of a successful envelope.
    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Prefer the envelope's message over the raw body
            let body = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or(text);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(FetchError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| FetchError::Decode("response has no data".to_string()))
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn list_devices(&self) -> Result<Vec<String>, FetchError> {
        self.get_data("/api/waterjets").await
    }

    async fn list_dates(&self, device: &str) -> Result<Vec<String>, FetchError> {
        let path = format!("/api/waterjets/{}/dates", urlencoding::encode(device));
        self.get_data(&path).await
    }

    async fn get_payload(&self, device: &str, date: &str) -> Result<DashboardPayload, FetchError> {
        let date = urlencoding::encode(date);
        let path = format!(
            "/api/dashboard/history?start_date={}&end_date={}&waterjet_id={}",
            date,
            date,
            urlencoding::encode(device)
        );
        self.get_data(&path).await
    }
}
