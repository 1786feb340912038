use async_trait::async_trait;
use reqwest::{Client, Url, header};

use super::wire;
use crate::application::ports::RemoteEventSource;
use crate::domain::entities::Event;
use crate::shared::{ApiConfig, AppError};

/// HTTP GET でイベント一覧を取得するリモートソース
#[derive(Clone)]
pub struct HttpEventSource {
    client: Client,
    base_url: String,
    events_path: String,
}

impl HttpEventSource {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        // リクエスト単位は短く、全体はそれより長く
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .read_timeout(config.request_timeout())
            .timeout(config.resource_timeout())
            .build()
            .map_err(|err| {
                AppError::ConfigurationError(format!("Failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            events_path: config.events_path.clone(),
        })
    }

    pub fn endpoint_url(&self) -> Result<Url, AppError> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            self.events_path.trim().trim_start_matches('/')
        );
        let url = Url::parse(&raw)
            .map_err(|err| AppError::InvalidRequest(format!("Invalid endpoint {raw:?}: {err}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AppError::InvalidRequest(format!(
                "Unsupported scheme {other:?} in {raw:?}"
            ))),
        }
    }
}

#[async_trait]
impl RemoteEventSource for HttpEventSource {
    async fn fetch_events(&self) -> Result<Vec<Event>, AppError> {
        let url = self.endpoint_url()?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Event request to {} rejected: HTTP {}", url, status);
            return Err(AppError::RemoteRejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(classify_transport_error)?;
        let events = wire::decode_events(&body)
            .map_err(|err| AppError::DecodeFailed(err.to_string()))?;

        tracing::info!("Fetched {} events from {}", events.len(), url);
        Ok(events)
    }
}

fn classify_transport_error(err: reqwest::Error) -> AppError {
    if err.is_builder() {
        AppError::InvalidRequest(err.to_string())
    } else if err.is_decode() {
        AppError::DecodeFailed(err.to_string())
    } else if err.is_timeout() {
        AppError::RemoteUnavailable(format!("Request timed out: {err}"))
    } else {
        AppError::RemoteUnavailable(err.to_string())
    }
}
