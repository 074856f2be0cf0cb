use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::api::{ActiveAlerts, Alert, DeviceGroup};
use crate::config::{DashboardSettings, TopologyView};
use crate::topology::TopologySnapshot;

const RETRY_BASE_DELAY_MS: u64 = 250;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("API request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
}

impl ApiClientError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(error) => {
                error.is_timeout() || error.is_connect() || error.is_request()
            }
            Self::HttpStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopologyApiClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
    max_retries: u32,
}

impl TopologyApiClient {
    pub fn new(settings: &DashboardSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: settings.api_base_url.trim_end_matches('/').to_owned(),
            timeout_ms: settings.http_timeout_ms,
            max_retries: settings.http_max_retries,
        }
    }

    pub async fn fetch_topology(
        &self,
        view: TopologyView,
        group_id: Option<u64>,
    ) -> Result<TopologySnapshot, ApiClientError> {
        let url = topology_url(&self.base_url, view, group_id);
        self.get_json(&url).await
    }

    pub async fn fetch_active_alerts(&self) -> Result<Vec<Alert>, ApiClientError> {
        let url = format!("{}/alerts/active", self.base_url);
        let payload: ActiveAlerts = self.get_json(&url).await?;
        Ok(payload.alerts)
    }

    pub async fn fetch_groups(&self) -> Result<Vec<DeviceGroup>, ApiClientError> {
        let url = format!("{}/groups", self.base_url);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiClientError> {
        let total_attempts = self.max_retries.saturating_add(1);
        let mut attempt: u32 = 1;

        loop {
            let result = self.get_json_once(url).await;
            match result {
                Ok(payload) => return Ok(payload),
                Err(error) => {
                    let should_retry = attempt < total_attempts && error.is_retryable();
                    if !should_retry {
                        return Err(error);
                    }

                    let delay_ms = retry_delay_ms(attempt);
                    warn!(
                        url,
                        attempt,
                        total_attempts,
                        delay_ms,
                        error = %error,
                        "API request failed; retrying"
                    );

                    sleep(Duration::from_millis(delay_ms)).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiClientError> {
        debug!(url, "sending API request");
        let timeout_duration = Duration::from_millis(self.timeout_ms);
        let request = self.http_client.get(url).send();
        let response = match timeout(timeout_duration, request).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ApiClientError::Timeout {
                    timeout_ms: self.timeout_ms,
                });
            }
        };

        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

fn topology_url(base_url: &str, view: TopologyView, group_id: Option<u64>) -> String {
    let mut url = format!("{base_url}/topology?view={view}");
    if let Some(group_id) = group_id {
        url.push_str(&format!("&group_id={group_id}"));
    }
    url
}

fn retry_delay_ms(attempt: u32) -> u64 {
    let exponent = attempt.saturating_sub(1).min(5);
    RETRY_BASE_DELAY_MS.saturating_mul(1_u64 << exponent)
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error response body>".to_owned());
    Err(ApiClientError::HttpStatus { status, body })
}
