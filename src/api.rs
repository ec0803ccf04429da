use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;

/// The third-party feed the service proxies. Payloads come back as raw JSON
/// because every endpoint names its fields differently.
#[async_trait]
pub trait LotterySource: Send + Sync {
    /// The draw currently in progress (fields may still be `--`).
    async fn fetch_live(&self) -> Result<Value, UpstreamError>;

    /// Today's draws as shown next to the live result.
    async fn fetch_today(&self) -> Result<Value, UpstreamError>;

    /// The batch results endpoint.
    async fn fetch_results(&self) -> Result<Value, UpstreamError>;

    async fn fetch_history(&self, date: &str) -> Result<Value, UpstreamError>;
}

pub struct HttpSource {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpSource {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value, UpstreamError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        Ok(payload)
    }
}

#[async_trait]
impl LotterySource for HttpSource {
    async fn fetch_live(&self) -> Result<Value, UpstreamError> {
        debug!("GET {}", self.config.live_url);
        self.get_json(self.client.get(&self.config.live_url)).await
    }

    async fn fetch_today(&self) -> Result<Value, UpstreamError> {
        debug!("GET {}", self.config.today_url);
        self.get_json(self.client.get(&self.config.today_url)).await
    }

    async fn fetch_results(&self) -> Result<Value, UpstreamError> {
        debug!("GET {}", self.config.results_url);
        self.get_json(self.client.get(&self.config.results_url))
            .await
    }

    async fn fetch_history(&self, date: &str) -> Result<Value, UpstreamError> {
        debug!("GET {}?date={}", self.config.history_url, date);
        let request = self
            .client
            .get(&self.config.history_url)
            .query(&[("date", date)]);
        self.get_json(request).await
    }
}
