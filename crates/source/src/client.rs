use crate::response::parse_numbers;
use crate::NumberSource;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use winavg_config::SourceConfig;
use winavg_core::{AvgError, NumberKind, Result};

/// HTTP client for the remote test server.
///
/// Every request carries the bearer access code plus the two identifying
/// headers from config. One attempt per fetch; no retries.
#[derive(Debug, Clone)]
pub struct HttpNumberSource {
    client:      Client,
    base_url:    String,
    access_code: String,
    client_id:   String,
    client_name: String,
}

impl HttpNumberSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AvgError::Config(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url:    config.base_url.trim_end_matches('/').to_string(),
            access_code: config.access_code.clone(),
            client_id:   config.client_id.clone(),
            client_name: config.client_name.clone(),
        })
    }

    /// Full endpoint URL for `kind`.
    pub fn url_for(&self, kind: NumberKind) -> String {
        format!("{}/{}", self.base_url, kind.route())
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let mut req = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.access_code);
        if !self.client_id.is_empty() {
            req = req.header("X-Client-Id", &self.client_id);
        }
        if !self.client_name.is_empty() {
            req = req.header("X-Client-Name", &self.client_name);
        }
        req
    }

    /// Check whether the test server is reachable and accepts our credentials.
    pub async fn probe(&self) -> SourceStatus {
        let url = self.url_for(NumberKind::Random);
        match self.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => SourceStatus::Connected,
            Ok(resp) => SourceStatus::Failed(resp.status().as_u16()),
            Err(e) => {
                warn!("probe of {url} failed: {e}");
                SourceStatus::Unreachable(e.to_string())
            }
        }
    }
}

#[async_trait]
impl NumberSource for HttpNumberSource {
    async fn fetch(&self, kind: NumberKind) -> Result<Vec<i64>> {
        let url = self.url_for(kind);
        debug!("GET {url}");

        let resp = self
            .get(&url)
            .send()
            .await
            .map_err(|e| AvgError::Fetch(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AvgError::Status {
                kind,
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AvgError::Fetch(format!("read body from {url}: {e}")))?;

        let numbers = parse_numbers(&body)?;
        debug!("{kind}: fetched {} numbers", numbers.len());
        Ok(numbers)
    }
}

/// Outcome of [`HttpNumberSource::probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Connected,
    /// Server answered with a non-success status.
    Failed(u16),
    /// No HTTP answer at all.
    Unreachable(String),
}

impl SourceStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected      => f.write_str("Connected to test server"),
            Self::Failed(status) => write!(f, "Connection failed: {status}"),
            Self::Unreachable(_) => f.write_str("Could not connect to test server"),
        }
    }
}
