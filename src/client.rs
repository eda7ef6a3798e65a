// src/client.rs

use crate::error::DownloadError;
use crate::models::ByteRange;
use reqwest::{Client, Proxy, Response};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("chunkget/", env!("CARGO_PKG_VERSION"));

/// Where outgoing requests are routed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProxySetting {
    /// Whatever the environment (`HTTP_PROXY` and friends) says.
    #[default]
    System,
    /// Connect directly, ignoring the environment.
    Disabled,
    /// All traffic through this proxy URL.
    Url(String),
}

/// Transport settings, built once at startup and handed to [`TransferClient::new`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub proxy: ProxySetting,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy: ProxySetting::System,
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl TransportConfig {
    pub fn with_proxy(mut self, proxy: ProxySetting) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Thin wrapper over a shared `reqwest::Client` that knows how to ask for byte ranges.
/// Responses are handed back as-is; callers decide what a status code means.
#[derive(Debug, Clone)]
pub struct TransferClient {
    client: Client,
}

impl TransferClient {
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        match &config.proxy {
            ProxySetting::System => {}
            ProxySetting::Disabled => builder = builder.no_proxy(),
            ProxySetting::Url(url) => {
                builder = builder.proxy(Proxy::all(url.as_str())?);
                info!("routing downloads through proxy {}", url);
            }
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// `HEAD url`, with a `Range` header when `range` is bounded.
    pub async fn head(&self, url: &str, range: ByteRange) -> Result<Response, DownloadError> {
        let mut req = self.client.head(url);
        if let Some(value) = range.header_value() {
            req = req.header(reqwest::header::RANGE, value);
        }
        debug!(url, ?range, "HEAD");
        Ok(req.send().await?)
    }

    /// `GET url`, with a `Range` header when `range` is bounded.
    pub async fn fetch(&self, url: &str, range: ByteRange) -> Result<Response, DownloadError> {
        let mut req = self.client.get(url);
        if let Some(value) = range.header_value() {
            req = req.header(reqwest::header::RANGE, value);
        }
        debug!(url, ?range, "GET");
        Ok(req.send().await?)
    }
}
