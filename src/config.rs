// src/config.rs

use crate::client::ProxySetting;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed proxy config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no {0} proxy configured")]
    MissingProxy(ProxyScheme),
    #[error("invalid proxy url: {0}")]
    InvalidProxy(#[from] reqwest::Error),
}

/// Which entry of the config file to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Http,
    Https,
}

impl ProxyScheme {
    /// `https` wins over `http`; with neither flag set we default to `https`.
    pub fn from_flags(use_http: bool, use_https: bool) -> Self {
        if use_http && !use_https {
            ProxyScheme::Http
        } else {
            ProxyScheme::Https
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyScheme::Http => f.write_str("http"),
            ProxyScheme::Https => f.write_str("https"),
        }
    }
}

/// Contents of the proxy config file: `{"http": "...", "https": "..."}`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyConfig {
    pub http: String,
    pub https: String,
}

impl ProxyConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Picks the proxy for `scheme` and checks that reqwest accepts it.
    pub fn select(&self, scheme: ProxyScheme) -> Result<ProxySetting, ConfigError> {
        let url = match scheme {
            ProxyScheme::Http => self.http.trim(),
            ProxyScheme::Https => self.https.trim(),
        };
        if url.is_empty() {
            return Err(ConfigError::MissingProxy(scheme));
        }
        reqwest::Proxy::all(url)?;
        Ok(ProxySetting::Url(url.to_string()))
    }
}
