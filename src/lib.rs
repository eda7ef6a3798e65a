pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod models;
pub mod planner;
pub mod probe;
pub mod prompt;
pub mod writer;

/// Convenient type alias exposing common structs.
pub mod prelude {
    pub use crate::client::{ProxySetting, TransferClient, TransportConfig};
    pub use crate::config::{ConfigError, ProxyConfig, ProxyScheme};
    pub use crate::downloader::{
        download, DownloadReport, DownloadStatus, Downloader, TransferMode,
    };
    pub use crate::error::DownloadError;
    pub use crate::models::{
        ByteRange, DownloadOptions, DownloadTarget, ProbeResult, RangeBound,
    };
    pub use crate::prompt::{PromptOutcome, UrlPrompt};
}
