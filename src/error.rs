// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Custom errors for download operations.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid {name} header: {value:?}")]
    InvalidHeader { name: &'static str, value: String },
    #[error("expected status {expected}, server answered {actual}")]
    UnexpectedStatus { expected: StatusCode, actual: StatusCode },
    #[error("chunk {range} returned {actual} bytes, expected {expected}")]
    ChunkLength { range: String, expected: u64, actual: u64 },
    #[error("asked for {requested}, server sent {received}")]
    RangeMismatch { requested: String, received: String },
}
