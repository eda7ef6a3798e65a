// src/probe.rs

use crate::client::TransferClient;
use crate::error::DownloadError;
use crate::models::{ByteRange, ProbeResult};
use reqwest::header::CONTENT_LENGTH;
use reqwest::StatusCode;
use tracing::debug;

/// Asks the server for `bytes=0-` with a HEAD request.
///
/// A `206 Partial Content` answer means ranges work, and `Content-Length`
/// is the full resource length. Anything else means they don't.
pub async fn probe(client: &TransferClient, url: &str) -> Result<ProbeResult, DownloadError> {
    let resp = client.head(url, ByteRange::open_ended(0)).await?;
    let status = resp.status();
    debug!(url, %status, "range probe answered");

    if status != StatusCode::PARTIAL_CONTENT {
        return Ok(ProbeResult::unsupported());
    }

    let total_length = parse_content_length(resp.headers().get(CONTENT_LENGTH))?;
    Ok(ProbeResult {
        supports_range: true,
        total_length,
    })
}

fn parse_content_length(
    value: Option<&reqwest::header::HeaderValue>,
) -> Result<u64, DownloadError> {
    let raw = value.map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    raw.as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| DownloadError::InvalidHeader {
            name: "Content-Length",
            value: raw.clone().unwrap_or_default(),
        })
}
