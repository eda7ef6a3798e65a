use std::sync::atomic::{AtomicU64, Ordering};
use reqwest::header::CONTENT_RANGE;
use reqwest::{Response, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::TransferClient;
use crate::error::DownloadError;
use crate::models::{parse_content_range, ByteRange, DownloadOptions, DownloadTarget};
use crate::planner::plan;
use crate::probe::probe;
use crate::writer::{commit, local_len, touch, WriteMode};

/// Where a download currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Start,
    Probing,
    WholeFileTransfer,
    ChunkedTransfer,
    Done,
    Failed,
}

/// Which path a finished download took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    WholeFile,
    Chunked,
}

/// Summary of a finished download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub mode: TransferMode,
    /// Bytes written during this call. Zero when the file was already complete.
    pub bytes_written: u64,
    /// Length reported by the server, 0 if it never said.
    pub total_length: u64,
}

/// Downloads a single target, resuming from whatever is already on disk
/// when the server supports byte ranges.
#[derive(Debug)]
pub struct Downloader {
    client: TransferClient,
    target: DownloadTarget,
    options: DownloadOptions,
    status: Mutex<DownloadStatus>,
    downloaded: AtomicU64,
    total_size: AtomicU64,
}

impl Downloader {
    pub fn new(client: TransferClient, target: DownloadTarget, options: DownloadOptions) -> Self {
        Self {
            client,
            target,
            options,
            status: Mutex::new(DownloadStatus::Start),
            downloaded: AtomicU64::new(0),
            total_size: AtomicU64::new(0),
        }
    }

    /// Run the download to completion. The first error aborts and leaves the
    /// destination holding whatever was committed so far; calling again resumes.
    pub async fn start(&self) -> Result<DownloadReport, DownloadError> {
        self.set_status(DownloadStatus::Start).await;
        match self.run().await {
            Ok(report) => {
                self.set_status(DownloadStatus::Done).await;
                info!(
                    destination = %self.target.destination.display(),
                    bytes = report.bytes_written,
                    "download finished"
                );
                Ok(report)
            }
            Err(e) => {
                self.set_status(DownloadStatus::Failed).await;
                warn!(url = %self.target.url, "download failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<DownloadReport, DownloadError> {
        if let Some(parent) = self.target.destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        self.set_status(DownloadStatus::Probing).await;
        let capability = probe(&self.client, &self.target.url).await?;
        self.total_size.store(capability.total_length, Ordering::SeqCst);

        if capability.supports_range {
            self.set_status(DownloadStatus::ChunkedTransfer).await;
            self.download_chunked(capability.total_length).await
        } else {
            info!(url = %self.target.url, "server does not support ranges, fetching whole file");
            self.set_status(DownloadStatus::WholeFileTransfer).await;
            self.download_whole().await
        }
    }

    async fn download_whole(&self) -> Result<DownloadReport, DownloadError> {
        self.downloaded.store(0, Ordering::SeqCst);
        let resp = self.client.fetch(&self.target.url, ByteRange::whole()).await?;
        if resp.status() != StatusCode::OK {
            return Err(DownloadError::UnexpectedStatus {
                expected: StatusCode::OK,
                actual: resp.status(),
            });
        }
        let total_length = resp.content_length().unwrap_or(0);
        self.total_size.store(total_length, Ordering::SeqCst);

        let written = commit(
            &self.target.destination,
            WriteMode::CreateFresh,
            resp.bytes_stream(),
        )
        .await?;
        self.downloaded.store(written, Ordering::SeqCst);

        Ok(DownloadReport {
            mode: TransferMode::WholeFile,
            bytes_written: written,
            total_length,
        })
    }

    async fn download_chunked(&self, total_length: u64) -> Result<DownloadReport, DownloadError> {
        let existing = local_len(&self.target.destination).await?;
        self.downloaded.store(existing.min(total_length), Ordering::SeqCst);

        if existing >= total_length {
            if existing > total_length {
                warn!(
                    destination = %self.target.destination.display(),
                    existing,
                    total_length,
                    "local file is larger than the remote resource, leaving it alone"
                );
            }
            if existing == 0 {
                touch(&self.target.destination).await?;
            }
            info!(destination = %self.target.destination.display(), "already complete");
            return Ok(DownloadReport {
                mode: TransferMode::Chunked,
                bytes_written: 0,
                total_length,
            });
        }

        let chunks = plan(total_length - existing, self.options.chunk_size);
        info!(
            resume_from = existing,
            chunks = chunks.chunk_count,
            remainder = chunks.remainder_len,
            "starting chunked transfer"
        );

        let mut written = 0u64;
        for range in chunks.ranges(existing) {
            written += self.fetch_chunk(range).await?;
        }

        Ok(DownloadReport {
            mode: TransferMode::Chunked,
            bytes_written: written,
            total_length,
        })
    }

    async fn fetch_chunk(&self, range: ByteRange) -> Result<u64, DownloadError> {
        let resp = self.client.fetch(&self.target.url, range).await?;
        if resp.status() != StatusCode::PARTIAL_CONTENT {
            return Err(DownloadError::UnexpectedStatus {
                expected: StatusCode::PARTIAL_CONTENT,
                actual: resp.status(),
            });
        }
        check_content_range(&resp, range)?;

        let expected = range.len();
        if let (Some(expected), Some(announced)) = (expected, resp.content_length()) {
            if announced != expected {
                return Err(DownloadError::ChunkLength {
                    range: range.header_value().unwrap_or_default(),
                    expected,
                    actual: announced,
                });
            }
        }

        let written =
            commit(&self.target.destination, WriteMode::Append, resp.bytes_stream()).await?;
        self.downloaded.fetch_add(written, Ordering::SeqCst);

        let expected = expected.unwrap_or(written);
        if written != expected {
            return Err(DownloadError::ChunkLength {
                range: range.header_value().unwrap_or_default(),
                expected,
                actual: written,
            });
        }
        debug!(?range, written, "chunk committed");
        Ok(written)
    }

    async fn set_status(&self, status: DownloadStatus) {
        *self.status.lock().await = status;
    }
}

impl Downloader {
    /// Get the current progress as a fraction in range 0.0..=1.0 if known.
    pub fn progress(&self) -> Option<f32> {
        let total = self.total_size.load(Ordering::SeqCst);
        if total == 0 {
            return None;
        }
        let done = self.downloaded.load(Ordering::SeqCst);
        Some(done as f32 / total as f32)
    }

    /// Get the current status of the download.
    pub async fn status(&self) -> DownloadStatus {
        *self.status.lock().await
    }

    pub fn target(&self) -> &DownloadTarget {
        &self.target
    }
}

/// A 206 must cover exactly the bytes we asked for, or appending it would
/// corrupt the file.
fn check_content_range(resp: &Response, requested: ByteRange) -> Result<(), DownloadError> {
    let raw = resp
        .headers()
        .get(CONTENT_RANGE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let Some(raw) = raw else {
        return Err(DownloadError::InvalidHeader {
            name: "Content-Range",
            value: String::new(),
        });
    };
    match parse_content_range(&raw) {
        Some(received) if received == requested => Ok(()),
        Some(_) => Err(DownloadError::RangeMismatch {
            requested: requested.header_value().unwrap_or_default(),
            received: raw,
        }),
        None => Err(DownloadError::InvalidHeader {
            name: "Content-Range",
            value: raw,
        }),
    }
}

/// Convenience wrapper: one [`Downloader`] run for `target`.
pub async fn download(
    client: &TransferClient,
    target: DownloadTarget,
    options: DownloadOptions,
) -> Result<DownloadReport, DownloadError> {
    Downloader::new(client.clone(), target, options).start().await
}
