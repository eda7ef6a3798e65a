// src/models.rs

use std::path::{Path, PathBuf};

/// File name used when the URL does not end in a usable path segment.
pub const DEFAULT_FILE_NAME: &str = "default.file";

/// Default size of a single ranged request, in bytes.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024;

/// A remote resource and the local file it is written to.
/// Two targets are the same download when their destinations match.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub url: String,
    pub destination: PathBuf,
}

impl PartialEq for DownloadTarget {
    fn eq(&self, other: &Self) -> bool {
        self.destination == other.destination
    }
}

impl Eq for DownloadTarget {}

impl DownloadTarget {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }

    /// Builds a target whose file name is the last path segment of `url`,
    /// placed under `dir` when one is given.
    pub fn from_url(url: &str, dir: Option<&Path>) -> Self {
        let name = file_name_from_url(url);
        let destination = match dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        Self::new(url, destination)
    }
}

/// Everything after the final `/`, or [`DEFAULT_FILE_NAME`] if that is empty.
pub fn file_name_from_url(url: &str) -> &str {
    match url.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_FILE_NAME,
    }
}

/// What the server told us about byte-range support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub supports_range: bool,
    /// Full length of the resource. Zero when ranges are unsupported.
    pub total_length: u64,
}

impl ProbeResult {
    pub fn unsupported() -> Self {
        Self {
            supports_range: false,
            total_length: 0,
        }
    }
}

/// One side of a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Unbounded,
    At(u64),
}

/// An HTTP byte range. `end` is inclusive, as in the `Range` header grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: RangeBound,
    pub end: RangeBound,
}

impl ByteRange {
    /// The whole resource; no `Range` header is sent.
    pub fn whole() -> Self {
        Self {
            start: RangeBound::Unbounded,
            end: RangeBound::Unbounded,
        }
    }

    /// `bytes=start-end`, both inclusive.
    pub fn closed(start: u64, end: u64) -> Self {
        Self {
            start: RangeBound::At(start),
            end: RangeBound::At(end),
        }
    }

    /// `bytes=start-`, through the end of the resource.
    pub fn open_ended(start: u64) -> Self {
        Self {
            start: RangeBound::At(start),
            end: RangeBound::Unbounded,
        }
    }

    /// `bytes=-len`, the last `len` bytes of the resource.
    pub fn suffix(len: u64) -> Self {
        Self {
            start: RangeBound::Unbounded,
            end: RangeBound::At(len),
        }
    }

    /// Number of bytes covered, when that is known without the resource length.
    pub fn len(&self) -> Option<u64> {
        match (self.start, self.end) {
            (RangeBound::At(start), RangeBound::At(end)) => {
                Some(end.saturating_sub(start).saturating_add(1))
            }
            (RangeBound::Unbounded, RangeBound::At(len)) => Some(len),
            _ => None,
        }
    }

    /// Value for the `Range` request header, `None` for the whole resource.
    pub fn header_value(&self) -> Option<String> {
        match (self.start, self.end) {
            (RangeBound::Unbounded, RangeBound::Unbounded) => None,
            (RangeBound::At(start), RangeBound::At(end)) => {
                Some(format!("bytes={}-{}", start, end))
            }
            (RangeBound::At(start), RangeBound::Unbounded) => Some(format!("bytes={}-", start)),
            (RangeBound::Unbounded, RangeBound::At(len)) => Some(format!("bytes=-{}", len)),
        }
    }
}

/// Reads a `Content-Range: bytes <start>-<end>/<total>` value back into a closed range.
/// The total may be `*`. Unsatisfied-range forms (`bytes */<total>`) yield `None`.
pub fn parse_content_range(value: &str) -> Option<ByteRange> {
    let spec = value.trim().strip_prefix("bytes")?.trim_start();
    let (span, total) = spec.split_once('/')?;
    if total != "*" {
        total.trim().parse::<u64>().ok()?;
    }
    let (start, end) = span.trim().split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = end.trim().parse::<u64>().ok()?;
    (start <= end).then(|| ByteRange::closed(start, end))
}

/// Tunables for a single download.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Bytes requested per ranged GET.
    pub chunk_size: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
