// src/writer.rs

use crate::error::DownloadError;
use futures_util::{Stream, StreamExt};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// How a commit treats what is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Delete any existing file and start over.
    CreateFresh,
    /// Add to the end of the file, creating it if needed.
    Append,
}

/// Writes every item of `body` to `path` and returns the byte count.
///
/// No offset checks happen here: an append lands at whatever the current
/// end-of-file is.
pub async fn commit<S, B, E>(
    path: &Path,
    mode: WriteMode,
    mut body: S,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    DownloadError: From<E>,
{
    let mut file = open(path, mode).await?;
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let bytes = chunk?;
        let bytes = bytes.as_ref();
        file.write_all(bytes).await?;
        written += bytes.len() as u64;
    }
    file.flush().await?;
    file.sync_data().await?;
    Ok(written)
}

async fn open(path: &Path, mode: WriteMode) -> Result<File, DownloadError> {
    match mode {
        WriteMode::CreateFresh => {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            Ok(File::create(path).await?)
        }
        WriteMode::Append => Ok(OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await?),
    }
}

/// Makes sure a file exists at `path` without touching its contents.
pub async fn touch(path: &Path) -> Result<(), DownloadError> {
    OpenOptions::new().append(true).create(true).open(path).await?;
    Ok(())
}

/// Length of the file at `path`, or 0 if there is none.
pub async fn local_len(path: &Path) -> Result<u64, DownloadError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}
