use crate::error::UrlError;
use crate::registry::HostRegistry;
use crate::source::host_key;
use chrono::{DateTime, Local};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A response body persisted to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResponse {
    pub url: Url,
    pub host: String,
    pub ordinal: u64,
    pub path: PathBuf,
    pub bytes: usize,
}

/// `<host>_<ordinal>_<YYYY-MM-DD_HH-MM-SS>`
pub fn file_name(host: &str, ordinal: u64, at: DateTime<Local>) -> String {
    format!("{}_{}_{}", host, ordinal, at.format(TIMESTAMP_FORMAT))
}

pub struct ResponseWriter {
    destination: PathBuf,
    registry: Arc<HostRegistry>,
}

impl ResponseWriter {
    pub fn new(destination: impl Into<PathBuf>, registry: Arc<HostRegistry>) -> Self {
        Self {
            destination: destination.into(),
            registry,
        }
    }

    /// Writes `body` under a name derived from the host's next ordinal.
    ///
    /// The host's ordinal stays reserved for the whole write and is only
    /// committed once the file is on disk. Existing files are never
    /// overwritten.
    pub async fn write(&self, url: &Url, body: &[u8]) -> Result<SavedResponse, UrlError> {
        self.save(url, body.len(), move |mut file| async move {
            file.write_all(body).await?;
            file.flush().await
        })
        .await
    }

    async fn save<F, Fut>(&self, url: &Url, bytes: usize, fill: F) -> Result<SavedResponse, UrlError>
    where
        F: FnOnce(File) -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        let host = host_key(url);
        let reservation = self.registry.reserve(&host).await;
        let ordinal = reservation.ordinal();
        let path = self
            .destination
            .join(file_name(&host, ordinal, Local::now()));
        log::debug!("Reserved ordinal {} for {}", ordinal, host);

        if let Err(source) = create_new(&path, fill).await {
            return Err(UrlError::Write {
                url: url.clone(),
                path,
                source,
            });
        }

        let ordinal = reservation.commit();
        Ok(SavedResponse {
            url: url.clone(),
            host,
            ordinal,
            path,
            bytes,
        })
    }
}

/// Creates `path` and hands it to `fill`. A file that `fill` fails on is
/// removed again, so its name stays free for the next write.
async fn create_new<F, Fut>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(File) -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    if let Err(e) = fill(file).await {
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            log::warn!("Cannot remove partial file {}: {}", path.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}
