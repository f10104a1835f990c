use crate::error::{Result, UrlError};
use crate::source::host_key;
use crate::writer::SavedResponse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod csv;
pub mod json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Saved,
    Failed,
}

/// One manifest row per dispatched URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub host: String,
    pub outcome: Outcome,
    pub path: Option<String>,
    pub ordinal: Option<u64>,
    pub bytes: Option<usize>,
    pub error: Option<String>,
}

impl From<&SavedResponse> for ManifestEntry {
    fn from(saved: &SavedResponse) -> Self {
        Self {
            url: saved.url.to_string(),
            host: saved.host.clone(),
            outcome: Outcome::Saved,
            path: Some(saved.path.display().to_string()),
            ordinal: Some(saved.ordinal),
            bytes: Some(saved.bytes),
            error: None,
        }
    }
}

impl From<&UrlError> for ManifestEntry {
    fn from(error: &UrlError) -> Self {
        let path = match error {
            UrlError::Write { path, .. } => Some(path.display().to_string()),
            _ => None,
        };
        Self {
            url: error.url().to_string(),
            host: host_key(error.url()),
            outcome: Outcome::Failed,
            path,
            ordinal: None,
            bytes: None,
            error: Some(error.to_string()),
        }
    }
}

#[async_trait]
pub trait OutputHandler: Send + Sync {
    async fn write(&mut self, entry: ManifestEntry) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
