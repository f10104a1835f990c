use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run before any fetching starts.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("cannot create destination directory [path={}]: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read url source [path={}]: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single URL. Logged and skipped, never fatal for the run.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("server not responding [url={url}]: {source}")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("request failed [status={status}, url={url}]")]
    HttpStatus { url: Url, status: StatusCode },

    #[error("cannot read response body [url={url}]: {source}")]
    Read {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot write response body [url={url}, path={}]: {source}", path.display())]
    Write {
        url: Url,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UrlError {
    pub fn url(&self) -> &Url {
        match self {
            UrlError::Network { url, .. }
            | UrlError::HttpStatus { url, .. }
            | UrlError::Read { url, .. }
            | UrlError::Write { url, .. } => url,
        }
    }

    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            UrlError::Network { .. } => "network",
            UrlError::HttpStatus { .. } => "http_status",
            UrlError::Read { .. } => "read",
            UrlError::Write { .. } => "write",
        }
    }
}
