use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaverConfig {
    /// File with one URL per line
    #[serde(default = "default_src")]
    pub src: PathBuf,

    /// Directory receiving one file per saved response
    #[serde(default = "default_dst")]
    pub dst: PathBuf,

    /// Upper bound for a single fetch, in seconds. Unset means no timeout.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub timeout_secs: Option<u64>,

    /// Cap on in-flight fetches. Unset means one task per URL, all at once.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub concurrency: Option<usize>,

    #[serde(default = "default_user_agent")]
    #[validate(length(min = 1))]
    pub user_agent: String,

    #[serde(default)]
    pub manifest: Option<ManifestConfig>,
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            dst: default_dst(),
            timeout_secs: None,
            concurrency: None,
            user_agent: default_user_agent(),
            manifest: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestConfig {
    Json { path: String },
    Csv { path: String },
}

impl ManifestConfig {
    /// Picks the manifest format from the file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ManifestConfig::Json { path: path.to_string() }),
            "csv" => Some(ManifestConfig::Csv { path: path.to_string() }),
            _ => None,
        }
    }
}

fn default_src() -> PathBuf {
    PathBuf::from("urls.txt")
}

fn default_dst() -> PathBuf {
    PathBuf::from("responses")
}

fn default_user_agent() -> String {
    format!("response-saver/{}", env!("CARGO_PKG_VERSION"))
}
