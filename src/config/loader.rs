use crate::config::schema::{ManifestConfig, SaverConfig};
use crate::error::{Error, Result};
use crate::output::{OutputHandler, csv::CsvOutput, json::JsonOutput};
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SaverConfig> {
        let config = Self::load_file(path.as_ref())?;
        Self::validate(config)
    }

    pub fn validate(config: SaverConfig) -> Result<SaverConfig> {
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<SaverConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    pub fn create_output(config: &SaverConfig) -> Result<Option<Box<dyn OutputHandler>>> {
        let handler: Option<Box<dyn OutputHandler>> = match &config.manifest {
            Some(ManifestConfig::Json { path }) => {
                Some(Box::new(JsonOutput::new(PathBuf::from(path))?))
            }
            Some(ManifestConfig::Csv { path }) => {
                Some(Box::new(CsvOutput::new(PathBuf::from(path))?))
            }
            None => None,
        };
        Ok(handler)
    }

    /// Like [`ConfigLoader::create_output`], but a manifest that cannot be
    /// opened is logged and the run goes on without it.
    pub fn open_manifest(config: &SaverConfig) -> Option<Box<dyn OutputHandler>> {
        match Self::create_output(config) {
            Ok(handler) => handler,
            Err(e) => {
                log::error!("Cannot open manifest, continuing without it: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_toml_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saver.toml");
        fs::write(&path, "dst = \"out\"\ntimeout_secs = 5\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.src, PathBuf::from("urls.txt"));
        assert_eq!(config.dst, PathBuf::from("out"));
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.concurrency, None);
        assert!(config.manifest.is_none());
    }

    #[test]
    fn loads_yaml_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saver.yaml");
        fs::write(
            &path,
            "src: list.txt\nmanifest:\n  type: csv\n  path: run.csv\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.src, PathBuf::from("list.txt"));
        assert_eq!(
            config.manifest,
            Some(ManifestConfig::Csv { path: "run.csv".to_string() })
        );
    }

    #[test]
    fn rejects_zero_concurrency() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saver.json");
        fs::write(&path, r#"{"concurrency": 0}"#).unwrap();

        assert!(matches!(
            ConfigLoader::load(&path),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saver.ini");
        fs::write(&path, "").unwrap();

        assert!(matches!(ConfigLoader::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn unopenable_manifest_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("run.json");
        let config = SaverConfig {
            manifest: Some(ManifestConfig::Json {
                path: path.display().to_string(),
            }),
            ..SaverConfig::default()
        };

        assert!(ConfigLoader::create_output(&config).is_err());
        assert!(ConfigLoader::open_manifest(&config).is_none());
    }

    #[test]
    fn opens_configured_manifest() {
        let dir = TempDir::new().unwrap();
        let config = SaverConfig {
            manifest: Some(ManifestConfig::Csv {
                path: dir.path().join("run.csv").display().to_string(),
            }),
            ..SaverConfig::default()
        };

        assert!(ConfigLoader::open_manifest(&config).is_some());
        assert!(ConfigLoader::open_manifest(&SaverConfig::default()).is_none());
    }

    #[test]
    fn manifest_format_follows_extension() {
        assert_eq!(
            ManifestConfig::from_path("a/run.JSON"),
            Some(ManifestConfig::Json { path: "a/run.JSON".to_string() })
        );
        assert!(ManifestConfig::from_path("run.txt").is_none());
    }
}
