use crate::error::{Error, Result};
use std::path::Path;
use url::Url;

/// Parses one line of the URL list. Lines that do not parse, or parse to
/// something without a host, are rejected.
pub fn parse_line(line: &str) -> Option<Url> {
    let url = Url::parse(line.trim()).ok()?;
    url.host_str()?;
    Some(url)
}

/// Host partition key: the host plus `:port` when the URL names one.
pub fn host_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Collects the valid URLs from `lines`, in order, warning about the rest.
pub fn parse_lines<'a, I>(lines: I) -> Vec<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                log::warn!("Invalid url: '{}'", line);
            }
            parsed
        })
        .collect()
}

pub async fn load_urls(path: &Path) -> Result<Vec<Url>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
    let urls = parse_lines(content.lines());
    log::debug!("Loaded {} urls from {}", urls.len(), path.display());
    Ok(urls)
}
