use crate::error::{Result, UrlError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Outcome of one retrieval: the whole body on success.
pub type FetchOutcome = std::result::Result<Vec<u8>, UrlError>;

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Issues a single GET and buffers the body. Only `200 OK` counts as
    /// success. The response is dropped on every path, which returns its
    /// connection to the pool.
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        log::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| UrlError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UrlError::HttpStatus {
                url: url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| UrlError::Read {
            url: url.clone(),
            source,
        })?;
        log::debug!("Body length: {} bytes [url={}]", body.len(), url);
        Ok(body.to_vec())
    }
}
