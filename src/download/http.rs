use super::Downloader;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use std::time::Duration;

/// Downloads over HTTP(S); `data:` URLs with base64 payloads are decoded locally.
#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(client))
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }

    fn decode_data_url(url: &str) -> Result<Vec<u8>> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| Error::Download("Malformed data URL".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(Error::Download(
                "Only base64 data URLs are supported".to_string(),
            ));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Download(format!("Failed to decode base64 image: {}", e)))
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            return Self::decode_data_url(url);
        }

        tracing::debug!("Downloading image: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                tracing::error!("Failed to download {}: {}", url, e);
                Error::Download(e.to_string())
            })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("Failed to read image body: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::Download(format!("Empty image body from {}", url)));
        }

        Ok(bytes.to_vec())
    }
}
