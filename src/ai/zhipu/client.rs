use super::types::ErrorResponse;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Shared HTTP plumbing for the BigModel chat and image endpoints.
#[derive(Clone)]
pub struct ZhipuHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl ZhipuHttpClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(api_key, base_url, client))
    }

    pub fn new_with_client(api_key: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", url, e);
                Error::Upstream {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Upstream {
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            tracing::error!("Upstream API error (status {}): {}", status, body);
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse upstream response: {}\nBody: {}", e, body);
            Error::Upstream {
                status: Some(status.as_u16()),
                message: format!("Failed to parse response: {}", e),
            }
        })
    }
}
