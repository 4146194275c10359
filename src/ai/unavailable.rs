use super::{ChatService, CompletionRequest, ImageGenerationService};
use crate::models::ImageParams;
use crate::{Error, Result};
use async_trait::async_trait;

/// Stands in for the upstream API when it cannot be reached at all, e.g.
/// no API key is configured. Every call fails with a configuration error,
/// so local-only commands still work.
#[derive(Debug, Clone)]
pub struct UnavailableClient {
    reason: String,
}

impl UnavailableClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ChatService for UnavailableClient {
    async fn complete_text(&self, _request: &CompletionRequest) -> Result<String> {
        Err(Error::Config(self.reason.clone()))
    }
}

#[async_trait]
impl ImageGenerationService for UnavailableClient {
    async fn generate_image(&self, _prompt: &str, _params: &ImageParams) -> Result<String> {
        Err(Error::Config(self.reason.clone()))
    }
}
