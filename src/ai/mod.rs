//! Generative AI integration for text completion and image generation
//!
//! Services depend only on the [`ChatService`] and [`ImageGenerationService`]
//! traits; the Zhipu adapter talks to the BigModel HTTP API and the mocks
//! stand in for it in tests.

pub mod mock;
pub mod unavailable;
pub mod zhipu;

pub use mock::{MockChatClient, MockImageGenerationClient};
pub use unavailable::UnavailableClient;
pub use zhipu::{ZhipuChatClient, ZhipuHttpClient, ZhipuImageClient};

use crate::models::ImageParams;
use crate::Result;
use async_trait::async_trait;

/// One text-completion call: a user prompt plus sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    /// Query for the upstream web-search tool, when enabled.
    pub web_search: Option<String>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            temperature,
            max_tokens: None,
            top_p: None,
            web_search: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_web_search(mut self, query: impl Into<String>) -> Self {
        self.web_search = Some(query.into());
        self
    }
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Returns the completion text. Empty or missing content is an error.
    async fn complete_text(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Returns the URL of the generated image.
    async fn generate_image(&self, prompt: &str, params: &ImageParams) -> Result<String>;
}
