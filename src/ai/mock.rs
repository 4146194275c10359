use super::{ChatService, CompletionRequest, ImageGenerationService};
use crate::models::ImageParams;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory chat stub. Replies cycle through the configured responses, or
/// echo the prompt when none are configured.
#[derive(Clone, Default)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    fail_markers: Arc<Mutex<Vec<String>>>,
    fail_all: Arc<Mutex<bool>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Fail any request whose prompt contains `marker`.
    pub fn with_failure_on(self, marker: impl Into<String>) -> Self {
        self.fail_markers.lock().unwrap().push(marker.into());
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.fail_all.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn complete_text(&self, request: &CompletionRequest) -> Result<String> {
        let call_index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        let should_fail = *self.fail_all.lock().unwrap()
            || self
                .fail_markers
                .lock()
                .unwrap()
                .iter()
                .any(|marker| request.prompt.contains(marker.as_str()));
        if should_fail {
            return Err(Error::Upstream {
                status: Some(500),
                message: "Mock chat failure".to_string(),
            });
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!("mock completion: {}", request.prompt))
        } else {
            Ok(responses[call_index % responses.len()].clone())
        }
    }
}

/// In-memory image stub returning a fixed URL.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    url: Arc<Mutex<String>>,
    should_fail: Arc<Mutex<bool>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            url: Arc::new(Mutex::new("https://mock-images.example.com/image.png".to_string())),
            should_fail: Arc::new(Mutex::new(false)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_url_response(self, url: impl Into<String>) -> Self {
        *self.url.lock().unwrap() = url.into();
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str, _params: &ImageParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Upstream {
                status: Some(503),
                message: "Mock image failure".to_string(),
            });
        }

        Ok(self.url.lock().unwrap().clone())
    }
}
