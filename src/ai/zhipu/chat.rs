use super::client::ZhipuHttpClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Tool};
use crate::ai::{ChatService, CompletionRequest};
use crate::{Error, Result};
use async_trait::async_trait;

pub struct ZhipuChatClient {
    http: ZhipuHttpClient,
}

impl ZhipuChatClient {
    pub fn new(http: ZhipuHttpClient) -> Self {
        Self { http }
    }

    fn build_request(request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            tools: request
                .web_search
                .as_ref()
                .map(|query| vec![Tool::web_search(query.clone())]),
        }
    }
}

#[async_trait]
impl ChatService for ZhipuChatClient {
    async fn complete_text(&self, request: &CompletionRequest) -> Result<String> {
        tracing::debug!(
            "Sending chat request: model={}, prompt_len={}",
            request.model,
            request.prompt.chars().count()
        );

        let response: ChatCompletionResponse = self
            .http
            .post("/chat/completions", &Self::build_request(request))
            .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::upstream("Empty completion from chat API"));
        }

        tracing::debug!("Chat response received ({} chars)", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ZhipuChatClient {
        ZhipuChatClient::new(ZhipuHttpClient::new_with_client(
            "test-key".to_string(),
            server.uri(),
            reqwest::Client::new(),
        ))
    }

    #[tokio::test]
    async fn test_complete_text_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "  床前明月光  "
                    },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let request = CompletionRequest::new("glm-4-plus", "静夜思", 0.7);
        let text = client_for(&server).complete_text(&request).await.unwrap();
        assert_eq!(text, "床前明月光");
    }

    #[tokio::test]
    async fn test_complete_text_sends_model_system_and_tools() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "custom-model",
                "messages": [
                    { "role": "system", "content": "be terse" },
                    { "role": "user", "content": "hello" }
                ],
                "max_tokens": 500,
                "tools": [{
                    "type": "web_search",
                    "web_search": { "search_query": "静夜思 古诗词", "search_result": true }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "ok" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CompletionRequest::new("custom-model", "hello", 0.5)
            .with_system("be terse")
            .with_max_tokens(500)
            .with_web_search("静夜思 古诗词");
        client_for(&server).complete_text(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_upstream_error_with_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "code": "1302", "message": "rate limited" }
            })))
            .mount(&server)
            .await;

        let request = CompletionRequest::new("glm-4-plus", "hi", 0.7);
        let err = client_for(&server).complete_text(&request).await.unwrap_err();
        match err {
            Error::Upstream { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "   " },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let request = CompletionRequest::new("glm-4-plus", "hi", 0.7);
        let err = client_for(&server).complete_text(&request).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let request = CompletionRequest::new("glm-4-plus", "hi", 0.7);
        let err = client_for(&server).complete_text(&request).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { status: Some(200), .. }));
    }
}
