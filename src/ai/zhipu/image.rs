use super::client::ZhipuHttpClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::ImageGenerationService;
use crate::models::ImageParams;
use crate::{Error, Result};
use async_trait::async_trait;

pub struct ZhipuImageClient {
    http: ZhipuHttpClient,
}

impl ZhipuImageClient {
    pub fn new(http: ZhipuHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageGenerationService for ZhipuImageClient {
    async fn generate_image(&self, prompt: &str, params: &ImageParams) -> Result<String> {
        tracing::debug!(
            "Sending image request: model={}, size={}, prompt_len={}",
            params.model,
            params.size,
            prompt.chars().count()
        );

        let request = ImageGenerationRequest {
            model: params.model.clone(),
            prompt: prompt.to_string(),
            size: params.size.clone(),
            quality: params.quality.clone(),
        };

        let response: ImageGenerationResponse =
            self.http.post("/images/generations", &request).await?;

        let image_data = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream("No image data in response"))?;

        // Inline payloads are handed on as data URLs so callers always get a URL.
        match (image_data.url, image_data.b64_json) {
            (Some(url), _) if !url.trim().is_empty() => Ok(url),
            (_, Some(b64)) if !b64.is_empty() => Ok(format!("data:image/png;base64,{}", b64)),
            _ => Err(Error::upstream(
                "No image data (neither URL nor base64) in response",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ZhipuImageClient {
        ZhipuImageClient::new(ZhipuHttpClient::new_with_client(
            "key".to_string(),
            server.uri(),
            reqwest::Client::new(),
        ))
    }

    #[tokio::test]
    async fn test_generate_image_returns_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "cogView-4-250304",
                "size": "1024x1024",
                "quality": "standard"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1,
                "data": [{ "url": "https://cdn.example.com/a.png" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = client_for(&server)
            .generate_image("月光", &ImageParams::default())
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/a.png");
    }

    #[tokio::test]
    async fn test_generate_image_handles_b64_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "b64_json": "iVBORw==" }]
            })))
            .mount(&server)
            .await;

        let url = client_for(&server)
            .generate_image("月光", &ImageParams::default())
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn test_generate_image_empty_data_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_image("月光", &ImageParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_generate_image_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_image("月光", &ImageParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream {
                status: Some(500),
                ..
            }
        ));
        assert!(err.to_string().contains("server error"));
    }
}
