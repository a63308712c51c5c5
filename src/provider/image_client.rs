use super::ApiTransport;
use crate::{
    error::{ImageGenError, Result},
    models::{ImageGenerationRequest, ImageGenerationResponse, ImagesRequest, ImagesResponse},
};

#[derive(Clone)]
pub struct ImageClient {
    transport: ApiTransport,
}

impl ImageClient {
    pub(crate) fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    /// Always asks for `b64_json`. Entries that only carry a `url` are not
    /// downloaded; when no entry has a payload the call fails with
    /// [`ImageGenError::Generation`].
    pub async fn generate(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        let body = ImagesRequest {
            model: request.model.clone(),
            prompt: request.prompt,
            n: 1,
            size: request.size,
            aspect_ratio: request.aspect_ratio,
            image: request.images,
            response_format: "b64_json".to_string(),
        };

        log::info!(
            "Generating image with model: {} ({}, {} reference image(s))",
            body.model,
            body.size,
            body.image.len()
        );

        let raw = self.transport.post_json("images/generations", &body).await?;
        let parsed: ImagesResponse = serde_json::from_value(raw)?;

        let images: Vec<String> = parsed
            .data
            .into_iter()
            .filter_map(|datum| {
                if datum.b64_json.is_none() && datum.url.is_some() {
                    log::warn!("Image returned as URL only, skipping: {:?}", datum.url);
                }
                datum.b64_json
            })
            .collect();

        if images.is_empty() {
            return Err(ImageGenError::Generation("No images generated".into()));
        }

        Ok(ImageGenerationResponse {
            images,
            model: request.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AIConfig;
    use crate::models::{ImageGenerationRequest, ImagesRequest};
    use crate::provider::OpenAiCompatibleClient;
    use crate::ImageGenError;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: "dall-e-3".to_string(),
            prompt: "a lighthouse".to_string(),
            images: Vec::new(),
            aspect_ratio: Some("16:9".to_string()),
            size: "2048x2048".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_returns_payloads() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({
                "model": "dall-e-3",
                "size": "2048x2048",
                "aspect_ratio": "16:9",
                "response_format": "b64_json"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": "Zmlyc3Q="}, {"b64_json": "c2Vjb25k"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AIConfig::new("dall-e-3", "sk-test", server.uri());
        let client = OpenAiCompatibleClient::new(&config).unwrap();

        let response = client.image().generate(request()).await.unwrap();
        assert_eq!(response.images, vec!["Zmlyc3Q=", "c2Vjb25k"]);
        assert_eq!(response.model, "dall-e-3");
    }

    #[tokio::test]
    async fn test_reference_images_are_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({"image": ["QUJD", "REVG"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": "QUJD"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AIConfig::new("dall-e-3", "sk-test", server.uri());
        let client = OpenAiCompatibleClient::new(&config).unwrap();

        let response = client
            .image()
            .generate(ImageGenerationRequest {
                images: vec!["QUJD".to_string(), "REVG".to_string()],
                ..request()
            })
            .await
            .unwrap();
        assert_eq!(response.images, vec!["QUJD"]);
    }

    #[test]
    fn test_image_field_omitted_without_references() {
        let body = serde_json::to_value(ImagesRequest {
            model: "dall-e-3".to_string(),
            prompt: "a lighthouse".to_string(),
            n: 1,
            size: "1024x1024".to_string(),
            aspect_ratio: None,
            image: Vec::new(),
            response_format: "b64_json".to_string(),
        })
        .unwrap();
        assert!(body.get("image").is_none());
        assert!(body.get("aspect_ratio").is_none());
    }

    #[tokio::test]
    async fn test_empty_data_is_generation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let config = AIConfig::new("dall-e-3", "sk-test", server.uri());
        let client = OpenAiCompatibleClient::new(&config).unwrap();

        let err = client.image().generate(request()).await.unwrap_err();
        assert!(matches!(err, ImageGenError::Generation(_)));
    }
}
