pub mod image_client;
pub mod text_client;

use crate::{
    config::AIConfig,
    error::{ImageGenError, Result},
    models::{ImageGenerationRequest, ImageGenerationResponse, TextGeneration, TextGenerationRequest},
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use image_client::ImageClient;
pub use text_client::TextClient;

/// The two capabilities the generator needs from an upstream SDK.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<TextGeneration>;
    async fn generate_image(&self, request: ImageGenerationRequest)
        -> Result<ImageGenerationResponse>;
}

/// Shared HTTP plumbing for an OpenAI-compatible endpoint.
#[derive(Clone)]
pub(crate) struct ApiTransport {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiTransport {
    fn new(http: reqwest::Client, config: &AIConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.bearer_token().to_string(),
        }
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::error!("Upstream returned {} for {}: {}", status, url, text);
            return Err(ImageGenError::HttpStatus {
                status: status.as_u16(),
                url,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            ImageGenError::Response(format!("invalid JSON from {}: {}", url, e))
        })
    }
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &AIConfig) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    pub fn with_http_client(http: reqwest::Client, config: &AIConfig) -> Result<Self> {
        config.validate()?;
        let transport = ApiTransport::new(http, config);

        Ok(Self {
            text_client: TextClient::new(transport.clone()),
            image_client: ImageClient::new(transport),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleClient {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<TextGeneration> {
        self.text_client.generate(request).await
    }

    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        self.image_client.generate(request).await
    }
}
