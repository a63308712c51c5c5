use crate::{
    config::AIConfig,
    error::{ImageGenError, Result},
    extract,
    fetch::ImageFetcher,
    models::{
        ImageConfig, ImageGenerationRequest, ImageOptions, SizeTier, TextGenerationRequest,
        TextPrompt,
    },
    provider::{ModelProvider, OpenAiCompatibleClient},
};
use std::sync::Arc;

/// Appended to every prompt so that chat-style models answer with an image
/// rather than a description of one.
pub const DIRECT_OUTPUT_INSTRUCTION: &str = "请直接输出图片";

const TEXT_MODEL_MARKERS: [&str; 2] = ["gemini", "nano"];

/// Rejects an explicit image size; only the aspect ratio is sent.
const ASPECT_RATIO_ONLY_MODEL: &str = "gemini-2.5-flash-image";

const IMAGE_MODALITY: &str = "IMAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Multimodal chat model; the image comes back as a file or inside text.
    Text,
    /// Dedicated image-generation model.
    Image,
}

impl Route {
    pub fn for_model(model: &str) -> Self {
        if TEXT_MODEL_MARKERS.iter().any(|marker| model.contains(marker)) {
            Route::Text
        } else {
            Route::Image
        }
    }
}

#[derive(Clone)]
pub struct ImageGenerator {
    provider: Arc<dyn ModelProvider>,
    fetcher: ImageFetcher,
}

impl ImageGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, fetcher: ImageFetcher) -> Self {
        Self { provider, fetcher }
    }

    /// Builds a generator backed by the OpenAI-compatible client.
    pub fn from_config(config: &AIConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let provider = OpenAiCompatibleClient::with_http_client(http.clone(), config)?;
        Ok(Self::new(Arc::new(provider), ImageFetcher::new(http)))
    }

    /// Runs one generation against `model` and returns a data URI, a bare
    /// base64 payload (image route), or the model's text when no image could
    /// be found in it.
    pub async fn generate(&self, input: &ImageConfig, model: &str) -> Result<String> {
        if model.is_empty() {
            return Err(ImageGenError::missing("model name"));
        }

        let prompt = format!("{}{}", input.full_prompt(), DIRECT_OUTPUT_INSTRUCTION);

        match Route::for_model(model) {
            Route::Text => {
                let request = text_request(input, model, prompt);
                let generation = self.provider.generate_text(request).await?;
                extract::resolve(generation, &self.fetcher).await
            }
            Route::Image => {
                let request = image_request(input, model, prompt);
                let response = self.provider.generate_image(request).await?;
                response
                    .images
                    .into_iter()
                    .next()
                    .ok_or_else(|| ImageGenError::Generation("No images generated".into()))
            }
        }
    }
}

pub fn text_request(input: &ImageConfig, model: &str, prompt: String) -> TextGenerationRequest {
    let references = input.reference_images();
    let prompt = if references.is_empty() {
        TextPrompt::Plain(prompt)
    } else {
        TextPrompt::WithImages {
            system: prompt,
            images: references.to_vec(),
        }
    };

    let image_size = if model == ASPECT_RATIO_ONLY_MODEL {
        None
    } else {
        input.size.clone()
    };

    TextGenerationRequest {
        model: model.to_string(),
        prompt,
        image_options: ImageOptions {
            aspect_ratio: input.aspect_ratio.clone(),
            image_size,
        },
        response_modalities: vec![IMAGE_MODALITY.to_string()],
    }
}

pub fn image_request(input: &ImageConfig, model: &str, prompt: String) -> ImageGenerationRequest {
    ImageGenerationRequest {
        model: model.to_string(),
        prompt,
        images: input.reference_images().to_vec(),
        aspect_ratio: input.aspect_ratio.clone(),
        size: SizeTier::resolve(input.size.as_deref()).to_string(),
    }
}

/// Validates `config`, then generates one image for `input`.
pub async fn generate_image(input: &ImageConfig, config: &AIConfig) -> Result<String> {
    config.validate()?;
    let _timer = crate::logger::timer("Image generation");
    ImageGenerator::from_config(config)?
        .generate(input, &config.model)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratedFile, ImageGenerationResponse, TextGeneration};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct StubProvider {
        files: Vec<GeneratedFile>,
        text: Option<String>,
        images: Vec<String>,
        seen_text: Mutex<Vec<TextGenerationRequest>>,
        seen_image: Mutex<Vec<ImageGenerationRequest>>,
    }

    #[async_trait]
    impl ModelProvider for StubProvider {
        async fn generate_text(&self, request: TextGenerationRequest) -> Result<TextGeneration> {
            self.seen_text.lock().unwrap().push(request);
            Ok(TextGeneration {
                files: self.files.clone(),
                text: self.text.clone(),
                raw: json!({}),
            })
        }

        async fn generate_image(
            &self,
            request: ImageGenerationRequest,
        ) -> Result<ImageGenerationResponse> {
            let model = request.model.clone();
            self.seen_image.lock().unwrap().push(request);
            Ok(ImageGenerationResponse {
                images: self.images.clone(),
                model,
            })
        }
    }

    fn generator(stub: Arc<StubProvider>) -> ImageGenerator {
        ImageGenerator::new(stub, ImageFetcher::default())
    }

    #[test]
    fn test_route_selection() {
        assert_eq!(Route::for_model("gemini-3-pro-image-preview"), Route::Text);
        assert_eq!(Route::for_model("nano-banana"), Route::Text);
        assert_eq!(Route::for_model("dall-e-3"), Route::Image);
        assert_eq!(Route::for_model("flux-pro"), Route::Image);
    }

    #[test]
    fn test_text_request_shapes() {
        let input = ImageConfig::new("a cat")
            .with_aspect_ratio("16:9")
            .with_size("2K");
        let request = text_request(&input, "gemini-3-pro-image", "p".to_string());
        assert_eq!(request.prompt, TextPrompt::Plain("p".to_string()));
        assert_eq!(request.image_options.image_size.as_deref(), Some("2K"));
        assert_eq!(request.response_modalities, vec!["IMAGE"]);

        let narrow = text_request(&input, ASPECT_RATIO_ONLY_MODEL, "p".to_string());
        assert_eq!(narrow.image_options.aspect_ratio.as_deref(), Some("16:9"));
        assert!(narrow.image_options.image_size.is_none());

        let with_refs = input.with_reference_images(vec!["QUJD".to_string()]);
        let request = text_request(&with_refs, "nano-banana", "p".to_string());
        assert_eq!(
            request.prompt,
            TextPrompt::WithImages {
                system: "p".to_string(),
                images: vec!["QUJD".to_string()],
            }
        );
    }

    #[test]
    fn test_image_request_carries_references() {
        let input = ImageConfig::new("a cat")
            .with_aspect_ratio("3:4")
            .with_size("2K")
            .with_reference_images(vec!["QUJD".to_string(), "REVG".to_string()]);
        let request = image_request(&input, "dall-e-3", "p".to_string());
        assert_eq!(request.images, input.reference_images());
        assert_eq!(request.aspect_ratio.as_deref(), Some("3:4"));
        assert_eq!(request.size, "2048x2048");

        let bare = image_request(&ImageConfig::new("a cat"), "dall-e-3", "p".to_string());
        assert!(bare.images.is_empty());
    }

    #[tokio::test]
    async fn test_text_route_appends_instruction() {
        let stub = Arc::new(StubProvider {
            files: vec![GeneratedFile::new("image/png", "QUJD")],
            ..Default::default()
        });

        let input = ImageConfig::new("a cat").with_system_prompt("pixel art");
        let out = generator(stub.clone())
            .generate(&input, "gemini-3-pro-image")
            .await
            .unwrap();

        assert_eq!(out, "data:image/png;base64,QUJD");
        let seen = stub.seen_text.lock().unwrap();
        assert_eq!(
            seen[0].prompt,
            TextPrompt::Plain(format!("pixel art\n\na cat{}", DIRECT_OUTPUT_INSTRUCTION))
        );
    }

    #[tokio::test]
    async fn test_text_route_without_output_fails() {
        let stub = Arc::new(StubProvider::default());
        let err = generator(stub)
            .generate(&ImageConfig::new("a cat"), "nano-banana")
            .await
            .unwrap_err();
        assert!(matches!(err, ImageGenError::Generation(_)));
    }

    #[tokio::test]
    async fn test_image_route_returns_first_payload() {
        let stub = Arc::new(StubProvider {
            images: vec!["Zmlyc3Q=".to_string(), "c2Vjb25k".to_string()],
            ..Default::default()
        });

        let input = ImageConfig::new("a cat").with_size("4K");
        let out = generator(stub.clone())
            .generate(&input, "dall-e-3")
            .await
            .unwrap();

        assert_eq!(out, "Zmlyc3Q=");
        assert_eq!(stub.seen_image.lock().unwrap()[0].size, "4096x4096");
    }

    #[tokio::test]
    async fn test_image_route_with_no_images_fails() {
        let stub = Arc::new(StubProvider::default());
        let err = generator(stub)
            .generate(&ImageConfig::new("a cat"), "dall-e-3")
            .await
            .unwrap_err();
        assert!(matches!(err, ImageGenError::Generation(_)));
    }

    #[tokio::test]
    async fn test_missing_config_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let input = ImageConfig::new("a cat");
        let configs = [
            AIConfig::new("", "sk-test", server.uri()),
            AIConfig::new("dall-e-3", "", server.uri()),
            AIConfig::new("dall-e-3", "sk-test", ""),
        ];

        for config in configs {
            let err = generate_image(&input, &config).await.unwrap_err();
            assert!(matches!(err, ImageGenError::Config(_)), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_text_route() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gemini-3-pro-image"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "![alt](data:image/png;base64,QUJD)"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AIConfig::new("gemini-3-pro-image", "Bearer sk-test", server.uri());
        let out = generate_image(&ImageConfig::new("a cat"), &config)
            .await
            .unwrap();

        assert_eq!(out, "data:image/png;base64,QUJD");
    }

    #[tokio::test]
    async fn test_end_to_end_image_route() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({"size": "1024x1024"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": "QUJD"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AIConfig::new("flux-pro", "sk-test", server.uri());
        let input = ImageConfig::new("a cat").with_size("16K");
        let out = generate_image(&input, &config).await.unwrap();

        assert_eq!(out, "QUJD");
    }
}
