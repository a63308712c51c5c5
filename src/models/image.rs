use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Caller-side description of one generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Reference images, each a bare base64 payload or a data URI.
    pub image_base64: Option<Vec<String>>,
    pub aspect_ratio: Option<String>,
    pub size: Option<String>,
}

impl ImageConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_reference_images(mut self, images: Vec<String>) -> Self {
        self.image_base64 = Some(images);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Reference images, or an empty slice when none were supplied.
    pub fn reference_images(&self) -> &[String] {
        self.image_base64.as_deref().unwrap_or(&[])
    }

    pub fn full_prompt(&self) -> String {
        match self.system_prompt.as_deref() {
            Some(system) if !system.is_empty() => format!("{}\n\n{}", system, self.prompt),
            _ => self.prompt.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    OneK,
    TwoK,
    FourK,
}

impl SizeTier {
    pub fn parse(tier: &str) -> Option<Self> {
        match tier {
            "1K" => Some(SizeTier::OneK),
            "2K" => Some(SizeTier::TwoK),
            "4K" => Some(SizeTier::FourK),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> &'static str {
        match self {
            SizeTier::OneK => "1024x1024",
            SizeTier::TwoK => "2048x2048",
            SizeTier::FourK => "4096x4096",
        }
    }

    /// Maps a coarse tier onto a pixel size, falling back to 1024x1024.
    pub fn resolve(tier: Option<&str>) -> &'static str {
        tier.and_then(SizeTier::parse)
            .map(|t| t.dimensions())
            .unwrap_or(DEFAULT_IMAGE_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<String>,
    pub aspect_ratio: Option<String>,
    pub size: String,
}

#[derive(Debug, Clone)]
pub struct ImageGenerationResponse {
    /// Base64 payloads, in the order the provider returned them.
    pub images: Vec<String>,
    pub model: String,
}

/// Body of `POST /images/generations`.
#[derive(Debug, Clone, Serialize)]
pub struct ImagesRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<String>,
    pub response_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDatum {
    pub b64_json: Option<String>,
    pub url: Option<String>,
}
