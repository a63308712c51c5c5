pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod generator;
pub mod logger;
pub mod models;
pub mod provider;

pub use config::AIConfig;
pub use error::{ImageGenError, Result};
pub use extract::{classify_text, Extraction};
pub use fetch::ImageFetcher;
pub use generator::{generate_image, ImageGenerator, Route};
pub use models::{GeneratedFile, ImageConfig, SizeTier, TextGeneration};
pub use provider::{ModelProvider, OpenAiCompatibleClient};
