use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },
    #[error("Response error: {0}")]
    Response(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ImageGenError {
    pub fn missing(field: &str) -> Self {
        ImageGenError::Config(format!("missing {}", field))
    }
}

pub type Result<T> = std::result::Result<T, ImageGenError>;
