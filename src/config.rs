use crate::error::{ImageGenError, Result};
use std::env;
use std::fmt;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone, Default)]
pub struct AIConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

// Keeps the key out of logs and panic messages.
impl fmt::Debug for AIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AIConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AIConfig {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        AIConfig {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Reads `AI_MODEL`, `AI_API_KEY` and `AI_BASE_URL`. Unset variables are
    /// left empty so that [`AIConfig::validate`] reports them.
    pub fn from_env() -> Self {
        let model = env::var("AI_MODEL").unwrap_or_default();
        let api_key = env::var("AI_API_KEY").unwrap_or_default();
        let base_url = env::var("AI_BASE_URL").unwrap_or_default();

        AIConfig {
            model,
            api_key,
            base_url,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(ImageGenError::missing("model name"));
        }
        if self.api_key.is_empty() {
            return Err(ImageGenError::missing("API key"));
        }
        if self.base_url.is_empty() {
            return Err(ImageGenError::missing("base URL"));
        }
        Ok(())
    }

    /// The API key with any leading `Bearer ` scheme removed.
    pub fn bearer_token(&self) -> &str {
        self.api_key
            .strip_prefix(BEARER_PREFIX)
            .unwrap_or(&self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> AIConfig {
        AIConfig::new("gemini-3-pro-image", "sk-test", "https://api.example.com/v1")
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(full().validate().is_ok());
    }

    #[test]
    fn test_validate_names_missing_field() {
        let cases = [
            (full().with_model(""), "model name"),
            (full().with_api_key(""), "API key"),
            (full().with_base_url(""), "base URL"),
        ];

        for (config, field) in cases {
            match config.validate() {
                Err(ImageGenError::Config(msg)) => assert!(msg.contains(field), "{}", msg),
                other => panic!("expected config error for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        assert_eq!(full().with_api_key("Bearer sk-abc").bearer_token(), "sk-abc");
        assert_eq!(full().bearer_token(), "sk-test");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let printed = format!("{:?}", full());
        assert!(!printed.contains("sk-test"));
        assert!(printed.contains("gemini-3-pro-image"));
    }
}
