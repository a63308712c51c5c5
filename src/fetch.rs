use crate::{
    error::{ImageGenError, Result},
    models::data_uri,
};
use base64::{engine::general_purpose, Engine as _};

const DEFAULT_MIME: &str = "image/png";

/// Downloads remote images and re-encodes them as data URIs.
#[derive(Clone, Default)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn url_to_base64(&self, url: &str) -> Result<String> {
        log::info!("Fetching image: {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageGenError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_MIME)
            .to_string();

        let bytes = response.bytes().await?;
        log::debug!("Fetched {} bytes ({})", bytes.len(), mime);

        Ok(data_uri(&mime, &general_purpose::STANDARD.encode(&bytes)))
    }
}
