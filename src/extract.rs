//! Locating image data in text-model output.
//!
//! A multimodal text model may answer with binary attachments, or with text
//! that embeds the image in one of several shapes. [`classify_text`] decides
//! which shape a piece of text has without doing any I/O; [`resolve`] turns a
//! whole [`TextGeneration`] into the final string, fetching remote URLs when
//! needed.

use crate::{
    error::{ImageGenError, Result},
    fetch::ImageFetcher,
    models::{data_uri, GeneratedFile, TextGeneration},
};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[.*?\]\((.+?)\)$").expect("valid regex"));
static EMBEDDED_DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"data:image/[a-z]+;base64,(.+)").expect("valid regex"));
static BASE64_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"base64,([A-Za-z0-9+/=]+)").expect("valid regex"));
static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://.*\.(png|jpg|jpeg|gif|webp|bmp)$").expect("valid regex")
});

/// Media type assumed for a bare `base64,` payload. The payload format is not
/// checked, so non-JPEG data is mislabelled here.
const BARE_BASE64_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Ready-to-use data URI.
    DataUri(String),
    /// Remote image that still has to be downloaded.
    RemoteUrl(String),
    /// Nothing image-like; the text itself.
    Text(String),
}

pub fn classify_text(text: &str) -> Extraction {
    if let Some(caps) = MARKDOWN_IMAGE.captures(text) {
        let target = &caps[1];
        // Subtypes such as `svg+xml` fall outside the regex but are still inline.
        if EMBEDDED_DATA_URI.is_match(target) || GeneratedFile::from_data_uri(target).is_some() {
            log::debug!("Markdown image with inline data URI");
            return Extraction::DataUri(target.to_string());
        }
        log::debug!("Markdown image pointing at {}", target);
        return Extraction::RemoteUrl(target.to_string());
    }

    if let Some(caps) = BASE64_MARKER.captures(text) {
        log::debug!("Bare base64 payload, assuming {}", BARE_BASE64_MIME);
        return Extraction::DataUri(data_uri(BARE_BASE64_MIME, &caps[1]));
    }

    if IMAGE_URL.is_match(text) {
        log::debug!("Direct image URL");
        return Extraction::RemoteUrl(text.to_string());
    }

    log::debug!("No image found in text output, returning it as-is");
    Extraction::Text(text.to_string())
}

/// Produces the final string for a text-path generation.
///
/// Attachments win over text. When several are returned only the last one is
/// used.
pub async fn resolve(generation: TextGeneration, fetcher: &ImageFetcher) -> Result<String> {
    if let Some(file) = generation.files.last() {
        if generation.files.len() > 1 {
            log::debug!(
                "Model returned {} files, keeping the last one",
                generation.files.len()
            );
        }
        return Ok(file.to_data_uri());
    }

    let text = match generation.text.as_deref() {
        Some(text) => text,
        None => {
            log::error!(
                "Model returned neither files nor text: {}",
                serde_json::to_string_pretty(&generation.raw).unwrap_or_default()
            );
            return Err(ImageGenError::Generation("image generation failed".into()));
        }
    };

    match classify_text(text) {
        Extraction::DataUri(uri) => Ok(uri),
        Extraction::RemoteUrl(url) => fetcher.url_to_base64(&url).await,
        Extraction::Text(text) => Ok(text),
    }
}
