use serde::{Deserialize, Serialize};

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// A binary attachment returned alongside (or instead of) generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub media_type: String,
    pub base64: String,
}

impl GeneratedFile {
    pub fn new(media_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            base64: base64.into(),
        }
    }

    /// Splits a `data:<mime>;base64,<payload>` URI. Returns `None` for plain
    /// URLs and non-base64 data URIs.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(DATA_PREFIX)?;
        let (media_type, payload) = rest.split_once(BASE64_MARKER)?;
        Some(Self::new(media_type, payload))
    }

    pub fn to_data_uri(&self) -> String {
        data_uri(&self.media_type, &self.base64)
    }
}

pub fn data_uri(media_type: &str, base64: &str) -> String {
    format!("{}{}{}{}", DATA_PREFIX, media_type, BASE64_MARKER, base64)
}

/// Guesses the media type of a base64 image payload from its leading bytes.
pub fn sniff_media_type(base64: &str) -> &'static str {
    if base64.starts_with("iVBORw0KGgo") {
        "image/png"
    } else if base64.starts_with("/9j/") {
        "image/jpeg"
    } else if base64.starts_with("R0lGOD") {
        "image/gif"
    } else if base64.starts_with("UklGR") {
        "image/webp"
    } else if base64.starts_with("Qk") {
        "image/bmp"
    } else {
        "image/png"
    }
}

/// Reference images may arrive either as data URIs or as bare payloads.
pub fn reference_image_url(image: &str) -> String {
    if image.starts_with(DATA_PREFIX) {
        image.to_string()
    } else {
        data_uri(sniff_media_type(image), image)
    }
}
