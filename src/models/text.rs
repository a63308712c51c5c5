use super::common::{reference_image_url, GeneratedFile};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prompt for a text-path model: either one plain user turn, or a system
/// instruction followed by a user turn carrying reference images.
#[derive(Debug, Clone, PartialEq)]
pub enum TextPrompt {
    Plain(String),
    WithImages {
        system: String,
        images: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TextGenerationRequest {
    pub model: String,
    pub prompt: TextPrompt,
    pub image_options: ImageOptions,
    pub response_modalities: Vec<String>,
}

/// Normalized result of a text-path call.
#[derive(Debug, Clone, Default)]
pub struct TextGeneration {
    pub files: Vec<GeneratedFile>,
    pub text: Option<String>,
    pub raw: Value,
}

impl TextGeneration {
    /// Reads attachments from `message.images` and from `image_url` content
    /// parts carrying data URIs; text from a string `content` or the joined
    /// `text` parts.
    pub fn from_chat_response(raw: Value) -> Self {
        let mut files = Vec::new();
        let mut text = None;

        if let Some(message) = raw.pointer("/choices/0/message") {
            match message.get("content") {
                Some(Value::String(s)) => text = Some(s.clone()),
                Some(Value::Array(parts)) => {
                    let mut joined = String::new();
                    for part in parts {
                        match part.get("type").and_then(|t| t.as_str()) {
                            Some("text") => {
                                if let Some(s) = part.get("text").and_then(|t| t.as_str()) {
                                    joined.push_str(s);
                                }
                            }
                            Some("image_url") => {
                                if let Some(file) = image_part_file(part) {
                                    files.push(file);
                                }
                            }
                            _ => {}
                        }
                    }
                    if !joined.is_empty() {
                        text = Some(joined);
                    }
                }
                _ => {}
            }

            if let Some(images) = message.get("images").and_then(|i| i.as_array()) {
                files.extend(images.iter().filter_map(image_part_file));
            }
        }

        Self {
            files,
            text: text.filter(|t| !t.is_empty()),
            raw,
        }
    }
}

fn image_part_file(part: &Value) -> Option<GeneratedFile> {
    let url = part
        .get("image_url")
        .and_then(|img| img.get("url"))
        .or_else(|| part.get("url"))
        .and_then(|u| u.as_str())?;
    GeneratedFile::from_data_uri(url)
}

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub google: GoogleOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleOptions {
    pub image_config: ImageOptions,
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    pub fn from_request(request: &TextGenerationRequest) -> Self {
        let messages = match &request.prompt {
            TextPrompt::Plain(prompt) => vec![ChatMessage {
                role: "user".to_string(),
                content: ChatContent::Text(prompt.clone()),
            }],
            TextPrompt::WithImages { system, images } => vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ChatContent::Text(system.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: ChatContent::Parts(
                        images
                            .iter()
                            .map(|image| ContentPart::ImageUrl {
                                image_url: ImageUrl {
                                    url: reference_image_url(image),
                                },
                            })
                            .collect(),
                    ),
                },
            ],
        };

        Self {
            model: request.model.clone(),
            messages,
            google: GoogleOptions {
                image_config: request.image_options.clone(),
                response_modalities: request.response_modalities.clone(),
            },
        }
    }
}
