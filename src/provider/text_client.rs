use super::ApiTransport;
use crate::{
    error::Result,
    models::{ChatRequest, TextGeneration, TextGenerationRequest},
};

#[derive(Clone)]
pub struct TextClient {
    transport: ApiTransport,
}

impl TextClient {
    pub(crate) fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn generate(&self, request: TextGenerationRequest) -> Result<TextGeneration> {
        let body = ChatRequest::from_request(&request);

        log::info!("Invoking text model: {}", request.model);
        log::debug!(
            "Chat request: {} message(s), image config {:?}",
            body.messages.len(),
            body.google.image_config
        );

        let raw = self.transport.post_json("chat/completions", &body).await?;
        let generation = TextGeneration::from_chat_response(raw);

        log::debug!(
            "Text model returned {} file(s), text: {}",
            generation.files.len(),
            generation.text.is_some()
        );

        Ok(generation)
    }
}
