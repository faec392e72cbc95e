//! Mistral implementation of the chat model trait.

use async_trait::async_trait;
use mistral_client::{ChatRequest, Message, MistralClient};

use crate::error::Result;
use crate::traits::chat::{ChatModel, CompletionRequest};

/// [`ChatModel`] over the Mistral chat-completions API.
#[derive(Clone)]
pub struct MistralChat {
    client: MistralClient,
    model: String,
}

impl MistralChat {
    pub fn new(client: MistralClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut chat = ChatRequest::new(&self.model).temperature(request.temperature);
        if let Some(system) = &request.system {
            chat = chat.message(Message::system(system));
        }
        chat = chat.message(Message::user(&request.user));
        if request.json {
            chat = chat.json_object();
        }
        chat
    }
}

#[async_trait]
impl ChatModel for MistralChat {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self.client.chat_completion(self.build_request(request)).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_has_system_then_user() {
        let chat = MistralChat::new(MistralClient::new("k"), "mistral-large-latest");
        let request = chat.build_request(&CompletionRequest::json("sys", "usr", 0.1));

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "usr");
        assert!(request.response_format.is_some());
        assert_eq!(request.temperature, Some(0.1));
    }

    #[test]
    fn test_text_request_is_user_only() {
        let chat = MistralChat::new(MistralClient::new("k"), "m");
        let request = chat.build_request(&CompletionRequest::text("phone?", 0.1));
        assert_eq!(request.messages.len(), 1);
        assert!(request.response_format.is_none());
    }
}
