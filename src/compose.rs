//! Builds the chat completion request for one command.

use crate::config::Config;
use crate::models::{
    ChatCompletionRequest, ChatMessage, ChatMessageContent, ImagePayload, ImageUrl, MessagePart,
    Role,
};

/// System persona first, then one multipart user message.
///
/// The user message always starts with the text part; an image, when present,
/// is appended as a data URL and switches the request to the vision model.
pub fn compose_request(
    text: &str,
    image: Option<&ImagePayload>,
    config: &Config,
) -> ChatCompletionRequest {
    let mut parts = vec![MessagePart::Text {
        text: text.to_string(),
    }];

    let model = match image {
        Some(image) => {
            parts.push(MessagePart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_url.clone(),
                },
            });
            &config.image_model
        }
        None => &config.text_model,
    };

    ChatCompletionRequest {
        model: model.clone(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: Some(ChatMessageContent::Text(config.system_content.clone())),
            },
            ChatMessage {
                role: Role::User,
                content: Some(ChatMessageContent::Parts(parts)),
            },
        ],
    }
}
