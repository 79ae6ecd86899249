//! Data models and structures
//!
//! Defines the per-command data flowing through the pipeline and the
//! request/response payloads exchanged with the OpenAI chat API.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Cleaned command text plus the single image reference it carried, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedInput {
    pub text: String,
    pub image_ref: Option<String>,
}

/// Image MIME types accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Jpeg,
    Png,
    Gif,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
        }
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated image, created fresh for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub raw_bytes: Vec<u8>,
    pub base64: String,
    pub data_url: String,
    pub mime: ImageMime,
}

impl ImagePayload {
    /// Encode already-validated bytes. Callers are responsible for the size
    /// and type checks.
    pub fn from_bytes(raw_bytes: Vec<u8>, mime: ImageMime) -> Self {
        let base64 = base64::engine::general_purpose::STANDARD.encode(&raw_bytes);
        let data_url = format!("data:{};base64,{}", mime, base64);
        Self {
            raw_bytes,
            base64,
            data_url,
            mime,
        }
    }
}

/// Synthesized speech returned by the voice service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    /// File extension matching `mime_type`, for saving the clip to disk.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/ogg" | "audio/opus" => "ogg",
            "audio/aac" => "aac",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            _ => "bin",
        }
    }
}

/// One message sent back to the chat user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Audio(AudioClip),
}

/// Everything a single command produced, in send order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub messages: Vec<OutboundMessage>,
}

impl CommandOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![OutboundMessage::Text(text.into())],
        }
    }

    pub fn push(&mut self, message: OutboundMessage) {
        self.messages.push(message);
    }

    /// The first text message, which is always the primary reply.
    pub fn primary_text(&self) -> Option<&str> {
        self.messages.iter().find_map(|message| match message {
            OutboundMessage::Text(text) => Some(text.as_str()),
            OutboundMessage::Audio(_) => None,
        })
    }

    pub fn audio(&self) -> Option<&AudioClip> {
        self.messages.iter().find_map(|message| match message {
            OutboundMessage::Audio(clip) => Some(clip),
            OutboundMessage::Text(_) => None,
        })
    }
}

// OpenAI API Request/Response models

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Request body for OpenAI chat completions. The model is chosen per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Message content is either a plain string or a sequence of typed parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatMessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

/// One content segment in multipart message input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ChatMessageContent>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}
