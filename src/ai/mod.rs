//! LLM integration for chat replies
//!
//! Provides the interface the command pipeline uses to submit a composed
//! chat completion request, with an OpenAI implementation and a test mock.

pub mod mock;
pub mod openai;

pub use mock::MockChatClient;
pub use openai::OpenAiChatClient;

use crate::models::ChatCompletionRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Submit `request` and return the first choice's message text as sent.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String>;
}
