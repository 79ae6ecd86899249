//! Optional speech synthesis for short replies.

pub mod http;
pub mod mock;

pub use http::HttpVoiceClient;
pub use mock::MockVoiceClient;

use crate::models::AudioClip;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VoiceService: Send + Sync {
    async fn synthesize(&self, text: &str, speaker_id: Option<u32>) -> Result<AudioClip>;
}
