use super::VoiceService;
use crate::models::AudioClip;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockVoiceClient {
    fail: bool,
    calls: Arc<Mutex<Vec<(String, Option<u32>)>>>,
}

impl MockVoiceClient {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<(String, Option<u32>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockVoiceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceService for MockVoiceClient {
    async fn synthesize(&self, text: &str, speaker_id: Option<u32>) -> Result<AudioClip> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), speaker_id));

        if self.fail {
            return Err(Error::VoiceSynthesis("mock synthesis failure".to_string()));
        }

        Ok(AudioClip {
            data: text.as_bytes().to_vec(),
            mime_type: "audio/wav".to_string(),
        })
    }
}
