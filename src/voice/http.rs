use super::VoiceService;
use crate::models::AudioClip;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_AUDIO_MIME: &str = "audio/wav";

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_id: Option<u32>,
}

/// Speech synthesis over HTTP: `POST {endpoint}` with `{input, speaker_id?}`,
/// audio bytes in the response body.
pub struct HttpVoiceClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpVoiceClient {
    pub fn new_with_client(endpoint: String, client: Client) -> Self {
        Self {
            client,
            endpoint,
            // Synthesis can be slow.
            timeout: Duration::from_secs(60),
        }
    }
}

#[async_trait]
impl VoiceService for HttpVoiceClient {
    async fn synthesize(&self, text: &str, speaker_id: Option<u32>) -> Result<AudioClip> {
        tracing::debug!(
            "Synthesizing {} chars (speaker: {:?})",
            text.chars().count(),
            speaker_id
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&SynthesizeRequest {
                input: text,
                speaker_id,
            })
            .send()
            .await
            .map_err(|e| {
                Error::VoiceSynthesis(format!(
                    "Failed to reach voice service at {}: {}",
                    self.endpoint, e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VoiceSynthesis(format!(
                "Voice service error (status {}): {}",
                status, body
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::VoiceSynthesis(format!("Failed to read audio: {}", e)))?;
        if data.is_empty() {
            return Err(Error::VoiceSynthesis(
                "Voice service returned no audio".to_string(),
            ));
        }

        Ok(AudioClip {
            data: data.to_vec(),
            mime_type,
        })
    }
}
