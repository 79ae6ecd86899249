//! Command handling: turns one chat command into a model reply.

use crate::ai::{ChatService, OpenAiChatClient};
use crate::compose::compose_request;
use crate::config::Config;
use crate::error::ErrorKind;
use crate::media::{HttpMediaFetcher, MediaFetcher, RetryPolicy, RetryingFetcher};
use crate::models::{CommandOutput, ImagePayload, OutboundMessage};
use crate::normalize::normalize_input;
use crate::prompts::Messages;
use crate::voice::{HttpVoiceClient, VoiceService};
use crate::Error;
use reqwest::header::HeaderMap;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs the `gpt` command. Holds only read-only state, so one instance can
/// serve any number of concurrent commands.
pub struct App {
    config: Config,
    messages: &'static Messages,
    chat: Box<dyn ChatService>,
    fetcher: Box<dyn MediaFetcher>,
    voice: Option<Box<dyn VoiceService>>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn ChatService>,
    pub fetcher: Box<dyn MediaFetcher>,
    pub voice: Option<Box<dyn VoiceService>>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(config: Config, services: AppServices) -> Self {
        Self {
            messages: Messages::for_locale(config.locale),
            config,
            chat: services.chat,
            fetcher: services.fetcher,
            voice: services.voice,
        }
    }

    /// Wire the HTTP-backed services described by `config`.
    pub fn from_config(config: Config) -> Self {
        // Reuse one HTTP connection pool across clients.
        let http_client = reqwest::Client::new();

        info!(
            "Chat models: text={}, image={}",
            config.text_model, config.image_model
        );
        let chat = OpenAiChatClient::new_with_client(config.api_key.clone(), http_client.clone())
            .with_base_url(config.api_base_url.clone());

        let fetcher = RetryingFetcher::new(
            HttpMediaFetcher::new_with_client(http_client.clone()),
            RetryPolicy::default(),
        );

        let voice: Option<Box<dyn VoiceService>> = match &config.voice_endpoint {
            Some(endpoint) => {
                info!("Voice synthesis endpoint: {}", endpoint);
                Some(Box::new(HttpVoiceClient::new_with_client(
                    endpoint.clone(),
                    http_client,
                )))
            }
            None => {
                if config.use_voice {
                    warn!("Voice replies are enabled but no voice endpoint is configured");
                }
                None
            }
        };

        Self::with_services(
            config,
            AppServices {
                chat: Box::new(chat),
                fetcher: Box::new(fetcher),
                voice,
            },
        )
    }

    /// Handle one command. Failures are turned into user-facing text here and
    /// never escape as errors.
    pub async fn handle(&self, message: &str) -> CommandOutput {
        let request_id = Uuid::new_v4();
        self.process(message)
            .instrument(info_span!("command", %request_id))
            .await
    }

    async fn process(&self, message: &str) -> CommandOutput {
        if message.trim().is_empty() {
            return CommandOutput::text(self.messages.expect_input);
        }

        let input = match normalize_input(message) {
            Ok(input) => input,
            Err(e) => return self.reject(e),
        };
        // Markup alone, such as an img with no source, leaves nothing to send.
        if input.text.trim().is_empty() && input.image_ref.is_none() {
            return CommandOutput::text(self.messages.expect_input);
        }

        let image = match &input.image_ref {
            Some(reference) => match self.fetch_image(reference).await {
                Ok(payload) => Some(payload),
                Err(e) => return self.reject(e),
            },
            None => None,
        };

        let request = compose_request(&input.text, image.as_ref(), &self.config);
        info!(
            model = %request.model,
            with_image = image.is_some(),
            "Dispatching chat request"
        );

        let reply = match self.chat.complete(&request).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                error!("Error calling OpenAI API: {}", e);
                return CommandOutput::text(self.messages.upstream_error);
            }
        };

        let mut output = CommandOutput::text(reply.clone());
        if let Some(voice) = self.voice_for(&reply) {
            match voice.synthesize(&reply, self.config.speaker_id).await {
                Ok(clip) => {
                    debug!("Synthesized {} bytes of {}", clip.data.len(), clip.mime_type);
                    output.push(OutboundMessage::Audio(clip));
                }
                Err(e) => {
                    warn!("Voice synthesis failed: {}", e);
                    output.push(OutboundMessage::Text(self.messages.voice_error.to_string()));
                }
            }
        }
        output
    }

    async fn fetch_image(&self, reference: &str) -> crate::Result<ImagePayload> {
        debug!("Fetching image reference {}", reference);
        let payload = self.fetcher.fetch(reference, &HeaderMap::new()).await?;
        debug!(
            "Fetched {} image ({} bytes)",
            payload.mime,
            payload.raw_bytes.len()
        );
        Ok(payload)
    }

    fn reject(&self, error: Error) -> CommandOutput {
        let kind = error.kind();
        match kind {
            ErrorKind::MultipleImages | ErrorKind::UnsupportedType | ErrorKind::TooLarge => {
                info!("Rejected command: {}", error)
            }
            _ => error!("Failed to resolve image: {}", error),
        }
        CommandOutput::text(self.messages.for_error(kind))
    }

    /// The voice service, if this reply should also be spoken.
    fn voice_for(&self, reply: &str) -> Option<&dyn VoiceService> {
        if !self.config.use_voice || reply.is_empty() {
            return None;
        }
        let voice = self.voice.as_deref()?;
        (reply.chars().count() <= self.config.voice_length_threshold).then_some(voice)
    }
}
