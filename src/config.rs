//! Process-wide configuration, read once at startup.

use crate::prompts::{Locale, DEFAULT_SYSTEM_CONTENT};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-4o";
pub const DEFAULT_VOICE_LENGTH_THRESHOLD: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub system_content: String,
    pub use_voice: bool,
    pub voice_length_threshold: usize,
    pub speaker_id: Option<u32>,
    pub voice_endpoint: Option<String>,
    pub locale: Locale,
}

impl Config {
    /// Config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            system_content: DEFAULT_SYSTEM_CONTENT.trim().to_string(),
            use_voice: false,
            voice_length_threshold: DEFAULT_VOICE_LENGTH_THRESHOLD,
            speaker_id: None,
            voice_endpoint: None,
            locale: Locale::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key =
            get("OPENAI_API_KEY").ok_or_else(|| Error::Config("OPENAI_API_KEY not set".to_string()))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = get("OPENAI_BASE_URL") {
            config.api_base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("GPT_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = get("GPT_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(content) = get("GPT_SYSTEM_CONTENT") {
            config.system_content = content;
        }
        if let Some(value) = get("GPT_USE_VOICE") {
            config.use_voice = parse_bool("GPT_USE_VOICE", &value)?;
        }
        if let Some(value) = get("GPT_VOICE_LENGTH_THRESHOLD") {
            config.voice_length_threshold = value.trim().parse().map_err(|_| {
                Error::Config(format!("GPT_VOICE_LENGTH_THRESHOLD is not a number: {}", value))
            })?;
        }
        if let Some(value) = get("GPT_SPEAKER_ID") {
            config.speaker_id = Some(value.trim().parse().map_err(|_| {
                Error::Config(format!("GPT_SPEAKER_ID is not a number: {}", value))
            })?);
        }
        config.voice_endpoint = get("GPT_VOICE_ENDPOINT");
        if let Some(value) = get("GPT_LOCALE") {
            config.locale = Locale::parse(&value)
                .ok_or_else(|| Error::Config(format!("Unsupported GPT_LOCALE: {}", value)))?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{} is not a boolean: {}", key, value))),
    }
}
