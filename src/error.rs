//! Error handling and custom error types
//!
//! Provides unified error handling across the pipeline using thiserror, and
//! the classification callers match on to decide what the user gets to see.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input contains more than one image")]
    MultipleImages,

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image too large: {0} bytes")]
    TooLarge(u64),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Download failed after {attempts} attempts, retry budget exhausted: {last}")]
    ExhaustedRetries { attempts: u32, last: String },

    #[error("Invalid media reference: {0}")]
    InvalidMedia(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Voice synthesis error: {0}")]
    VoiceSynthesis(String),
}

/// Classification of an [`Error`] as seen by the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedType,
    TooLarge,
    TransportFailure,
    ExhaustedRetries,
    MultipleImages,
    UpstreamModelError,
    VoiceSynthesisError,
    /// Anything unexpected. Logged in full, shown to the user as a generic message.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MultipleImages => ErrorKind::MultipleImages,
            Error::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Error::TooLarge(_) => ErrorKind::TooLarge,
            Error::Transport(_) => ErrorKind::TransportFailure,
            Error::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            Error::AiProvider(_) => ErrorKind::UpstreamModelError,
            Error::VoiceSynthesis(_) => ErrorKind::VoiceSynthesisError,
            Error::Io(_) | Error::Config(_) | Error::InvalidMedia(_) => ErrorKind::Internal,
        }
    }

    /// Only network-level failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransportFailure
    }
}

pub type Result<T> = std::result::Result<T, Error>;
