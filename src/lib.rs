//! GPT chat command handler
//!
//! Takes a chat command that may embed one image, validates and fetches the
//! image, asks an OpenAI-compatible chat model for a reply, and optionally
//! speaks short replies through a voice synthesis service.

pub mod ai;
pub mod app;
pub mod compose;
pub mod config;
pub mod error;
pub mod markup;
pub mod media;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod voice;

pub use error::{Error, ErrorKind, Result};
