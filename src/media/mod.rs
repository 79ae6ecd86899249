//! Image resolution for commands that carry an image reference
//!
//! Resolves remote URLs and inline `data:`/`file:` references into a validated
//! [`ImagePayload`], enforcing the type allow-list and the size limit, with a
//! bounded retry wrapper for transient network failures.

pub mod http;
pub mod mime;
pub mod mock;
pub mod retry;

pub use http::{HttpMediaFetcher, MAX_CONTENT_SIZE};
pub use mock::MockMediaFetcher;
pub use retry::{RetryPolicy, RetryingFetcher};

use crate::models::ImagePayload;
use crate::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Resolve `reference` into an image payload. `headers` are sent with any
    /// network request the fetch makes.
    async fn fetch(&self, reference: &str, headers: &HeaderMap) -> Result<ImagePayload>;
}
