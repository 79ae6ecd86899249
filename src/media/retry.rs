use super::MediaFetcher;
use crate::models::ImagePayload;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::{error, warn};

pub const DEFAULT_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(20_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total fetch attempts, the first one included.
    pub attempts: u32,
    /// Fixed wait between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Retries the whole fetch (probe and transfer) on transport failures only.
///
/// Policy rejections pass through on the first attempt. When the budget runs
/// out the last transport error is folded into [`Error::ExhaustedRetries`].
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: MediaFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<F: MediaFetcher> MediaFetcher for RetryingFetcher<F> {
    async fn fetch(&self, reference: &str, headers: &HeaderMap) -> Result<ImagePayload> {
        let max_attempts = self.policy.attempts.max(1);
        let delay_ms = self.policy.delay.as_millis() as u64;
        let strategy = FixedInterval::new(self.policy.delay).take(max_attempts as usize - 1);

        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let inner = &self.inner;

        let result = RetryIf::spawn(
            strategy,
            move || async move {
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                let result = inner.fetch(reference, headers).await;
                if let Err(e) = &result {
                    if e.is_transient() && attempt < max_attempts {
                        warn!(
                            attempt,
                            max_attempts, delay_ms, "Image download failed: {}. Will retry...", e
                        );
                    }
                }
                result
            },
            |e: &Error| e.is_transient(),
        )
        .await;

        match result {
            Err(e) if e.is_transient() => {
                let attempts = counter.load(Ordering::Relaxed);
                error!(attempts, "Image download failed after retries: {}", e);
                Err(Error::ExhaustedRetries {
                    attempts,
                    last: e.to_string(),
                })
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaFetcher;
    use crate::models::ImageMime;
    use tokio::time::Instant;

    fn transport_error() -> Error {
        Error::Transport("operation timed out".to_string())
    }

    fn fetcher_with(mock: MockMediaFetcher) -> RetryingFetcher<MockMediaFetcher> {
        RetryingFetcher::new(mock, RetryPolicy::default())
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transport_failure_exhausts_budget() {
        let mut mock = MockMediaFetcher::new();
        for _ in 0..10 {
            mock = mock.with_error(transport_error());
        }
        let fetcher = fetcher_with(mock.clone());

        let started = Instant::now();
        let err = fetcher
            .fetch("https://x/y.png", &HeaderMap::new())
            .await
            .unwrap_err();

        assert_eq!(mock.get_call_count(), 5);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(80) && elapsed < Duration::from_secs(81));
        match err {
            Error::ExhaustedRetries { attempts, last } => {
                assert_eq!(attempts, 5);
                assert!(last.contains("timed out"));
            }
            other => panic!("expected ExhaustedRetries, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let mock = MockMediaFetcher::new()
            .with_error(transport_error())
            .with_error(transport_error());
        let fetcher = fetcher_with(mock.clone());

        let started = Instant::now();
        let payload = fetcher
            .fetch("https://x/y.png", &HeaderMap::new())
            .await
            .unwrap();

        assert_eq!(payload.mime, ImageMime::Png);
        assert_eq!(mock.get_call_count(), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(40) && elapsed < Duration::from_secs(41));
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_failures_are_not_retried() {
        for error in [
            Error::TooLarge(11 * 1024 * 1024),
            Error::UnsupportedType("image/webp".to_string()),
            Error::InvalidMedia("bad".to_string()),
        ] {
            let mock = MockMediaFetcher::new().with_error(error);
            let fetcher = fetcher_with(mock.clone());

            let started = Instant::now();
            let err = fetcher
                .fetch("https://x/y.png", &HeaderMap::new())
                .await
                .unwrap_err();

            assert!(!matches!(err, Error::ExhaustedRetries { .. }));
            assert_eq!(mock.get_call_count(), 1);
            assert!(started.elapsed() < Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_failure_after_transient_stops_immediately() {
        let mock = MockMediaFetcher::new()
            .with_error(transport_error())
            .with_error(Error::TooLarge(20_000_000));
        let fetcher = fetcher_with(mock.clone());

        let err = fetcher
            .fetch("https://x/y.png", &HeaderMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TooLarge(20_000_000)));
        assert_eq!(mock.get_call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy() {
        let mock = MockMediaFetcher::new().with_error(transport_error());
        let fetcher = RetryingFetcher::new(
            mock.clone(),
            RetryPolicy {
                attempts: 1,
                delay: Duration::from_secs(1),
            },
        );

        let err = fetcher
            .fetch("https://x/y.png", &HeaderMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ExhaustedRetries { attempts: 1, .. }));
        assert_eq!(mock.get_call_count(), 1);
    }
}
