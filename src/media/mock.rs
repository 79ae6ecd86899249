use super::MediaFetcher;
use crate::models::{ImageMime, ImagePayload};
use crate::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A 1x1 PNG, used as the default mock image.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25,
    0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Scripted fetcher: queued outcomes are returned in order, then the tiny PNG.
#[derive(Clone)]
pub struct MockMediaFetcher {
    responses: Arc<Mutex<VecDeque<Result<ImagePayload>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockMediaFetcher {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_payload(self, payload: ImagePayload) -> Self {
        self.responses.lock().unwrap().push_back(Ok(payload));
        self
    }

    pub fn with_error(self, error: crate::Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn get_requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for MockMediaFetcher {
    async fn fetch(&self, reference: &str, _headers: &HeaderMap) -> Result<ImagePayload> {
        self.requested.lock().unwrap().push(reference.to_string());

        match self.responses.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(ImagePayload::from_bytes(TINY_PNG.to_vec(), ImageMime::Png)),
        }
    }
}
