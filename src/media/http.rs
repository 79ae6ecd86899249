use super::{mime, MediaFetcher};
use crate::models::ImagePayload;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;

/// 10 MiB.
pub const MAX_CONTENT_SIZE: u64 = 10_485_760;

/// Resolves image references over HTTP(S), `data:` URLs and local `file:` URLs.
pub struct HttpMediaFetcher {
    client: Client,
    timeout: Duration,
    max_content_size: u64,
}

fn transport(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(30),
            max_content_size: MAX_CONTENT_SIZE,
        }
    }

    /// Per-request timeout for both the metadata probe and the body transfer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_content_size(mut self, max_content_size: u64) -> Self {
        self.max_content_size = max_content_size;
        self
    }

    fn check_size(&self, len: u64) -> Result<()> {
        if len > self.max_content_size {
            return Err(Error::TooLarge(len));
        }
        Ok(())
    }

    fn decode_data_url(&self, reference: &str) -> Result<ImagePayload> {
        let (meta, data) = reference
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| Error::InvalidMedia("Malformed data URL".to_string()))?;

        let mut params = meta.split(';');
        let declared = params.next().unwrap_or("").trim();
        let is_base64 = params.any(|param| param.trim().eq_ignore_ascii_case("base64"));

        let mime = mime::parse_content_type(declared).ok_or_else(|| {
            // An omitted media type means text/plain.
            let declared = if declared.is_empty() { "text/plain" } else { declared };
            Error::UnsupportedType(declared.to_string())
        })?;

        if !is_base64 {
            return Err(Error::InvalidMedia(
                "Data URL is not base64 encoded".to_string(),
            ));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| Error::InvalidMedia(format!("Failed to decode data URL: {}", e)))?;
        self.check_size(bytes.len() as u64)?;

        Ok(ImagePayload::from_bytes(bytes, mime))
    }

    async fn read_file(&self, url: &Url) -> Result<ImagePayload> {
        let path = url
            .to_file_path()
            .map_err(|_| Error::InvalidMedia(format!("Not a local file path: {}", url)))?;

        let metadata = tokio::fs::metadata(&path).await?;
        self.check_size(metadata.len())?;

        let bytes = tokio::fs::read(&path).await?;
        let mime = mime::detect_image_mime(&bytes).ok_or_else(|| {
            Error::UnsupportedType(format!("unrecognized content in {}", path.display()))
        })?;

        Ok(ImagePayload::from_bytes(bytes, mime))
    }

    async fn download(&self, url: Url, headers: &HeaderMap) -> Result<ImagePayload> {
        tracing::debug!("Probing image metadata at {}", url);

        let head = self
            .client
            .head(url.clone())
            .headers(headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        if !head.status().is_success() {
            return Err(Error::Transport(format!(
                "HEAD {} returned status {}",
                url,
                head.status()
            )));
        }

        // `Response::content_length` reports the (empty) HEAD body, so read the header.
        let declared_len = head
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        if let Some(len) = declared_len {
            self.check_size(len)?;
        }

        let content_type = head
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        let mime = mime::parse_content_type(content_type).ok_or_else(|| {
            let declared = if content_type.is_empty() { "<missing>" } else { content_type };
            Error::UnsupportedType(declared.to_string())
        })?;

        tracing::debug!(
            "Downloading {} ({}, declared {:?} bytes)",
            url,
            mime,
            declared_len
        );

        let mut response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "GET {} returned status {}",
                url,
                response.status()
            )));
        }

        let mut body = Vec::with_capacity(declared_len.unwrap_or(0) as usize);
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            self.check_size((body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }

        Ok(ImagePayload::from_bytes(body, mime))
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, reference: &str, headers: &HeaderMap) -> Result<ImagePayload> {
        let reference = reference.trim();
        if reference.starts_with("data:") {
            return self.decode_data_url(reference);
        }

        let url = Url::parse(reference)
            .map_err(|e| Error::InvalidMedia(format!("{}: {}", reference, e)))?;

        match url.scheme() {
            "file" => self.read_file(&url).await,
            "http" | "https" => self.download(url, headers).await,
            other => Err(Error::InvalidMedia(format!(
                "Unsupported URL scheme: {}",
                other
            ))),
        }
    }
}
