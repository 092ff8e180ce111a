//! Image download
//!
//! Fetched bytes must carry an `image/*` content type and decode as an
//! image before they are handed to OCR.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use sw_core::FetchConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not an image (content type {0:?})")]
    NotAnImage(String),

    #[error("image larger than {0} bytes")]
    TooLarge(usize),

    #[error("image could not be decoded: {0}")]
    Decode(String),
}

/// Source of raw image bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Check that `bytes` decode as a supported image format
pub fn validate_image(bytes: &[u8]) -> Result<(), FetchError> {
    image::load_from_memory(bytes)
        .map(|_| ())
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// HTTP(S) image fetcher
pub struct HttpImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(FetchError::NotAnImage(content_type));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        if bytes.len() > self.max_bytes {
            return Err(FetchError::TooLarge(self.max_bytes));
        }

        validate_image(&bytes)?;
        tracing::debug!(url, bytes = bytes.len(), %content_type, "Fetched image");

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_does_not_decode() {
        let err = validate_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_client_builds_from_config() {
        assert!(HttpImageFetcher::new(&FetchConfig::default()).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::NotAnImage("text/html".to_string()).to_string(),
            "not an image (content type \"text/html\")"
        );
        assert_eq!(FetchError::Status(404).to_string(), "unexpected status 404");
    }
}
