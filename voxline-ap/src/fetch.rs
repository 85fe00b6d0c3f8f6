//! Locator fetching
//!
//! Resolves corpus and audio locators to bytes. Supported forms:
//! - `http://` and `https://` URLs (reqwest, no Referer header)
//! - `file://` URLs
//! - plain filesystem paths

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Parsed locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Network resource
    Remote(Url),
    /// Local file
    Local(PathBuf),
}

impl Locator {
    /// Classify a raw locator string
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Fetch("Empty locator".to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| Error::Fetch(format!("Invalid URL '{}': {}", trimmed, e)))?;
            return Ok(Locator::Remote(url));
        }

        if lower.starts_with("file://") {
            let url = Url::parse(trimmed)
                .map_err(|e| Error::Fetch(format!("Invalid file URL '{}': {}", trimmed, e)))?;
            let path = url
                .to_file_path()
                .map_err(|_| Error::Fetch(format!("Not a local file URL: {}", trimmed)))?;
            return Ok(Locator::Local(path));
        }

        Ok(Locator::Local(PathBuf::from(trimmed)))
    }

    /// File extension of the locator's path, used as a decoder hint
    pub fn extension(&self) -> Option<String> {
        let path = match self {
            Locator::Remote(url) => PathBuf::from(url.path()),
            Locator::Local(path) => path.clone(),
        };
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Source of locator bytes
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Fetcher for URLs and local paths
#[derive(Clone)]
pub struct LocatorFetcher {
    client: reqwest::Client,
}

impl LocatorFetcher {
    /// Create a fetcher whose network requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .referer(false)
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for LocatorFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        match Locator::parse(locator)? {
            Locator::Remote(url) => {
                debug!("Fetching {}", url);
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| Error::Fetch(format!("Request to {} failed: {}", url, e)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Fetch(format!("fetch {} returned {}", url, status)));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| Error::Fetch(format!("Reading body of {} failed: {}", url, e)))?;
                Ok(bytes.to_vec())
            }
            Locator::Local(path) => {
                debug!("Reading {}", path.display());
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| Error::Fetch(format!("Failed to read {}: {}", path.display(), e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_locators() {
        assert!(matches!(
            Locator::parse("https://cdn.example/a.mp3").unwrap(),
            Locator::Remote(_)
        ));
        assert_eq!(
            Locator::parse("/tmp/lines/a.ogg").unwrap(),
            Locator::Local(PathBuf::from("/tmp/lines/a.ogg"))
        );
        assert!(Locator::parse("   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_file_url() {
        assert_eq!(
            Locator::parse("file:///tmp/lines/a.wav").unwrap(),
            Locator::Local(PathBuf::from("/tmp/lines/a.wav"))
        );
    }

    #[test]
    fn test_extension_hint() {
        assert_eq!(
            Locator::parse("https://cdn.example/vo/axe_01.MP3?x=1").unwrap().extension(),
            Some("mp3".to_string())
        );
        assert_eq!(Locator::parse("clip").unwrap().extension(), None);
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bytes.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let fetcher = LocatorFetcher::new(Duration::from_secs(1)).unwrap();
        let bytes = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let dir = TempDir::new().unwrap();
        let fetcher = LocatorFetcher::new(Duration::from_secs(1)).unwrap();
        let result = fetcher
            .fetch(dir.path().join("absent.mp3").to_str().unwrap())
            .await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }
}
