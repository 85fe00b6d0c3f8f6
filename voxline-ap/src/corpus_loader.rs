//! Corpus loading with cache-preferring semantics
//!
//! Local corpora are read directly. Remote corpora are served from the on-disk
//! cache when present; otherwise they are downloaded, validated, and cached.
//! Each URL gets its own cache file, named after a SHA-256 of the URL.

use crate::error::Result;
use crate::fetch::{Fetcher, Locator};
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use voxline_common::CorpusIndex;

/// Hex digits of the URL digest kept in the cache file name
const CACHE_KEY_LEN: usize = 16;

/// Loads the corpus once at startup
pub struct CorpusLoader<'f> {
    fetcher: &'f dyn Fetcher,
    cache_dir: PathBuf,
}

impl<'f> CorpusLoader<'f> {
    pub fn new(fetcher: &'f dyn Fetcher, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache file for the corpus at `url`: `corpus-<digest>.json`
    pub fn cache_path(&self, url: &Url) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        self.cache_dir
            .join(format!("corpus-{}.json", &digest[..CACHE_KEY_LEN]))
    }

    /// Load and index the corpus at `locator`.
    ///
    /// # Errors
    /// Fetch failures, and `CorpusFormat` errors for a malformed document.
    pub async fn load(&self, locator: &str) -> Result<CorpusIndex> {
        match Locator::parse(locator)? {
            Locator::Local(path) => {
                info!("Loading corpus from {}", path.display());
                let bytes = self.fetcher.fetch(locator).await?;
                Ok(CorpusIndex::from_json(&bytes)?)
            }
            Locator::Remote(url) => {
                let cache_path = self.cache_path(&url);
                if let Some(index) = Self::load_cached(&cache_path) {
                    info!("Loaded corpus from cache {}", cache_path.display());
                    return Ok(index);
                }

                info!("Downloading corpus from {}", url);
                let bytes = self.fetcher.fetch(locator).await?;
                let index = CorpusIndex::from_json(&bytes)?;
                Self::store_cached(&cache_path, &bytes);
                Ok(index)
            }
        }
    }

    fn load_cached(path: &Path) -> Option<CorpusIndex> {
        let bytes = std::fs::read(path).ok()?;
        match CorpusIndex::from_json(&bytes) {
            Ok(index) => Some(index),
            Err(e) => {
                warn!("Ignoring unusable corpus cache {}: {}", path.display(), e);
                None
            }
        }
    }

    fn store_cached(path: &Path, bytes: &[u8]) {
        let result = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(path, bytes));
        if let Err(e) = result {
            warn!("Failed to cache corpus at {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const REMOTE: &str = "https://cdn.example/voice_index.json";
    const DOC: &[u8] = br#"{"count":1,"items":[{"id":"a","text":"hello","tags":[]}]}"#;

    /// Serves a fixed body per locator and counts requests
    struct CountingFetcher {
        bodies: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn serving(routes: &[(&str, &[u8])]) -> Self {
            Self {
                bodies: routes
                    .iter()
                    .map(|(locator, body)| (locator.to_string(), body.to_vec()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .get(locator)
                .cloned()
                .ok_or_else(|| Error::Fetch(format!("no route for {}", locator)))
        }
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_remote_corpus_cached_after_first_load() {
        let dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::serving(&[(REMOTE, DOC)]);
        let loader = CorpusLoader::new(&fetcher, dir.path().join("cache"));

        let first = loader.load(REMOTE).await.unwrap();
        let second = loader.load(REMOTE).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(fetcher.calls(), 1);
        assert!(loader.cache_path(&url(REMOTE)).exists());
    }

    #[tokio::test]
    async fn test_each_url_has_its_own_cache() {
        let first_url = "https://a.example/first.json";
        let second_url = "https://b.example/second.json";
        let dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::serving(&[
            (first_url, br#"{"items":[{"id":"first_line","text":"one"}]}"#),
            (second_url, br#"{"items":[{"id":"second_line","text":"two"}]}"#),
        ]);
        let loader = CorpusLoader::new(&fetcher, dir.path());

        let first = loader.load(first_url).await.unwrap();
        let second = loader.load(second_url).await.unwrap();

        assert!(first.get("first_line").is_some());
        assert!(second.get("second_line").is_some());
        assert!(second.get("first_line").is_none());
        assert_eq!(fetcher.calls(), 2);
        assert_ne!(loader.cache_path(&url(first_url)), loader.cache_path(&url(second_url)));

        // Both stay cached
        loader.load(first_url).await.unwrap();
        loader.load(second_url).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_cache_refetched() {
        let dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::serving(&[(REMOTE, DOC)]);
        let loader = CorpusLoader::new(&fetcher, dir.path());
        std::fs::write(loader.cache_path(&url(REMOTE)), b"garbage").unwrap();

        let index = loader.load(REMOTE).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_remote_corpus_not_cached() {
        let dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::serving(&[(REMOTE, br#"{"items":[{"id":"a"}]}"#)]);
        let loader = CorpusLoader::new(&fetcher, dir.path());

        let result = loader.load(REMOTE).await;
        assert!(matches!(
            result,
            Err(Error::Common(voxline_common::Error::CorpusFormat(_)))
        ));
        assert!(!loader.cache_path(&url(REMOTE)).exists());
    }

    #[tokio::test]
    async fn test_local_corpus_never_cached() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("cache");
        let fetcher = CountingFetcher::serving(&[("/srv/voice_index.json", DOC)]);
        let loader = CorpusLoader::new(&fetcher, &cache_dir);

        loader.load("/srv/voice_index.json").await.unwrap();
        loader.load("/srv/voice_index.json").await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert!(!cache_dir.exists());
    }
}
