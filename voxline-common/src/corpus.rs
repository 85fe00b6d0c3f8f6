//! Corpus index
//!
//! Parses the voice-line corpus document and builds the immutable, preprocessed
//! index used for scoring.
//!
//! **Document shape:**
//! ```json
//! { "count": 2, "items": [ { "id": "...", "text": "...", "displayName": "...",
//!   "tags": ["..."], "audioRef": "https://..." } ] }
//! ```
//! The legacy field names `hero` and `audioSrc` are accepted as aliases.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Label shown for entries that carry no display name
pub const DEFAULT_DISPLAY_NAME: &str = "Bot";

/// Raw corpus document as fetched from disk or network
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCorpus {
    /// Declared item count (informational only)
    #[serde(default)]
    pub count: Option<u64>,

    /// Voice line records
    #[serde(default)]
    pub items: Vec<RawEntry>,
}

/// One raw voice line record.
///
/// `id` and `text` are optional here so that a missing field is reported as a
/// [`Error::CorpusFormat`] naming the offending record instead of a serde error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "hero")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, alias = "audioSrc")]
    pub audio_ref: Option<String>,
}

/// `"tags": null` reads the same as a missing tag list
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A candidate reply line. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusEntry {
    /// Unique, non-empty identifier
    pub id: String,
    /// Speaker label (None renders as [`DEFAULT_DISPLAY_NAME`])
    pub display_name: Option<String>,
    /// Reply text as authored
    pub text: String,
    /// Tags as authored
    pub tags: Vec<String>,
    /// Audio locator (URL, `file://` URL or path)
    pub audio_ref: Option<String>,
}

impl CorpusEntry {
    /// Speaker label for display
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Corpus entry plus the lowercase views used by the scorer
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: CorpusEntry,
    /// Lowercase copy of `entry.text`
    pub lower_text: String,
    /// Lowercase tag set
    pub lower_tags: HashSet<String>,
}

impl IndexedEntry {
    fn new(entry: CorpusEntry) -> Self {
        let lower_text = entry.text.to_lowercase();
        let lower_tags = entry.tags.iter().map(|t| t.to_lowercase()).collect();
        Self {
            entry,
            lower_text,
            lower_tags,
        }
    }
}

/// Ordered, immutable collection of indexed corpus entries.
///
/// **Invariant:** all entry ids are unique.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    entries: Vec<IndexedEntry>,
}

impl CorpusIndex {
    /// Parse a corpus JSON document and build the index.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: RawCorpus = serde_json::from_slice(bytes)
            .map_err(|e| Error::CorpusFormat(format!("Invalid corpus JSON: {}", e)))?;
        Self::build(raw)
    }

    /// Build the index from raw records.
    ///
    /// # Errors
    /// [`Error::CorpusFormat`] if any record lacks a non-empty `id` or `text`,
    /// or if two records share an `id`.
    pub fn build(raw: RawCorpus) -> Result<Self> {
        if let Some(count) = raw.count {
            if count != raw.items.len() as u64 {
                warn!(
                    "Corpus declares count={} but contains {} items",
                    count,
                    raw.items.len()
                );
            }
        }

        let mut seen = HashSet::with_capacity(raw.items.len());
        let mut entries = Vec::with_capacity(raw.items.len());

        for (position, item) in raw.items.into_iter().enumerate() {
            let id = item
                .id
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| {
                    Error::CorpusFormat(format!("Record {} has no id", position))
                })?;

            let text = item
                .text
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| {
                    Error::CorpusFormat(format!("Record {} ('{}') has no text", position, id))
                })?;

            if !seen.insert(id.clone()) {
                return Err(Error::CorpusFormat(format!(
                    "Duplicate id '{}' at record {}",
                    id, position
                )));
            }

            entries.push(IndexedEntry::new(CorpusEntry {
                id,
                display_name: item.display_name,
                text,
                tags: item.tags,
                audio_ref: item.audio_ref.filter(|r| !r.trim().is_empty()),
            }));
        }

        debug!("Built corpus index with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the corpus holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in corpus order
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// Look up an entry by id
    pub fn get(&self, id: &str) -> Option<&CorpusEntry> {
        self.entries
            .iter()
            .find(|e| e.entry.id == id)
            .map(|e| &e.entry)
    }
}
