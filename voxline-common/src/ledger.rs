//! Recency ledger
//!
//! Bounded history of recently served entry ids. Entries in the ledger have
//! their scores damped so that the same line is not repeated back-to-back,
//! without ever excluding it outright.
//!
//! **Invariants:**
//! - Length never exceeds the capacity (120 by default)
//! - No duplicate ids: re-recording an id moves it to the end
//! - Order is recency order, most recent last

use crate::error::{Error, Result};
use crate::store::{StateStore, RECENT_KEY};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum number of ids remembered
pub const LEDGER_CAPACITY: usize = 120;

/// Score multiplier applied to recently served entries
pub const RECENCY_PENALTY: f64 = 0.15;

/// Persisted recency history
pub struct RecencyLedger {
    ids: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
    store: Arc<dyn StateStore>,
}

impl RecencyLedger {
    /// Load the ledger from `store`.
    ///
    /// Absent, unreadable or malformed state yields an empty ledger; this never
    /// fails.
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        Self::load_with_capacity(store, LEDGER_CAPACITY)
    }

    /// Load with a non-default capacity
    pub fn load_with_capacity(store: Arc<dyn StateStore>, capacity: usize) -> Self {
        let ids = match store.get(RECENT_KEY) {
            Ok(Some(raw)) => match Self::parse(&raw) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("{}; starting with empty history", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read recency ledger ({}); starting with empty history", e);
                Vec::new()
            }
        };

        let mut ledger = Self {
            ids: VecDeque::with_capacity(capacity + 1),
            members: HashSet::with_capacity(capacity + 1),
            capacity,
            store,
        };
        for id in ids {
            ledger.push_back(id);
        }

        debug!("Loaded recency ledger with {} ids", ledger.len());
        ledger
    }

    /// Parse a persisted ledger (JSON array of strings)
    pub fn parse(raw: &str) -> Result<Vec<String>> {
        serde_json::from_str::<Vec<String>>(raw)
            .map_err(|e| Error::LedgerCorrupt(format!("expected JSON array of ids: {}", e)))
    }

    /// Multiply `score` by [`RECENCY_PENALTY`] if `entry_id` was served recently
    pub fn penalize(&self, entry_id: &str, score: f64) -> f64 {
        if self.contains(entry_id) {
            score * RECENCY_PENALTY
        } else {
            score
        }
    }

    /// Record `entry_id` as most recently served and persist the ledger.
    ///
    /// A persistence failure is logged; the in-memory ledger is still updated.
    pub fn record(&mut self, entry_id: &str) {
        self.push_back(entry_id.to_string());

        if let Err(e) = self.persist() {
            warn!("Failed to persist recency ledger: {}", e);
        }
    }

    /// Forget all history, in memory and in the store
    pub fn clear(&mut self) {
        self.ids.clear();
        self.members.clear();

        if let Err(e) = self.store.remove(RECENT_KEY) {
            warn!("Failed to clear persisted recency ledger: {}", e);
        }
    }

    /// True if `entry_id` is in the ledger
    pub fn contains(&self, entry_id: &str) -> bool {
        self.members.contains(entry_id)
    }

    /// Number of remembered ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in recency order (oldest first)
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    fn push_back(&mut self, id: String) {
        if self.members.contains(&id) {
            self.ids.retain(|existing| existing != &id);
        } else {
            self.members.insert(id.clone());
        }
        self.ids.push_back(id);

        while self.ids.len() > self.capacity {
            if let Some(evicted) = self.ids.pop_front() {
                self.members.remove(&evicted);
            }
        }
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.ids)
            .map_err(|e| Error::Store(format!("Failed to serialize ledger: {}", e)))?;
        self.store.set(RECENT_KEY, &json)
    }
}
