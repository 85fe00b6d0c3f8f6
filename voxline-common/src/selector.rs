//! Reply selector
//!
//! Ranks every corpus entry against the query keywords, damps recently served
//! entries, keeps the top slice and draws one entry by weighted random
//! sampling. The drawn entry is recorded in the recency ledger.

use crate::corpus::{CorpusEntry, CorpusIndex, IndexedEntry};
use crate::error::{Error, Result};
use crate::ledger::RecencyLedger;
use crate::scorer;
use crate::tokenizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use tracing::debug;

/// Size of the top-ranked slice that weighted sampling draws from
pub const TOP_K: usize = 220;

/// One entry with its ledger-adjusted score
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub entry: &'a IndexedEntry,
    pub score: f64,
}

impl ScoredCandidate<'_> {
    /// Score used as sampling weight (negative scores count as zero)
    pub fn weight(&self) -> f64 {
        self.score.max(0.0)
    }
}

/// Score every entry, apply the recency penalty and return the top
/// [`TOP_K`] candidates sorted by descending score.
pub fn rank_candidates<'a, R: Rng + ?Sized>(
    index: &'a CorpusIndex,
    ledger: &RecencyLedger,
    keywords: &[String],
    rng: &mut R,
) -> Vec<ScoredCandidate<'a>> {
    let mut scored: Vec<ScoredCandidate<'a>> = index
        .entries()
        .iter()
        .map(|entry| {
            let raw = scorer::score_entry(entry, keywords, rng);
            ScoredCandidate {
                entry,
                score: ledger.penalize(&entry.entry.id, raw),
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(TOP_K);
    scored
}

/// Draw one candidate with probability proportional to its clamped score.
///
/// Falls back to a uniform draw when the total weight is not positive.
/// Returns None only for an empty slice.
pub fn weighted_pick<'c, 'a, R: Rng + ?Sized>(
    candidates: &'c [ScoredCandidate<'a>],
    rng: &mut R,
) -> Option<&'c ScoredCandidate<'a>> {
    if candidates.is_empty() {
        return None;
    }

    let mass: f64 = candidates.iter().map(ScoredCandidate::weight).sum();
    if mass <= 0.0 || !mass.is_finite() {
        return candidates.get(rng.gen_range(0..candidates.len()));
    }

    let mut remainder = rng.gen_range(0.0..mass);
    for candidate in candidates {
        remainder -= candidate.weight();
        if remainder <= 0.0 {
            return Some(candidate);
        }
    }

    // Floating-point rounding can leave a tiny positive remainder
    candidates.last()
}

/// Chooses replies from a corpus, remembering what it served.
pub struct Selector<R: Rng = StdRng> {
    index: CorpusIndex,
    ledger: RecencyLedger,
    rng: R,
}

impl Selector<StdRng> {
    /// Selector with an entropy-seeded random source
    pub fn new(index: CorpusIndex, ledger: RecencyLedger) -> Self {
        Self::with_rng(index, ledger, StdRng::from_entropy())
    }
}

impl<R: Rng> Selector<R> {
    /// Selector with an injected random source (seed it for reproducible tests)
    pub fn with_rng(index: CorpusIndex, ledger: RecencyLedger, rng: R) -> Self {
        Self { index, ledger, rng }
    }

    /// Choose a reply for free-text `query` and record it as recently served.
    ///
    /// # Errors
    /// [`Error::SelectionNotFound`] when the corpus is empty.
    pub fn choose_reply(&mut self, query: &str) -> Result<&CorpusEntry> {
        let keywords = tokenizer::query_keywords(query);
        debug!("Query keywords: {:?}", keywords);

        let candidates = rank_candidates(&self.index, &self.ledger, &keywords, &mut self.rng);
        let picked = weighted_pick(&candidates, &mut self.rng).ok_or(Error::SelectionNotFound)?;

        let indexed: &IndexedEntry = picked.entry;
        let entry = &indexed.entry;
        debug!(
            "Picked '{}' (score {:.3}) from {} candidates",
            entry.id,
            picked.score,
            candidates.len()
        );

        self.ledger.record(&entry.id);
        Ok(entry)
    }

    /// Forget reply history
    pub fn clear_history(&mut self) {
        self.ledger.clear();
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    pub fn ledger(&self) -> &RecencyLedger {
        &self.ledger
    }
}
