//! Keyword relevance scoring
//!
//! Tag hits dominate, substring hits in the line text add a smaller weight, and
//! a uniform jitter keeps every entry reachable and breaks ties randomly.

use crate::corpus::IndexedEntry;
use rand::Rng;

/// Weight added per keyword found in the entry's tag set
pub const TAG_HIT_WEIGHT: f64 = 8.0;

/// Weight added per keyword found as a substring of the entry's text
pub const TEXT_HIT_WEIGHT: f64 = 3.0;

/// Keywords shorter than this never count as text hits
pub const MIN_TEXT_HIT_LEN: usize = 4;

/// Upper bound (exclusive) of the uniform jitter added to every score
pub const JITTER_MAX: f64 = 1.25;

/// Deterministic part of the score: tag hits plus text hits.
pub fn keyword_score(entry: &IndexedEntry, keywords: &[String]) -> f64 {
    let tag_hits = keywords
        .iter()
        .filter(|k| entry.lower_tags.contains(k.as_str()))
        .count();
    let text_hits = keywords
        .iter()
        .filter(|k| k.len() >= MIN_TEXT_HIT_LEN && entry.lower_text.contains(k.as_str()))
        .count();

    tag_hits as f64 * TAG_HIT_WEIGHT + text_hits as f64 * TEXT_HIT_WEIGHT
}

/// Full score: [`keyword_score`] plus jitter drawn from `[0, JITTER_MAX)`.
pub fn score_entry<R: Rng + ?Sized>(entry: &IndexedEntry, keywords: &[String], rng: &mut R) -> f64 {
    keyword_score(entry, keywords) + rng.gen_range(0.0..JITTER_MAX)
}
