//! Common error types for Voxline

use thiserror::Error;

/// Common result type for Voxline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Voxline crates
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus document is malformed (missing id/text, duplicate id, bad JSON).
    ///
    /// Fatal at startup: no partial index is ever built.
    #[error("Corpus format error: {0}")]
    CorpusFormat(String),

    /// Persisted recency ledger could not be parsed.
    ///
    /// Never surfaced past [`crate::ledger::RecencyLedger::load`], which
    /// recovers with an empty ledger.
    #[error("Recency ledger corrupt: {0}")]
    LedgerCorrupt(String),

    /// The corpus is empty, so no reply can be chosen
    #[error("No reply available: corpus is empty")]
    SelectionNotFound,

    /// Persisted state could not be read or written
    #[error("State store error: {0}")]
    Store(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
