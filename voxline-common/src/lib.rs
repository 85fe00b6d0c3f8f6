//! # Voxline Common Library
//!
//! Reply selection core shared by the Voxline binaries:
//! - Corpus index (preprocessed voice lines)
//! - Query tokenizer and keyword scorer
//! - Recency ledger persisted through a pluggable state store
//! - Weighted reply selector
//! - Bootstrap configuration loading

pub mod config;
pub mod corpus;
pub mod error;
pub mod ledger;
pub mod scorer;
pub mod selector;
pub mod store;
pub mod tokenizer;

pub use corpus::{CorpusEntry, CorpusIndex};
pub use error::{Error, Result};
pub use ledger::RecencyLedger;
pub use selector::Selector;
pub use store::{JsonFileStore, MemoryStore, StateStore};
