//! # Voxline Audio Player Library (voxline-ap)
//!
//! Terminal voice-line responder: loads the corpus, picks replies through
//! `voxline-common`, and plays their audio with tiered fallback.
//!
//! **Architecture:** decoded-buffer tier using symphonia + rubato + cpal,
//! streaming tiers using an external player process.

pub mod audio;
pub mod chat;
pub mod corpus_loader;
pub mod error;
pub mod fetch;
pub mod playback;

pub use error::{Error, Result};
