//! Audio decode, resample and output
//!
//! Pipeline for the decoded-buffer playback tier: symphonia decode, rubato
//! resample to the device rate, cpal output.

pub mod decoder;
pub mod output;
pub mod resampler;
pub mod types;

pub use decoder::SimpleDecoder;
pub use output::{AudioOutput, Voice};
pub use resampler::Resampler;
pub use types::{AudioFrame, PcmBuffer};
