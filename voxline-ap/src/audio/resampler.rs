//! Audio resampling using rubato
//!
//! Converts decoded voice lines to the output device's sample rate.

use crate::audio::types::PcmBuffer;
use crate::error::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Number of channels in every [`PcmBuffer`]
const CHANNELS: usize = 2;

/// Audio resampler using rubato for sample rate conversion.
pub struct Resampler;

impl Resampler {
    /// Resample a stereo buffer to `output_rate`.
    ///
    /// Returns the buffer unchanged if it is already at `output_rate` or empty.
    pub fn resample(buffer: PcmBuffer, output_rate: u32) -> Result<PcmBuffer> {
        if buffer.sample_rate == output_rate || buffer.samples.is_empty() {
            debug!("Sample rate already at {}Hz, skipping resample", output_rate);
            return Ok(buffer);
        }

        debug!(
            "Resampling from {}Hz to {}Hz",
            buffer.sample_rate, output_rate
        );

        // De-interleave samples for rubato (which expects planar format)
        let planar_input = Self::deinterleave(&buffer.samples, CHANNELS);
        let input_frames = planar_input[0].len();

        // FastFixedIn: good quality/performance tradeoff for short voice lines
        let mut resampler = FastFixedIn::<f32>::new(
            output_rate as f64 / buffer.sample_rate as f64,
            1.0, // max_relative_ratio (no runtime changes)
            PolynomialDegree::Septic,
            input_frames,
            CHANNELS,
        )
        .map_err(|e| Error::Decode(format!("Failed to create resampler: {}", e)))?;

        let planar_output = resampler
            .process(&planar_input, None)
            .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

        let samples = Self::interleave(planar_output);
        debug!(
            "Resampled {} input frames to {} output frames",
            input_frames,
            samples.len() / CHANNELS
        );

        Ok(PcmBuffer::new(samples, output_rate))
    }

    /// Convert interleaved samples to planar format.
    ///
    /// Input:  [L, R, L, R, L, R, ...]
    /// Output: [[L, L, L, ...], [R, R, R, ...]]
    fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
        let num_frames = samples.len() / channels;
        let mut planar = vec![Vec::with_capacity(num_frames); channels];

        for frame in samples.chunks_exact(channels) {
            for (ch_idx, sample) in frame.iter().enumerate() {
                planar[ch_idx].push(*sample);
            }
        }

        planar
    }

    /// Convert planar samples to interleaved format.
    fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
        if planar.is_empty() {
            return Vec::new();
        }

        let num_channels = planar.len();
        let num_frames = planar[0].len();
        let mut interleaved = Vec::with_capacity(num_frames * num_channels);

        for frame_idx in 0..num_frames {
            for channel in &planar {
                interleaved.push(channel[frame_idx]);
            }
        }

        interleaved
    }
}
