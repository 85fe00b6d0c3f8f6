//! Low-latency output context for the decoded-buffer tier
//!
//! An [`OutputContext`] starts suspended and must be resumed from an explicit
//! user action before it produces sound. [`CpalContext`] is the cpal-backed
//! implementation; tests substitute their own.

use crate::audio::{AudioOutput, PcmBuffer, Resampler, SimpleDecoder, Voice};
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// Run state of an output context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
}

/// Decode and one-shot playback surface
pub trait OutputContext {
    fn state(&self) -> ContextState;

    /// Start (or restart) audio output
    fn resume(&mut self) -> Result<()>;

    /// Play a sine tone for `duration`
    fn emit_tone(&mut self, frequency_hz: f32, gain: f32, duration: Duration) -> Result<()>;

    /// Job that decodes encoded audio into a buffer ready for
    /// [`OutputContext::start_one_shot`]. The controller runs it on the
    /// blocking pool.
    fn decoder(&self) -> DecodeJob;

    /// Play `buffer` once from the start. Returns as soon as playback is scheduled.
    fn start_one_shot(&mut self, buffer: PcmBuffer) -> Result<()>;
}

/// Decode work detached from the context: encoded bytes and an extension hint in,
/// device-rate PCM out
pub type DecodeJob = Box<dyn FnOnce(Vec<u8>, Option<String>) -> Result<PcmBuffer> + Send>;

/// Creates the output context on first unlock
pub type ContextOpener = Box<dyn Fn() -> Result<Box<dyn OutputContext>>>;

/// Output context backed by a cpal stream
pub struct CpalContext {
    output: AudioOutput,
}

impl CpalContext {
    /// Open the named device (or the default device). The stream starts suspended.
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let output = AudioOutput::open(device_name)?;
        Ok(Self { output })
    }

    /// Opener for [`crate::playback::PlaybackController`]
    pub fn opener(device_name: Option<String>) -> ContextOpener {
        Box::new(move || {
            let context = CpalContext::open(device_name.as_deref())?;
            Ok(Box::new(context) as Box<dyn OutputContext>)
        })
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state() {
            ContextState::Running => Ok(()),
            ContextState::Suspended => Err(Error::ContextSuspended),
        }
    }
}

impl OutputContext for CpalContext {
    fn state(&self) -> ContextState {
        if self.output.is_running() {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    fn resume(&mut self) -> Result<()> {
        self.output.resume()
    }

    fn emit_tone(&mut self, frequency_hz: f32, gain: f32, duration: Duration) -> Result<()> {
        self.ensure_running()?;
        let rate = self.output.sample_rate();
        let frames = (duration.as_secs_f64() * rate as f64).round() as usize;
        debug!("Tone {}Hz gain={} for {} frames", frequency_hz, gain, frames);
        self.output
            .add_voice(Voice::tone(frequency_hz, gain, frames, rate))
    }

    fn decoder(&self) -> DecodeJob {
        let target_rate = self.output.sample_rate();
        Box::new(move |bytes, extension_hint| {
            let decoded = SimpleDecoder::decode_bytes(bytes, extension_hint.as_deref())?;
            Resampler::resample(decoded, target_rate)
        })
    }

    fn start_one_shot(&mut self, buffer: PcmBuffer) -> Result<()> {
        self.ensure_running()?;
        debug!(
            "Starting one-shot buffer: {} frames ({}ms)",
            buffer.frame_count(),
            buffer.duration_ms()
        );
        self.output.add_voice(Voice::buffer(buffer))
    }
}
