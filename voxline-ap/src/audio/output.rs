//! Audio output using cpal
//!
//! Owns one output stream whose callback mixes any number of one-shot voices
//! (decoded voice lines, unlock tones). Voices are dropped once they finish.
//! The stream is opened paused; [`AudioOutput::resume`] starts it.

use crate::audio::types::{AudioFrame, PcmBuffer};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// A sound scheduled on the output stream
#[derive(Debug)]
pub enum Voice {
    /// Decoded buffer, played once from the start
    Buffer { buffer: PcmBuffer, position: usize },
    /// Sine tone
    Tone {
        phase: f32,
        phase_step: f32,
        gain: f32,
        remaining_frames: usize,
    },
}

impl Voice {
    /// One-shot buffer voice
    pub fn buffer(buffer: PcmBuffer) -> Self {
        Voice::Buffer {
            buffer,
            position: 0,
        }
    }

    /// Sine tone voice lasting `frames` frames at `sample_rate`
    pub fn tone(frequency_hz: f32, gain: f32, frames: usize, sample_rate: u32) -> Self {
        Voice::Tone {
            phase: 0.0,
            phase_step: 2.0 * std::f32::consts::PI * frequency_hz / sample_rate as f32,
            gain,
            remaining_frames: frames,
        }
    }

    /// Produce the next frame, or None once finished
    pub fn next_frame(&mut self) -> Option<AudioFrame> {
        match self {
            Voice::Buffer { buffer, position } => {
                let frame = buffer.frame(*position)?;
                *position += 1;
                Some(frame)
            }
            Voice::Tone {
                phase,
                phase_step,
                gain,
                remaining_frames,
            } => {
                if *remaining_frames == 0 {
                    return None;
                }
                *remaining_frames -= 1;
                let sample = phase.sin() * *gain;
                *phase = (*phase + *phase_step) % (2.0 * std::f32::consts::PI);
                Some(AudioFrame::mono(sample))
            }
        }
    }
}

/// Mix one frame from all active voices, dropping finished ones.
pub fn mix_frame(voices: &mut Vec<Voice>) -> AudioFrame {
    let mut out = AudioFrame::zero();
    voices.retain_mut(|voice| match voice.next_frame() {
        Some(frame) => {
            out = out.mix(frame);
            true
        }
        None => false,
    });
    out
}

/// Audio output manager using cpal.
pub struct AudioOutput {
    config: StreamConfig,
    stream: Stream,
    voices: Arc<Mutex<Vec<Voice>>>,
    running: bool,
    /// Set by the stream error callback
    error_flag: Arc<AtomicBool>,
}

impl AudioOutput {
    /// Open an output device with a paused stream.
    ///
    /// # Arguments
    /// - `device_name`: Optional device name (None = default device). A named
    ///   device that cannot be found falls back to the default device.
    ///
    /// # Errors
    /// - No output device available
    /// - Failed to get a device configuration or build the stream
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = Self::find_device(&host, device_name)?;

        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        let voices = Arc::new(Mutex::new(Vec::new()));
        let error_flag = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, &voices, &error_flag)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, &voices, &error_flag)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, &voices, &error_flag)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        // Some backends start streams on creation
        if let Err(e) = stream.pause() {
            debug!("Could not pause freshly built stream: {}", e);
        }

        Ok(Self {
            config,
            stream,
            voices,
            running: false,
            error_flag,
        })
    }

    fn find_device(host: &cpal::Host, device_name: Option<&str>) -> Result<Device> {
        if let Some(name) = device_name {
            let found = host
                .output_devices()
                .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
                .find(|d| d.name().ok().as_deref() == Some(name));

            if let Some(device) = found {
                info!("Using requested audio device: {}", name);
                return Ok(device);
            }
            warn!("Requested device '{}' not found, falling back to default device", name);
        }

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?;
        info!(
            "Using default audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );
        Ok(device)
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        voices: &Arc<Mutex<Vec<Voice>>>,
        error_flag: &Arc<AtomicBool>,
    ) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = config.channels as usize;
        let voices = Arc::clone(voices);
        let error_flag = Arc::clone(error_flag);

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let mut voices = match voices.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };

                    for frame in data.chunks_mut(channels) {
                        let mixed = mix_frame(&mut voices);
                        let left = mixed.left.clamp(-1.0, 1.0);
                        let right = mixed.right.clamp(-1.0, 1.0);

                        for (ch_idx, sample) in frame.iter_mut().enumerate() {
                            let value = if ch_idx % 2 == 0 { left } else { right };
                            *sample = T::from_sample(value);
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                },
                None, // No timeout
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// True once resumed and no stream error has been reported
    pub fn is_running(&self) -> bool {
        self.running && !self.error_flag.load(Ordering::SeqCst)
    }

    /// Start (or restart) the output stream
    pub fn resume(&mut self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;
        self.error_flag.store(false, Ordering::SeqCst);
        self.running = true;
        info!("Audio stream running");
        Ok(())
    }

    /// Schedule a voice for playback
    pub fn add_voice(&self, voice: Voice) -> Result<()> {
        let mut voices = self
            .voices
            .lock()
            .map_err(|_| Error::AudioOutput("voice list lock poisoned".to_string()))?;
        voices.push(voice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_voice_plays_once() {
        let mut voices = vec![Voice::buffer(PcmBuffer::new(vec![0.5, -0.5, 0.25, -0.25], 44100))];

        assert_eq!(mix_frame(&mut voices), AudioFrame { left: 0.5, right: -0.5 });
        assert_eq!(mix_frame(&mut voices), AudioFrame { left: 0.25, right: -0.25 });
        assert_eq!(mix_frame(&mut voices), AudioFrame::zero());
        assert!(voices.is_empty());
    }

    #[test]
    fn test_voices_are_summed() {
        let mut voices = vec![
            Voice::buffer(PcmBuffer::new(vec![0.5, 0.5], 44100)),
            Voice::buffer(PcmBuffer::new(vec![0.25, -0.5], 44100)),
        ];
        assert_eq!(mix_frame(&mut voices), AudioFrame { left: 0.75, right: 0.0 });
    }

    #[test]
    fn test_tone_is_near_silent_and_finite() {
        let frames = 882; // 20ms at 44.1kHz
        let mut voices = vec![Voice::tone(440.0, 0.0001, frames, 44100)];

        let mut produced = 0;
        while !voices.is_empty() {
            let frame = mix_frame(&mut voices);
            assert!(frame.left.abs() <= 0.0001);
            produced += 1;
        }
        // The final call observes the finished voice and yields silence
        assert_eq!(produced, frames + 1);
    }
}
