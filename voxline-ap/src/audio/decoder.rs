//! Audio decoder using symphonia
//!
//! Decodes in-memory audio (MP3, FLAC, AAC, Vorbis, WAV) to interleaved stereo
//! f32 PCM for the decoded-buffer playback tier.

use crate::audio::types::PcmBuffer;
use crate::error::{Error, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Simple whole-buffer audio decoder using symphonia.
pub struct SimpleDecoder;

impl SimpleDecoder {
    /// Decode a complete audio file held in memory.
    ///
    /// # Arguments
    /// - `bytes`: Encoded audio file contents
    /// - `extension_hint`: Optional file extension to help format probing
    ///
    /// # Returns
    /// Interleaved stereo buffer at the source sample rate (mono is duplicated,
    /// channels beyond the first two are dropped)
    ///
    /// # Errors
    /// - Unsupported or unrecognized format
    /// - No audio track, or no samples decoded
    pub fn decode_bytes(bytes: Vec<u8>, extension_hint: Option<&str>) -> Result<PcmBuffer> {
        debug!("Decoding {} bytes (hint: {:?})", bytes.len(), extension_hint);

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

        let mut format = probed.format;

        // Get the default audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| Error::Decode("Sample rate not found".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            // Skip packets for other tracks
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    interleaved.copy_interleaved_ref(decoded);
                    Self::append_stereo(interleaved.samples(), spec.channels.count(), &mut samples);
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Decode error: {}", e);
                    continue;
                }
                Err(e) => {
                    warn!("Decoder failed: {}", e);
                    break;
                }
            }
        }

        if samples.is_empty() {
            return Err(Error::Decode("No audio samples decoded".to_string()));
        }

        debug!(
            "Decoded {} frames at {}Hz",
            samples.len() / 2,
            sample_rate
        );

        Ok(PcmBuffer::new(samples, sample_rate))
    }

    /// Append interleaved samples with `channels` channels as stereo.
    fn append_stereo(interleaved: &[f32], channels: usize, output: &mut Vec<f32>) {
        match channels {
            0 => {}
            1 => {
                output.reserve(interleaved.len() * 2);
                for &sample in interleaved {
                    output.push(sample);
                    output.push(sample);
                }
            }
            n => {
                output.reserve(interleaved.len() / n * 2);
                for frame in interleaved.chunks_exact(n) {
                    output.push(frame[0]);
                    output.push(frame[1]);
                }
            }
        }
    }
}
