//! Decoded-buffer tier pipeline: WAV fixture → fetch → decode → resample

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use voxline_ap::audio::{Resampler, SimpleDecoder};
use voxline_ap::fetch::{Fetcher, LocatorFetcher};

/// Write a 16-bit WAV with a 440Hz sine
fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let sample = ((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5 * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_decode_mono_wav_as_stereo() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mono.wav");
    write_wav(&path, 1, 22050, 2205);

    let buffer = SimpleDecoder::decode_bytes(std::fs::read(&path).unwrap(), Some("wav")).unwrap();

    assert_eq!(buffer.sample_rate, 22050);
    assert_eq!(buffer.frame_count(), 2205);
    assert_eq!(buffer.duration_ms(), 100);

    // Mono source is duplicated onto both channels
    let frame = buffer.frame(100).unwrap();
    assert_eq!(frame.left, frame.right);
    assert!(buffer.samples.iter().all(|s| s.abs() <= 0.51));
}

#[test]
fn test_decode_without_extension_hint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("line");
    write_wav(&path, 2, 44100, 4410);

    let buffer = SimpleDecoder::decode_bytes(std::fs::read(&path).unwrap(), None).unwrap();
    assert_eq!(buffer.sample_rate, 44100);
    assert_eq!(buffer.frame_count(), 4410);
}

#[tokio::test]
async fn test_fetch_decode_resample_local_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("axe_01.wav");
    write_wav(&path, 2, 24000, 2400);

    let fetcher = LocatorFetcher::new(Duration::from_secs(2)).unwrap();
    let bytes = fetcher.fetch(path.to_str().unwrap()).await.unwrap();

    let decoded = SimpleDecoder::decode_bytes(bytes, Some("wav")).unwrap();
    let resampled = Resampler::resample(decoded, 48000).unwrap();

    assert_eq!(resampled.sample_rate, 48000);
    let frames = resampled.frame_count();
    assert!(
        (4780..=4820).contains(&frames),
        "expected ~4800 frames, got {}",
        frames
    );
}
