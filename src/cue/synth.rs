//! Built-in cue tone: a short, bright, fast-decaying sine.

use std::io::Cursor;

const SAMPLE_RATE: u32 = 44_100;
const DURATION_SECONDS: f32 = 0.045;
const FREQUENCY_HZ: f32 = 1760.0;
const AMPLITUDE: f32 = 0.25;

/// Duration of the synthesized tone in seconds.
pub fn fallback_tone_duration() -> f64 {
    DURATION_SECONDS as f64
}

/// Render the fallback tone as mono f32 samples.
pub fn fallback_tone_samples() -> Vec<f32> {
    let sample_count = (SAMPLE_RATE as f32 * DURATION_SECONDS).ceil() as usize;
    let mut samples = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let t = i as f32 / SAMPLE_RATE as f32;
        let envelope = 1.0 - i as f32 / sample_count as f32;
        samples.push((2.0 * std::f32::consts::PI * FREQUENCY_HZ * t).sin() * envelope * AMPLITUDE);
    }
    samples
}

/// Render the fallback tone as in-memory WAV bytes, so any backend can
/// decode it through its normal from-memory path.
pub fn fallback_tone_wav() -> Vec<u8> {
    let samples = fallback_tone_samples();
    let mut cursor = Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("WAV writer creation");
    for &sample in &samples {
        writer.write_sample(sample).expect("WAV sample write");
    }
    writer.finalize().expect("WAV finalize");
    cursor.into_inner()
}
