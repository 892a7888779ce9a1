//! Audio Test Fixtures
//!
//! Programmatically generated audio so tests have no file dependencies.
//!
//! Audio formats:
//! - Telephony: 8-bit μ-law, 8kHz, mono
//! - Backend: 16-bit signed little-endian PCM, mono
//!
//! A 20ms telephony frame is 160 μ-law bytes, which becomes 320 PCM bytes.

use std::f32::consts::PI;

/// Telephony sample rate (8kHz)
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

/// One 20ms telephony frame in samples
pub const FRAME_20MS: usize = 160;

/// μ-law code for digital silence
pub const ULAW_SILENCE: u8 = 0xFF;

/// Generate a frame of μ-law silence
pub fn ulaw_silence(duration_samples: usize) -> Vec<u8> {
    vec![ULAW_SILENCE; duration_samples]
}

/// Generate a sine wave tone at the telephony rate
pub fn generate_sine_wave(duration_samples: usize, frequency: f32, amplitude: f32) -> Vec<i16> {
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / TELEPHONY_SAMPLE_RATE as f32;

    (0..duration_samples)
        .map(|i| {
            let sample = (angular_freq * i as f32).sin() * max_amplitude;
            sample as i16
        })
        .collect()
}

/// Generate a constant-valued PCM frame
pub fn constant_samples(duration_samples: usize, value: i16) -> Vec<i16> {
    vec![value; duration_samples]
}

/// Convert samples to little-endian PCM bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Convert little-endian PCM bytes to samples (trailing odd byte ignored)
pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Peak absolute amplitude
pub fn calculate_peak(samples: &[i16]) -> i16 {
    samples
        .iter()
        .map(|s| s.saturating_abs())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_generation() {
        let silence = ulaw_silence(FRAME_20MS);
        assert_eq!(silence.len(), FRAME_20MS);
        assert!(silence.iter().all(|&b| b == ULAW_SILENCE));
    }

    #[test]
    fn test_sine_wave_generation() {
        let tone = generate_sine_wave(FRAME_20MS, 440.0, 0.5);
        assert_eq!(tone.len(), FRAME_20MS);
        let peak = calculate_peak(&tone);
        assert!(peak > 15000 && peak <= 16384);
    }

    #[test]
    fn test_sample_byte_conversion() {
        let samples = vec![0, 1, -1, i16::MAX, i16::MIN];
        let bytes = samples_to_bytes(&samples);
        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[2..4], &[0x01, 0x00]);
        assert_eq!(bytes_to_samples(&bytes), samples);
    }
}
