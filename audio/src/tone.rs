//! Tone generation.
//!
//! Short enveloped sine tones and silence, used by the demo synthesizer and
//! for testing playback without a speech engine.

use std::f64::consts::PI;

/// Attack and release length of a tone's envelope, in seconds.
const FADE_SECS: f64 = 0.005;

/// Generates a sine tone as 16-bit PCM samples.
///
/// `amplitude` is in 0.0..=1.0 of full scale. The first and last 5ms are
/// faded so consecutive tones do not click.
pub fn sine(freq: f64, samples: usize, sample_rate: u32, amplitude: f64) -> Vec<i16> {
    let mut data = vec![0i16; samples];
    if freq <= 0.0 || sample_rate == 0 {
        return data;
    }

    let amplitude = amplitude.clamp(0.0, 1.0);
    let fade = ((FADE_SECS * sample_rate as f64) as usize).min(samples / 2).max(1);
    for (i, slot) in data.iter_mut().enumerate() {
        let t = i as f64 / sample_rate as f64;
        let envelope = if i < fade {
            i as f64 / fade as f64
        } else if i >= samples - fade {
            (samples - i) as f64 / fade as f64
        } else {
            1.0
        };
        let value = (2.0 * PI * freq * t).sin() * amplitude * envelope;
        *slot = (value * i16::MAX as f64) as i16;
    }
    data
}

/// Generates `samples` zero-valued samples.
pub fn silence(samples: usize) -> Vec<i16> {
    vec![0i16; samples]
}

/// Calculates the number of samples for a given duration in ms.
pub fn duration_samples(dur_ms: u32, sample_rate: u32) -> usize {
    (sample_rate as usize * dur_ms as usize) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_length_and_range() {
        let data = sine(440.0, 2400, 24000, 0.5);
        assert_eq!(data.len(), 2400);
        let peak = data.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 15000 && peak <= 16384, "peak {}", peak);
    }

    #[test]
    fn test_sine_fades_in_and_out() {
        let data = sine(440.0, 2400, 24000, 1.0);
        assert_eq!(data[0], 0);
        assert!(data[2399].unsigned_abs() < 300);
    }

    #[test]
    fn test_sine_zero_freq_is_silent() {
        assert!(sine(0.0, 100, 24000, 1.0).iter().all(|&s| s == 0));
    }

    #[test]
    fn test_sine_clamps_amplitude() {
        let data = sine(440.0, 2400, 24000, 3.0);
        assert!(data.iter().all(|&s| s != i16::MIN));
    }

    #[test]
    fn test_silence() {
        assert_eq!(silence(3), vec![0, 0, 0]);
    }

    #[test]
    fn test_duration_samples() {
        assert_eq!(duration_samples(100, 24000), 2400);
        assert_eq!(duration_samples(10, 16000), 160);
    }
}
