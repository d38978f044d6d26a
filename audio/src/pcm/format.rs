//! PCM audio format definitions.

use std::time::Duration;

/// Describes a 16-bit signed integer PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Sample rate in Hz (e.g., 24000, 48000).
    pub sample_rate: u32,
    /// True for stereo (2 channels), false for mono (1 channel).
    pub stereo: bool,
}

impl Format {
    /// Creates a new format with the given sample rate and mono audio.
    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate, stereo: false }
    }

    /// Creates a new format with the given sample rate and stereo audio.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self { sample_rate, stereo: true }
    }

    /// Returns the number of channels (1 for mono, 2 for stereo).
    pub fn channels(&self) -> u16 {
        if self.stereo { 2 } else { 1 }
    }

    /// Returns the number of bytes per sample frame.
    /// For 16-bit audio: 2 bytes for mono, 4 bytes for stereo.
    pub fn sample_bytes(&self) -> usize {
        if self.stereo { 4 } else { 2 }
    }

    /// Returns the playback duration of `frames` sample frames.
    pub fn duration(&self, frames: usize) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }

    /// Returns the number of sample frames that play for `duration`.
    pub fn frames_in_duration(&self, duration: Duration) -> usize {
        (duration.as_secs_f64() * self.sample_rate as f64).round() as usize
    }
}

// Common format presets
impl Format {
    /// 16kHz mono
    pub const MONO_16K: Format = Format::mono(16000);
    /// 24kHz mono (default speech output)
    pub const MONO_24K: Format = Format::mono(24000);
}

impl Default for Format {
    fn default() -> Self {
        Format::MONO_24K
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_channels() {
        assert_eq!(Format::mono(16000).channels(), 1);
        assert_eq!(Format::stereo(48000).channels(), 2);
    }

    #[test]
    fn test_format_sample_bytes() {
        assert_eq!(Format::mono(16000).sample_bytes(), 2);
        assert_eq!(Format::stereo(48000).sample_bytes(), 4);
    }

    #[test]
    fn test_default_is_24k_mono() {
        let fmt = Format::default();
        assert_eq!(fmt.sample_rate, 24000);
        assert!(!fmt.stereo);
    }

    #[test]
    fn test_duration() {
        let fmt = Format::MONO_24K;
        assert_eq!(fmt.duration(24000), Duration::from_secs(1));
        assert_eq!(fmt.duration(2400), Duration::from_millis(100));
        assert_eq!(Format::mono(0).duration(100), Duration::ZERO);
    }

    #[test]
    fn test_frames_in_duration() {
        let fmt = Format::MONO_24K;
        assert_eq!(fmt.frames_in_duration(Duration::from_millis(10)), 240);
        // 4096 frames at 24kHz is roughly 170ms
        let period = fmt.duration(4096);
        assert_eq!(period.as_millis(), 170);
    }
}
