//! Demo synthesizer that renders text as tones.

use narrate_audio::tone::{duration_samples, silence, sine};

use crate::tts::{SynthesisError, Synthesized, Synthesizer};
use crate::voice::VoiceParams;

const BASE_FREQ: f64 = 220.0;
const BASE_AMPLITUDE: f64 = 0.3;
const WORD_MS: f64 = 60.0;
const CHAR_MS: f64 = 40.0;
const WORD_GAP_MS: f64 = 40.0;
const PAUSE_MS: f64 = 220.0;

/// Renders one short tone per word, with longer pauses after punctuation.
///
/// Needs no speech engine, so it stands in for one in headless runs. Rate,
/// pitch and volume follow [`VoiceParams`]: absolute values of ±1 double or
/// halve the tempo and shift the pitch by an octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneSynthesizer {
    sample_rate: u32,
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new(24000)
    }
}

impl ToneSynthesizer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    fn ms(&self, ms: f64, tempo: f64) -> usize {
        duration_samples((ms / tempo).round() as u32, self.sample_rate)
    }
}

impl Synthesizer for ToneSynthesizer {
    fn synthesize(&self, text: &str, params: &VoiceParams) -> Result<Synthesized, SynthesisError> {
        if self.sample_rate == 0 {
            return Err(SynthesisError::Engine("sample rate is 0".to_string()));
        }

        let tempo =
            2f64.powf(params.absolute_rate.clamp(-1.0, 1.0)) * params.relative_rate.max(0.1);
        let freq = BASE_FREQ
            * 2f64.powf(params.absolute_pitch.clamp(-1.0, 1.0))
            * params.relative_pitch.max(0.1);
        let amplitude = BASE_AMPLITUDE
            * params.absolute_volume.clamp(0.0, 1.0)
            * params.relative_volume.max(0.0);

        let mut samples = Vec::new();
        for word in text.split_whitespace() {
            let chars = word.chars().filter(|c| c.is_alphanumeric()).count();
            if chars > 0 {
                let len = self.ms(WORD_MS + CHAR_MS * chars.min(8) as f64, tempo);
                // Vary the pitch a little so words are distinguishable.
                let step = 1.0 + (chars % 5) as f64 * 0.06;
                samples.extend(sine(freq * step, len, self.sample_rate, amplitude));
            }

            let pause = if word.ends_with(['.', '!', '?', ',', ';', ':']) {
                PAUSE_MS
            } else {
                WORD_GAP_MS
            };
            samples.extend(silence(self.ms(pause, tempo)));
        }

        Ok(Synthesized::new(self.sample_rate, samples))
    }

    fn name(&self) -> &str {
        "tone"
    }
}

#[cfg(test)]
mod tone_tests {
    use super::*;

    #[test]
    fn test_renders_at_its_rate() {
        let tone = ToneSynthesizer::new(16000);
        let out = tone.synthesize("hello world", &VoiceParams::default()).unwrap();
        assert_eq!(out.sample_rate, 16000);
        assert!(!out.samples.is_empty());
    }

    #[test]
    fn test_faster_rate_is_shorter() {
        let tone = ToneSynthesizer::default();
        let slow = tone
            .synthesize("one two three", &VoiceParams::default().with_rate(-1.0))
            .unwrap();
        let fast = tone
            .synthesize("one two three", &VoiceParams::default().with_rate(1.0))
            .unwrap();
        assert!(fast.samples.len() * 3 < slow.samples.len());
    }

    #[test]
    fn test_zero_volume_is_silent() {
        let tone = ToneSynthesizer::default();
        let out = tone
            .synthesize("quiet please", &VoiceParams::default().with_volume(0.0))
            .unwrap();
        assert!(!out.samples.is_empty());
        assert!(out.samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_punctuation_adds_pause() {
        let tone = ToneSynthesizer::default();
        let params = VoiceParams::default();
        let plain = tone.synthesize("one two", &params).unwrap();
        let paused = tone.synthesize("one. two", &params).unwrap();
        assert!(paused.samples.len() > plain.samples.len());
    }

    #[test]
    fn test_whitespace_renders_nothing() {
        let tone = ToneSynthesizer::default();
        let out = tone.synthesize(" \n", &VoiceParams::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_rate_is_an_error() {
        let tone = ToneSynthesizer::new(0);
        assert!(matches!(
            tone.synthesize("hi", &VoiceParams::default()),
            Err(SynthesisError::Engine(_))
        ));
    }
}
