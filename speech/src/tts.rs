//! Text-to-speech synthesis backends.

use std::sync::Arc;
use std::time::Duration;

use crate::voice::VoiceParams;

/// Error type for synthesis calls.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The engine could not be created or failed internally.
    #[error("engine error: {0}")]
    Engine(String),
    /// The engine refused the input (bad characters, unknown voice).
    #[error("input rejected: {0}")]
    Rejected(String),
    #[error("other error: {0}")]
    Other(String),
}

/// PCM produced by one synthesis call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesized {
    /// Rate the samples were rendered at, in Hz.
    pub sample_rate: u32,
    /// Mono 16-bit samples.
    pub samples: Vec<i16>,
}

impl Synthesized {
    /// Wraps mono samples rendered at `sample_rate` Hz.
    pub fn new(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Returns the playback length of the samples.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Interface for a text-to-speech engine.
///
/// Creating the value initializes the engine and dropping it shuts the
/// engine down. `synthesize` is called from the speaking thread with no
/// lock held, possibly from several threads at once.
pub trait Synthesizer: Send + Sync {
    /// Renders `text` with the given voice and returns the whole result.
    fn synthesize(&self, text: &str, params: &VoiceParams) -> Result<Synthesized, SynthesisError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

impl<T: Synthesizer + ?Sized> Synthesizer for Arc<T> {
    fn synthesize(&self, text: &str, params: &VoiceParams) -> Result<Synthesized, SynthesisError> {
        (**self).synthesize(text, params)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Synthesizer + ?Sized> Synthesizer for Box<T> {
    fn synthesize(&self, text: &str, params: &VoiceParams) -> Result<Synthesized, SynthesisError> {
        (**self).synthesize(text, params)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
