//! Synthesis of one chunk into the sample queue.

use narrate_buffer::SampleQueue;
use tracing::{debug, warn};

use crate::segment::trim_white;
use crate::tts::Synthesizer;
use crate::voice::VoiceParams;

/// What happened to one submitted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Empty or whitespace-only; the backend was not called.
    Skipped,
    /// Synthesized and appended.
    Queued { samples: usize },
    /// The backend failed or the queue was closed; nothing was appended.
    Failed,
}

/// Calls the backend for each chunk and appends the result to the queue.
///
/// The backend runs on the caller's thread without holding the queue lock;
/// only the append takes it.
pub struct SynthesisInvoker<'a, S: ?Sized> {
    synthesizer: &'a S,
    params: &'a VoiceParams,
    queue: &'a SampleQueue<i16>,
    sample_rate: u32,
}

impl<'a, S: Synthesizer + ?Sized> SynthesisInvoker<'a, S> {
    /// `sample_rate` is the rate the device plays at; output at any other
    /// rate is logged as a mismatch and queued as is.
    pub fn new(
        synthesizer: &'a S,
        params: &'a VoiceParams,
        queue: &'a SampleQueue<i16>,
        sample_rate: u32,
    ) -> Self {
        Self {
            synthesizer,
            params,
            queue,
            sample_rate,
        }
    }

    /// Synthesizes `chunk` and appends its samples.
    ///
    /// Failures are logged and reported in the outcome; they never stop the
    /// caller from submitting the next chunk.
    pub fn submit(&self, chunk: &str) -> ChunkOutcome {
        if trim_white(chunk).is_empty() {
            return ChunkOutcome::Skipped;
        }

        let out = match self.synthesizer.synthesize(chunk, self.params) {
            Ok(out) => out,
            Err(e) => {
                warn!(
                    backend = self.synthesizer.name(),
                    chars = chunk.chars().count(),
                    error = %e,
                    "invoker: synthesis failed, chunk skipped"
                );
                return ChunkOutcome::Failed;
            }
        };

        if out.sample_rate != self.sample_rate {
            warn!(
                backend = self.synthesizer.name(),
                got = out.sample_rate,
                want = self.sample_rate,
                "invoker: sample rate mismatch, playing unconverted"
            );
        }

        match self.queue.write(&out.samples) {
            Ok(n) => {
                debug!(
                    chars = chunk.chars().count(),
                    samples = n,
                    queued = self.queue.len(),
                    "invoker: chunk queued"
                );
                ChunkOutcome::Queued { samples: n }
            }
            Err(e) => {
                warn!(error = %e, "invoker: queue rejected samples");
                ChunkOutcome::Failed
            }
        }
    }
}
