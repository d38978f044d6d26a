//! Speech session: segmenter, invoker, queue and device behind one handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use narrate_audio::Format;
use narrate_audio::device::{DeviceError, Host, OutputStream, StreamConfig};
use narrate_buffer::SampleQueue;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::invoker::{ChunkOutcome, SynthesisInvoker};
use crate::segment::Segmenter;
use crate::sink::CallbackSink;
use crate::tts::{SynthesisError, Synthesizer};
use crate::voice::VoiceParams;

/// Error type for session construction and control.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("audio device: {0}")]
    Device(#[from] DeviceError),
    #[error("synthesis engine: {0}")]
    Engine(#[from] SynthesisError),
}

/// Options for [`SpeechSession::new`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Requested output stream; the device may negotiate channels.
    pub stream: StreamConfig,
    pub voice: VoiceParams,
    pub segmenter: Segmenter,
    /// Samples preallocated in the queue.
    pub queue_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        let stream = StreamConfig::default();
        Self {
            queue_capacity: stream.format.sample_rate as usize * 10,
            stream,
            voice: VoiceParams::default(),
            segmenter: Segmenter::default(),
        }
    }
}

/// Summary of one [`SpeechSession::speak`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeakReport {
    /// Chunks produced by the segmenter.
    pub chunks: usize,
    pub queued: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Samples appended to the queue.
    pub samples: usize,
}

impl SpeakReport {
    /// Adds the counts of `other` to this report.
    pub fn merge(&mut self, other: &SpeakReport) {
        self.chunks += other.chunks;
        self.queued += other.queued;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.samples += other.samples;
    }

    fn record(&mut self, outcome: ChunkOutcome) {
        self.chunks += 1;
        match outcome {
            ChunkOutcome::Skipped => self.skipped += 1,
            ChunkOutcome::Queued { samples } => {
                self.queued += 1;
                self.samples += samples;
            }
            ChunkOutcome::Failed => self.failed += 1,
        }
    }
}

/// Plays text through a synthesizer and an output device.
///
/// `speak` segments the text and synthesizes each chunk on the calling
/// thread, appending samples to a queue the device drains from its own
/// real-time callback. Several threads may speak at once; their chunks
/// interleave, each caller's chunks stay in order.
///
/// Dropping the session closes the device, then the queue, then shuts the
/// synthesizer down.
///
/// # Example
///
/// ```
/// use narrate_audio::device::ClockHost;
/// use narrate_speech::{SessionOptions, SpeechSession, ToneSynthesizer};
///
/// let session = SpeechSession::new(
///     ToneSynthesizer::default(),
///     &ClockHost::new(),
///     SessionOptions::default(),
/// )
/// .unwrap();
/// let report = session.speak("Hi.", false);
/// assert_eq!(report.queued, 1);
/// session.join();
/// assert_eq!(session.queued_samples(), 0);
/// ```
pub struct SpeechSession {
    stream: Mutex<Box<dyn OutputStream>>,
    queue: SampleQueue<i16>,
    config: StreamConfig,
    underruns: Arc<AtomicU64>,
    voice: VoiceParams,
    segmenter: Segmenter,
    synthesizer: Box<dyn Synthesizer>,
}

impl SpeechSession {
    /// Opens the output device and starts playback.
    ///
    /// The device starts unpaused and plays silence until something is
    /// spoken. A device failure is returned as [`SessionError::Device`].
    pub fn new<S>(
        synthesizer: S,
        host: &dyn Host,
        options: SessionOptions,
    ) -> Result<Self, SessionError>
    where
        S: Synthesizer + 'static,
    {
        let queue = SampleQueue::with_capacity(options.queue_capacity);
        let sink = CallbackSink::new(queue.clone());
        let underruns = sink.underruns();

        let stream = host.open_output(options.stream, sink.into_render())?;
        let config = *stream.config();
        if config.format.sample_rate != options.stream.format.sample_rate {
            warn!(
                requested = options.stream.format.sample_rate,
                negotiated = config.format.sample_rate,
                "session: device runs at a different rate"
            );
        }
        info!(
            backend = synthesizer.name(),
            sample_rate = config.format.sample_rate,
            channels = config.format.channels(),
            frames_per_buffer = config.frames_per_buffer,
            voice = %options.voice.profile,
            "session: started"
        );

        Ok(Self {
            stream: Mutex::new(stream),
            queue,
            config,
            underruns,
            voice: options.voice,
            segmenter: options.segmenter,
            synthesizer: Box::new(synthesizer),
        })
    }

    /// Speaks `text`.
    ///
    /// Every chunk is synthesized and queued before this returns. With
    /// `blocking`, it then waits until the queue has drained. A chunk that
    /// fails to synthesize is left out; the rest still play.
    pub fn speak(&self, text: &str, blocking: bool) -> SpeakReport {
        let invoker = SynthesisInvoker::new(
            self.synthesizer.as_ref(),
            &self.voice,
            &self.queue,
            self.config.format.sample_rate,
        );

        let mut report = SpeakReport::default();
        for chunk in self.segmenter.segment(text) {
            report.record(invoker.submit(chunk));
        }
        debug!(
            chunks = report.chunks,
            queued = report.queued,
            failed = report.failed,
            samples = report.samples,
            "session: speak done"
        );

        if blocking {
            self.join();
        }
        report
    }

    /// Blocks until every queued sample has been played.
    ///
    /// Returns at once when nothing is queued. Does not return while the
    /// device is paused with samples queued, unless the session is closed.
    pub fn join(&self) {
        self.queue.wait_empty();
    }

    /// Like [`join`](Self::join) but gives up after `timeout`; returns false
    /// if samples were still queued at the deadline.
    pub fn join_timeout(&self, timeout: Duration) -> bool {
        self.queue.wait_empty_timeout(timeout)
    }

    /// Pauses or resumes playback. Queued samples are kept.
    pub fn pause(&self, paused: bool) -> Result<(), SessionError> {
        self.stream.lock().pause(paused)?;
        debug!(paused, "session: pause");
        Ok(())
    }

    /// Returns the format negotiated with the device.
    pub fn format(&self) -> Format {
        self.config.format
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    pub fn voice(&self) -> &VoiceParams {
        &self.voice
    }

    pub fn queued_samples(&self) -> usize {
        self.queue.len()
    }

    /// Returns the playback time left in the queue.
    pub fn queued_duration(&self) -> Duration {
        self.config.format.duration(self.queue.len())
    }

    /// Stops the device and closes the queue, waking every thread blocked in
    /// [`join`](Self::join). Later `speak` calls queue nothing. Safe to call
    /// twice.
    pub fn close(&self) -> Result<(), SessionError> {
        let result = self.stream.lock().close();
        self.queue.close();
        result?;
        Ok(())
    }

    /// Returns how many times playback ran out of samples mid-period.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "session: failed to close device");
        }
        info!(
            backend = self.synthesizer.name(),
            dropped_samples = self.queue.len(),
            underruns = self.underruns(),
            "session: closed"
        );
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[test]
    fn test_report_record() {
        let mut report = SpeakReport::default();
        report.record(ChunkOutcome::Queued { samples: 10 });
        report.record(ChunkOutcome::Skipped);
        report.record(ChunkOutcome::Failed);
        report.record(ChunkOutcome::Queued { samples: 5 });
        assert_eq!(
            report,
            SpeakReport {
                chunks: 4,
                queued: 2,
                skipped: 1,
                failed: 1,
                samples: 15,
            }
        );
    }

    #[test]
    fn test_report_merge() {
        let mut total = SpeakReport::default();
        let one = SpeakReport {
            chunks: 2,
            queued: 1,
            skipped: 1,
            failed: 0,
            samples: 7,
        };
        total.merge(&one);
        total.merge(&one);
        assert_eq!(total.chunks, 4);
        assert_eq!(total.samples, 14);
    }

    #[test]
    fn test_default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.stream.format, Format::MONO_24K);
        assert_eq!(options.stream.frames_per_buffer, 4096);
        assert_eq!(options.segmenter.min_chars, 100);
        assert_eq!(options.voice.profile, "Slt");
    }

    #[test]
    fn test_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpeechSession>();
    }
}
