//! Streaming text-to-speech playback.
//!
//! Text goes through a pipeline that decouples synthesis from playback:
//! - [`Segmenter`]: cuts text into sentence-aligned chunks
//! - [`SynthesisInvoker`]: synthesizes a chunk and appends its samples
//! - [`CallbackSink`]: the device callback, drains samples or plays silence
//! - [`SpeechSession`]: owns all of the above plus the engine and device
//!
//! Backends implement [`Synthesizer`]. [`ToneSynthesizer`] needs no engine;
//! `RhVoice` (feature `rhvoice`) links libRHVoice.
//!
//! # Example
//!
//! ```
//! use narrate_audio::device::ManualHost;
//! use narrate_speech::{SessionOptions, SpeechSession, ToneSynthesizer};
//!
//! let (host, driver) = ManualHost::new();
//! let session =
//!     SpeechSession::new(ToneSynthesizer::default(), &host, SessionOptions::default()).unwrap();
//!
//! session.speak("Hello world.", false);
//! let audio = driver.run_until(1000, || session.queued_samples() == 0);
//! assert!(!audio.is_empty());
//! session.join();
//! ```

pub mod global;
mod invoker;
#[cfg(feature = "rhvoice")]
mod rhvoice;
mod segment;
mod session;
mod sink;
mod tone;
mod tts;
mod voice;

pub use invoker::*;
#[cfg(feature = "rhvoice")]
pub use rhvoice::{DEFAULT_CONFIG_PATH, DEFAULT_DATA_PATH, RhVoice, RhVoiceOptions};
pub use segment::*;
pub use session::*;
pub use sink::*;
pub use tone::*;
pub use tts::*;
pub use voice::*;
