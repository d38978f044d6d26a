//! Real-time audio output.
//!
//! An output device pulls audio: it owns the clock and calls a [`Render`]
//! callback once per period with a buffer of `frames_per_buffer` mono slots
//! to fill. The callback runs on the device's own thread and must return
//! within the period, so it must not block, allocate or do I/O.
//!
//! - [`Host`]: opens output streams (one per backend)
//! - [`OutputStream`]: handle to a running stream; pause, resume, close
//! - [`ClockHost`]: software device paced by the system clock
//! - [`ManualHost`]: device whose periods are stepped by the caller
//! - `CpalHost` (feature `cpal`): the system's default output device
//! - [`RateConverter`]: adapts a callback to a device running at another rate
//!
//! # Example
//!
//! ```
//! use narrate_audio::device::{ClockHost, Host, StreamConfig};
//!
//! let host = ClockHost::new();
//! let mut stream = host
//!     .open_output(StreamConfig::default(), Box::new(|out: &mut [i16]| out.fill(0)))
//!     .unwrap();
//! assert_eq!(stream.config().frames_per_buffer, 4096);
//! stream.close().unwrap();
//! ```

mod clock;
#[cfg(feature = "cpal")]
mod cpal_host;
mod manual;
mod rate;

pub use clock::{ClockHost, ClockStream};
#[cfg(feature = "cpal")]
pub use cpal_host::{CpalHost, CpalStream};
pub use manual::{ManualDriver, ManualHost, ManualStream};
pub use rate::{RateConverter, SupportedRange, select_output};

use std::time::Duration;

use crate::pcm::Format;

/// Default frames requested per callback period.
pub const DEFAULT_FRAMES_PER_BUFFER: usize = 4096;

/// Render callback invoked by the device once per period.
///
/// The slice holds one mono sample per frame; the device spreads each sample
/// over its channels.
pub type Render = Box<dyn FnMut(&mut [i16]) + Send + 'static>;

/// Error type for output device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no output device available")]
    NotFound,
    #[error("unsupported stream config: {0}")]
    Unsupported(String),
    #[error("failed to build stream: {0}")]
    Build(String),
    #[error("failed to control stream: {0}")]
    Control(String),
    #[error("stream closed")]
    Closed,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for opening an output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Sample format; samples are always 16-bit signed.
    pub format: Format,
    /// Most frames handed to the render callback in one call.
    ///
    /// Hardware devices may split their own period into several calls.
    pub frames_per_buffer: usize,
}

impl StreamConfig {
    /// Creates a config for the given format and period size.
    pub fn new(format: Format, frames_per_buffer: usize) -> Self {
        Self {
            format,
            frames_per_buffer,
        }
    }

    /// Returns the wall-clock length of one callback period.
    pub fn period(&self) -> Duration {
        self.format.duration(self.frames_per_buffer)
    }
}

impl Default for StreamConfig {
    /// 24kHz mono, 4096 frames per period.
    fn default() -> Self {
        Self::new(Format::MONO_24K, DEFAULT_FRAMES_PER_BUFFER)
    }
}

/// A running output stream.
///
/// Streams start playing as soon as they are opened. Dropping a stream
/// closes it.
pub trait OutputStream: Send {
    /// Returns the negotiated configuration.
    ///
    /// The format is the one the render callback produces. The device may
    /// play it in stereo or convert it to its own rate; the callback still
    /// receives mono frames at this rate.
    fn config(&self) -> &StreamConfig;

    /// Pauses or resumes the stream. A paused stream does not invoke its
    /// render callback.
    fn pause(&mut self, paused: bool) -> Result<(), DeviceError>;

    /// Stops the stream and releases the device. Safe to call twice.
    fn close(&mut self) -> Result<(), DeviceError>;
}

/// Opens output streams on one audio backend.
pub trait Host: Send + Sync {
    /// Opens an output stream as close to `config` as the backend allows and
    /// starts it, unpaused, with `render` as its callback.
    fn open_output(
        &self,
        config: StreamConfig,
        render: Render,
    ) -> Result<Box<dyn OutputStream>, DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stream_config() {
        let config = StreamConfig::default();
        assert_eq!(config.format, Format::MONO_24K);
        assert_eq!(config.frames_per_buffer, 4096);
        assert_eq!(config.period().as_millis(), 170);
    }

    #[test]
    fn test_device_error_display() {
        assert_eq!(DeviceError::NotFound.to_string(), "no output device available");
        let err = DeviceError::Unsupported("8 channels".to_string());
        assert!(err.to_string().contains("8 channels"));
    }
}
