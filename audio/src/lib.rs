//! Audio utilities for streaming speech playback.
//!
//! This crate provides:
//!
//! - `pcm`: 16-bit PCM format description and conversions
//! - `device`: real-time output streams driven by a device clock
//! - `tone`: sine tones and silence for demos and tests
//!
//! # Example
//!
//! ```rust
//! use narrate_audio::device::StreamConfig;
//! use narrate_audio::pcm::Format;
//! use std::time::Duration;
//!
//! let config = StreamConfig::new(Format::MONO_24K, 4096);
//!
//! // One callback period at 24kHz
//! assert_eq!(config.period().as_millis(), 170);
//!
//! // Frames needed for 10ms of audio
//! assert_eq!(Format::MONO_24K.frames_in_duration(Duration::from_millis(10)), 240);
//! ```

pub mod device;
pub mod pcm;
pub mod tone;

pub use pcm::Format;
