//! CLI utilities for narrate.
//!
//! Configuration with named contexts, the on-disk layout under
//! `~/.narrate/<app>`, and output helpers shared by the commands.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{
    Config, Context, DeviceBackend, DeviceConfig, EngineBackend, EngineConfig, VoiceConfig,
};
pub use output::Output;
pub use paths::Paths;
