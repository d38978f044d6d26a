//! CLI commands module.

mod backend;
mod config;
mod say;
mod segment;
mod util;

pub use config::ConfigCommand;
pub use say::SayCommand;
pub use segment::SegmentCommand;

pub(crate) use util::*;
