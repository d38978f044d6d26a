//! narrate - speak text through a streaming synthesis pipeline.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, SayCommand, SegmentCommand};

/// narrate - speak text through a streaming synthesis pipeline.
///
/// Text is cut into sentence-aligned chunks; each chunk is synthesized and
/// queued while earlier ones are already playing.
///
/// Configuration is stored in ~/.narrate/narrate/ and supports multiple
/// contexts (voice, device and engine settings), similar to kubectl's
/// context management.
#[derive(Parser)]
#[command(name = "narrate")]
#[command(about = "Streaming text-to-speech CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.narrate/narrate/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Speak text
    Say(SayCommand),
    /// Show how text is cut into synthesis chunks
    Segment(SegmentCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; -v only raises the default.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Say(cmd) => cmd.run(&cli),
        Commands::Segment(cmd) => cmd.run(&cli),
        Commands::Config(cmd) => cmd.run(&cli),
    }
}
