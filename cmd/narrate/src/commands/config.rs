//! Configuration management commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use narrate_cli::Output;
use narrate_cli::config::{
    Context as CliContext, DeviceBackend, DeviceConfig, EngineBackend, EngineConfig, VoiceConfig,
};

use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts hold complete voice, device and engine settings and can be
/// switched like kubectl contexts.
///
/// Configuration is stored in ~/.narrate/narrate/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add or replace a context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Voice profile
        #[arg(long)]
        voice: Option<String>,
        /// Absolute rate, -1.0 to 1.0
        #[arg(long, allow_hyphen_values = true)]
        rate: Option<f64>,
        /// Absolute pitch, -1.0 to 1.0
        #[arg(long, allow_hyphen_values = true)]
        pitch: Option<f64>,
        /// Absolute volume, -1.0 to 1.0
        #[arg(long, allow_hyphen_values = true)]
        volume: Option<f64>,
        /// Punctuation mode: default, none, all, some
        #[arg(long)]
        punctuation: Option<String>,
        /// Characters spoken in punctuation mode "some"
        #[arg(long)]
        punctuation_list: Option<String>,
        /// Capitals mode: default, off, word, pitch, sound
        #[arg(long)]
        capitals: Option<String>,
        /// Output device: auto, clock, cpal
        #[arg(long, default_value = "auto")]
        device: DeviceBackend,
        /// Output device name
        #[arg(long)]
        device_name: Option<String>,
        /// Sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Frames per callback period
        #[arg(long)]
        frames_per_buffer: Option<usize>,
        /// Synthesis engine: auto, tone, rhvoice
        #[arg(long, default_value = "auto")]
        engine: EngineBackend,
        /// RHVoice data directory
        #[arg(long)]
        data_path: Option<PathBuf>,
        /// RHVoice config directory
        #[arg(long)]
        config_path: Option<PathBuf>,
        /// Minimum characters per synthesis chunk
        #[arg(long)]
        min_chunk_chars: Option<usize>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration as YAML
    View,
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                voice,
                rate,
                pitch,
                volume,
                punctuation,
                punctuation_list,
                capitals,
                device,
                device_name,
                sample_rate,
                frames_per_buffer,
                engine,
                data_path,
                config_path,
                min_chunk_chars,
            } => {
                let mut cfg = get_config(cli)?;

                let ctx = CliContext {
                    voice: VoiceConfig {
                        profile: voice.clone().unwrap_or_default(),
                        rate: *rate,
                        pitch: *pitch,
                        volume: *volume,
                        punctuation: punctuation.clone().unwrap_or_default(),
                        punctuation_list: punctuation_list.clone().unwrap_or_default(),
                        capitals: capitals.clone().unwrap_or_default(),
                        ..Default::default()
                    },
                    device: DeviceConfig {
                        backend: *device,
                        name: device_name.clone().unwrap_or_default(),
                        sample_rate: sample_rate.unwrap_or(0),
                        frames_per_buffer: frames_per_buffer.unwrap_or(0),
                    },
                    engine: EngineConfig {
                        backend: *engine,
                        data_path: data_path.clone(),
                        config_path: config_path.clone(),
                    },
                    min_chunk_chars: min_chunk_chars.unwrap_or(0),
                    ..Default::default()
                };
                // Reject bad modes before they reach the file.
                ctx.session_options()?;

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!(
                    "{:<8} {:<20} {:<10} {:<10} {}",
                    "CURRENT", "NAME", "ENGINE", "DEVICE", "VOICE"
                );
                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.get_context(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let voice = if ctx.voice.profile.is_empty() {
                        "(default)"
                    } else {
                        &ctx.voice.profile
                    };
                    println!(
                        "{:<8} {:<20} {:<10} {:<10} {}",
                        current,
                        name,
                        format!("{:?}", ctx.engine.backend).to_lowercase(),
                        format!("{:?}", ctx.device.backend).to_lowercase(),
                        voice
                    );
                }

                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                eprintln!("# {}", cfg.path().display());
                Output::default().write(&cfg)
            }
        }
    }
}
