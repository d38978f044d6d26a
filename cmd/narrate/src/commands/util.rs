//! Utility functions for CLI commands.

use std::io::Read;
use std::path::Path;

use narrate_cli::config::{Config, Context, load_config};

use crate::Cli;

const APP_NAME: &str = "narrate";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context to use: `-c`, else the current one, else defaults.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    get_config(cli)?.resolve_or_default(cli.context.as_deref())
}

/// Reads the text to work on from the argument, a file, or stdin.
pub fn read_text(text: Option<&str>, file: Option<&Path>) -> anyhow::Result<String> {
    match (text, file) {
        (Some(_), Some(_)) => anyhow::bail!("give either TEXT or --file, not both"),
        (Some(text), None) => Ok(text.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read {}: {}", path.display(), e)),
        (None, None) => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}
