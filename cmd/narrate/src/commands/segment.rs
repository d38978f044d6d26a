//! Segment command: shows the chunks text is synthesized in.

use std::path::PathBuf;

use clap::Args;

use super::{get_context, read_text};
use crate::Cli;

/// Show how text is cut into synthesis chunks.
///
/// Uses the min-chunk-chars setting of the selected context.
#[derive(Args)]
pub struct SegmentCommand {
    /// Text to segment (reads stdin if neither TEXT nor --file is given)
    text: Option<String>,

    /// Read text from a file
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,
}

impl SegmentCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let segmenter = ctx.session_options()?.segmenter;
        let text = read_text(self.text.as_deref(), self.file.as_deref())?;

        for (i, chunk) in segmenter.segment(&text).enumerate() {
            println!("--- chunk {} ({} chars)", i + 1, chunk.chars().count());
            println!("{}", chunk);
        }
        Ok(())
    }
}
