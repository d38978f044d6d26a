//! Say command: speaks text through a session.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use narrate_audio::device::ManualHost;
use narrate_audio::pcm::int16_to_bytes;
use narrate_cli::Output;
use narrate_speech::{SpeakReport, SpeechSession};

use super::{backend, get_context, print_info, print_success, read_text};
use crate::Cli;

/// Speak text.
///
/// Plays through the device of the selected context, or renders to a raw
/// 16-bit little-endian mono PCM file with --output.
#[derive(Args)]
pub struct SayCommand {
    /// Text to speak (reads stdin if neither TEXT nor --file is given)
    text: Option<String>,

    /// Read text from a file
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Speak stdin line by line as it arrives, then wait for playback
    #[arg(long, conflicts_with_all = ["text", "file", "output"])]
    lines: bool,

    /// Render to a raw PCM file instead of playing
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

impl SayCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let options = ctx.session_options()?;
        let synthesizer = backend::synthesizer(&ctx, options.stream.format.sample_rate)?;

        if let Some(path) = &self.output {
            let text = read_text(self.text.as_deref(), self.file.as_deref())?;
            let (host, driver) = ManualHost::new();
            let session = SpeechSession::new(synthesizer, &host, options)?;

            let report = session.speak(&text, false);
            let frames = session.config().frames_per_buffer.max(1);
            let periods = session.queued_samples() / frames + 1;
            let audio = driver.run_until(periods, || session.queued_samples() == 0);

            Output::new(Some(path.clone())).write_binary(&int16_to_bytes(&audio))?;
            self.print_report(cli, &report);
            print_success(&format!(
                "Rendered {:.2}s at {} Hz to {}",
                session.format().duration(audio.len()).as_secs_f64(),
                session.format().sample_rate,
                path.display()
            ));
            return Ok(());
        }

        let host = backend::host(&ctx)?;
        let session = SpeechSession::new(synthesizer, host.as_ref(), options)?;

        if self.lines {
            let mut total = SpeakReport::default();
            for line in std::io::stdin().lock().lines() {
                total.merge(&session.speak(&line?, false));
            }
            session.join();
            self.print_report(cli, &total);
            return Ok(());
        }

        let text = read_text(self.text.as_deref(), self.file.as_deref())?;
        let report = session.speak(&text, true);
        self.print_report(cli, &report);
        if session.underruns() > 0 {
            print_info(&format!("Playback ran dry {} time(s)", session.underruns()));
        }
        Ok(())
    }

    fn print_report(&self, cli: &Cli, report: &SpeakReport) {
        if cli.verbose {
            print_info(&format!(
                "{} chunk(s): {} queued, {} skipped, {} failed, {} samples",
                report.chunks, report.queued, report.skipped, report.failed, report.samples
            ));
        }
        if report.failed > 0 {
            eprintln!("warning: {} chunk(s) failed to synthesize", report.failed);
        }
    }
}
