//! Builds the synthesizer and output device a context asks for.

use narrate_audio::device::{ClockHost, Host};
use narrate_cli::config::{Context, DeviceBackend, EngineBackend};
use narrate_speech::{Synthesizer, ToneSynthesizer};
use tracing::{info, warn};

/// Creates the synthesis engine. `sample_rate` is the device rate, used by
/// engines that can render at any rate.
pub fn synthesizer(ctx: &Context, sample_rate: u32) -> anyhow::Result<Box<dyn Synthesizer>> {
    match ctx.engine.backend {
        EngineBackend::Tone => Ok(Box::new(ToneSynthesizer::new(sample_rate))),
        EngineBackend::Rhvoice => rhvoice(ctx),
        EngineBackend::Auto if cfg!(feature = "rhvoice") => rhvoice(ctx),
        EngineBackend::Auto => {
            info!("engine: built without RHVoice, using tones");
            Ok(Box::new(ToneSynthesizer::new(sample_rate)))
        }
    }
}

#[cfg(feature = "rhvoice")]
fn rhvoice(ctx: &Context) -> anyhow::Result<Box<dyn Synthesizer>> {
    use narrate_speech::{RhVoice, RhVoiceOptions};

    let defaults = RhVoiceOptions::default();
    let options = RhVoiceOptions {
        data_path: ctx.engine.data_path.clone().unwrap_or(defaults.data_path),
        config_path: ctx.engine.config_path.clone().unwrap_or(defaults.config_path),
    };
    Ok(Box::new(RhVoice::new(&options)?))
}

#[cfg(not(feature = "rhvoice"))]
fn rhvoice(_ctx: &Context) -> anyhow::Result<Box<dyn Synthesizer>> {
    anyhow::bail!("built without RHVoice support; rebuild with --features rhvoice")
}

/// Creates the output device host.
pub fn host(ctx: &Context) -> anyhow::Result<Box<dyn Host>> {
    match ctx.device.backend {
        DeviceBackend::Clock => Ok(Box::new(ClockHost::new())),
        DeviceBackend::Cpal => cpal(ctx),
        DeviceBackend::Auto if cfg!(feature = "cpal") => cpal(ctx),
        DeviceBackend::Auto => {
            warn!("device: built without sound card support, playback is silent");
            Ok(Box::new(ClockHost::new()))
        }
    }
}

#[cfg(feature = "cpal")]
fn cpal(ctx: &Context) -> anyhow::Result<Box<dyn Host>> {
    use narrate_audio::device::CpalHost;

    if ctx.device.name.is_empty() {
        Ok(Box::new(CpalHost::new()))
    } else {
        Ok(Box::new(CpalHost::with_device(ctx.device.name.as_str())))
    }
}

#[cfg(not(feature = "cpal"))]
fn cpal(_ctx: &Context) -> anyhow::Result<Box<dyn Host>> {
    anyhow::bail!("built without sound card support; rebuild with --features cpal")
}
