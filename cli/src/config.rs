//! Configuration management for the narrate CLI.
//!
//! Configuration is stored in ~/.narrate/{app_name}/config.yaml and holds
//! named contexts, each a complete set of voice, device and engine settings.
//! One context is current; commands pick another with `--context`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use narrate_audio::Format;
use narrate_audio::device::{DEFAULT_FRAMES_PER_BUFFER, StreamConfig};
use narrate_speech::{
    CapitalsMode, DEFAULT_MIN_CHUNK_CHARS, PunctuationMode, Segmenter, SessionOptions, VoiceParams,
};
use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Map of context name to context configuration.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub contexts: HashMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// A named set of speech settings.
///
/// Every field may be omitted; omitted fields take the library defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub voice: VoiceConfig,

    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Minimum characters per synthesis chunk (0 = default).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub min_chunk_chars: usize,
}

/// Voice settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Voice profile (empty = "Slt").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,

    /// Absolute rate in -1.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Absolute pitch in -1.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,

    /// Absolute volume in -1.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_pitch: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_volume: Option<f64>,

    /// default, none, all or some.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub punctuation: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub punctuation_list: String,

    /// default, off, word, pitch or sound.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub capitals: String,

    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub flags: i32,
}

/// Which output device to play through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceBackend {
    /// The sound card if the binary was built with it, else the clock.
    #[default]
    Auto,
    /// Software clock; plays nothing audible.
    Clock,
    /// The system sound card through cpal.
    Cpal,
}

/// Output device settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub backend: DeviceBackend,

    /// Output device name (empty = system default).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Sample rate in Hz (0 = 24000).
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub sample_rate: u32,

    /// Frames per callback period (0 = 4096).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub frames_per_buffer: usize,
}

/// Which synthesis engine to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    /// RHVoice if the binary was built with it, else tones.
    #[default]
    Auto,
    /// Built-in tone renderer.
    Tone,
    /// libRHVoice.
    Rhvoice,
}

/// Synthesis engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub backend: EngineBackend,

    /// RHVoice voice data directory (empty = /usr/share/RHVoice).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// RHVoice configuration directory (empty = /etc/RHVoice).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
}

impl FromStr for DeviceBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DeviceBackend::Auto),
            "clock" => Ok(DeviceBackend::Clock),
            "cpal" => Ok(DeviceBackend::Cpal),
            _ => Err(format!("unknown device backend '{}' (auto, clock, cpal)", s)),
        }
    }
}

impl FromStr for EngineBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(EngineBackend::Auto),
            "tone" => Ok(EngineBackend::Tone),
            "rhvoice" => Ok(EngineBackend::Rhvoice),
            _ => Err(format!("unknown engine backend '{}' (auto, tone, rhvoice)", s)),
        }
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

fn is_zero_u32(n: &u32) -> bool {
    *n == 0
}

fn is_zero_i32(n: &i32) -> bool {
    *n == 0
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|paths| paths.config_file())
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)
            .with_context(|| format!("write {}", self.config_path.display()))?;
        Ok(())
    }

    /// Adds or replaces a context.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        if name.is_empty() {
            anyhow::bail!("context name is empty");
        }
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        if self.current_context.is_empty() {
            self.current_context = name.to_string();
        }
        self.save()
    }

    /// Deletes a context.
    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if self.contexts.remove(name).is_none() {
            anyhow::bail!("context '{}' not found", name);
        }
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    /// Sets the current context.
    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    /// Gets a specific context.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    /// Gets the current context.
    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the context by name, or current context if name is empty.
    pub fn resolve_context(&self, name: Option<&str>) -> Option<&Context> {
        match name {
            Some(n) if !n.is_empty() => self.get_context(n),
            _ => self.get_current_context(),
        }
    }

    /// Resolves like [`resolve_context`](Self::resolve_context), falling
    /// back to built-in defaults when no context is configured. Naming a
    /// context that does not exist is an error.
    pub fn resolve_or_default(&self, name: Option<&str>) -> anyhow::Result<Context> {
        match name {
            Some(n) if !n.is_empty() => self
                .get_context(n)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("context '{}' not found", n)),
            _ => Ok(self.get_current_context().cloned().unwrap_or_default()),
        }
    }

    /// Lists all context names, sorted.
    pub fn list_contexts(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.contexts.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Context {
    /// Builds the session options this context describes.
    pub fn session_options(&self) -> anyhow::Result<SessionOptions> {
        let stream = self.device.stream_config();
        let min_chars = match self.min_chunk_chars {
            0 => DEFAULT_MIN_CHUNK_CHARS,
            n => n,
        };
        Ok(SessionOptions {
            stream,
            voice: self.voice.to_params()?,
            segmenter: Segmenter::new(min_chars),
            queue_capacity: stream.format.sample_rate as usize * 10,
        })
    }
}

impl VoiceConfig {
    /// Converts to voice parameters; unset fields keep their defaults.
    pub fn to_params(&self) -> anyhow::Result<VoiceParams> {
        let mut params = VoiceParams::default();
        if !self.profile.is_empty() {
            params = params.with_profile(self.profile.as_str());
        }
        if let Some(rate) = self.rate {
            params = params.with_rate(rate);
        }
        if let Some(pitch) = self.pitch {
            params = params.with_pitch(pitch);
        }
        if let Some(volume) = self.volume {
            params = params.with_volume(volume);
        }
        if let Some(v) = self.relative_rate {
            params.relative_rate = v;
        }
        if let Some(v) = self.relative_pitch {
            params.relative_pitch = v;
        }
        if let Some(v) = self.relative_volume {
            params.relative_volume = v;
        }
        params = params
            .with_punctuation(self.punctuation.parse::<PunctuationMode>()?)
            .with_capitals(self.capitals.parse::<CapitalsMode>()?);
        params.punctuation_list = self.punctuation_list.clone();
        params.flags = self.flags;
        Ok(params)
    }
}

impl DeviceConfig {
    /// Returns the stream to request, mono at the configured rate.
    pub fn stream_config(&self) -> StreamConfig {
        let sample_rate = match self.sample_rate {
            0 => DEFAULT_SAMPLE_RATE,
            n => n,
        };
        let frames = match self.frames_per_buffer {
            0 => DEFAULT_FRAMES_PER_BUFFER,
            n => n,
        };
        StreamConfig::new(Format::mono(sample_rate), frames)
    }
}

/// Loads configuration for the specified app.
///
/// A missing file is created empty.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = config_path(app_name, custom_path)?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("parse {}", config_path.display()))?
    } else {
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}

fn config_path(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let cfg = load_config("test", Some(path.to_str().unwrap())).unwrap();
        (dir, cfg)
    }

    #[test]
    fn test_load_creates_missing_file() {
        let (_dir, cfg) = temp_config();
        assert!(cfg.path().exists());
        assert_eq!(cfg.app_name, "test");
        assert!(cfg.contexts.is_empty());
        assert!(cfg.get_current_context().is_none());
    }

    #[test]
    fn test_context_lifecycle() {
        let (_dir, mut cfg) = temp_config();
        let path = cfg.path().to_str().unwrap().to_string();

        cfg.add_context("fast", Context::default()).unwrap();
        assert_eq!(cfg.current_context, "fast");
        cfg.add_context("slow", Context::default()).unwrap();
        assert_eq!(cfg.current_context, "fast");
        assert_eq!(cfg.list_contexts(), vec!["fast", "slow"]);

        cfg.use_context("slow").unwrap();
        assert!(cfg.use_context("missing").is_err());

        let reloaded = load_config("test", Some(&path)).unwrap();
        assert_eq!(reloaded.current_context, "slow");
        assert_eq!(reloaded.get_context("fast").unwrap().name, "fast");

        cfg.delete_context("slow").unwrap();
        assert!(cfg.current_context.is_empty());
        assert!(cfg.delete_context("slow").is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let (_dir, mut cfg) = temp_config();
        let path = cfg.path().to_str().unwrap().to_string();

        let ctx = Context {
            voice: VoiceConfig {
                profile: "Alan".to_string(),
                rate: Some(0.5),
                punctuation: "some".to_string(),
                punctuation_list: ".,".to_string(),
                ..VoiceConfig::default()
            },
            device: DeviceConfig {
                backend: DeviceBackend::Clock,
                sample_rate: 16000,
                ..DeviceConfig::default()
            },
            engine: EngineConfig {
                backend: EngineBackend::Rhvoice,
                data_path: Some(PathBuf::from("/opt/rhvoice/data")),
                config_path: None,
            },
            min_chunk_chars: 40,
            ..Context::default()
        };
        cfg.add_context("custom", ctx).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("backend: rhvoice"));
        assert!(content.contains("backend: clock"));

        let reloaded = load_config("test", Some(&path)).unwrap();
        assert_eq!(reloaded.get_context("custom"), cfg.get_context("custom"));
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = "current_context: home\ncontexts:\n  home:\n    voice:\n      profile: Slt\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let ctx = cfg.resolve_context(None).unwrap();
        assert_eq!(ctx.device, DeviceConfig::default());
        assert_eq!(ctx.engine.backend, EngineBackend::Auto);
    }

    #[test]
    fn test_session_options_defaults() {
        let options = Context::default().session_options().unwrap();
        assert_eq!(options.stream, StreamConfig::default());
        assert_eq!(options.voice, VoiceParams::default());
        assert_eq!(options.segmenter.min_chars, 100);
    }

    #[test]
    fn test_session_options_from_context() {
        let ctx = Context {
            voice: VoiceConfig {
                volume: Some(3.0),
                capitals: "word".to_string(),
                punctuation: "some".to_string(),
                punctuation_list: ",;".to_string(),
                relative_rate: Some(1.5),
                ..VoiceConfig::default()
            },
            device: DeviceConfig {
                sample_rate: 16000,
                frames_per_buffer: 1024,
                ..DeviceConfig::default()
            },
            min_chunk_chars: 60,
            ..Context::default()
        };
        let options = ctx.session_options().unwrap();
        assert_eq!(options.stream, StreamConfig::new(Format::MONO_16K, 1024));
        assert_eq!(options.voice.absolute_volume, 1.0);
        assert_eq!(options.voice.relative_rate, 1.5);
        assert_eq!(options.voice.capitals, CapitalsMode::Word);
        assert_eq!(options.voice.punctuation, PunctuationMode::Some);
        assert_eq!(options.voice.punctuation_list, ",;");
        assert_eq!(options.segmenter.min_chars, 60);
    }

    #[test]
    fn test_bad_mode_is_an_error() {
        let ctx = Context {
            voice: VoiceConfig {
                punctuation: "loud".to_string(),
                ..VoiceConfig::default()
            },
            ..Context::default()
        };
        assert!(ctx.session_options().is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("CPAL".parse::<DeviceBackend>().unwrap(), DeviceBackend::Cpal);
        assert_eq!("tone".parse::<EngineBackend>().unwrap(), EngineBackend::Tone);
        assert!("alsa".parse::<DeviceBackend>().is_err());
    }

    #[test]
    fn test_resolve_or_default() {
        let cfg = Config::default();
        assert_eq!(cfg.resolve_or_default(None).unwrap(), Context::default());
        assert!(cfg.resolve_or_default(Some("nope")).is_err());
    }
}
