//! Voice parameters passed to every synthesis call of a session.

use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a mode name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} mode: {value}")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

/// How punctuation is spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PunctuationMode {
    /// Let the synthesizer decide.
    #[default]
    Default,
    /// Never speak punctuation.
    None,
    /// Speak every punctuation character.
    All,
    /// Speak only the characters in `VoiceParams::punctuation_list`.
    Some,
}

/// How capital letters are signalled when reading by characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapitalsMode {
    /// Let the synthesizer decide.
    #[default]
    Default,
    /// No indication.
    Off,
    /// Say "capital" before the letter.
    Word,
    /// Raise the pitch.
    Pitch,
    /// Play a sound.
    Sound,
}

impl PunctuationMode {
    /// Returns the lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PunctuationMode::Default => "default",
            PunctuationMode::None => "none",
            PunctuationMode::All => "all",
            PunctuationMode::Some => "some",
        }
    }
}

impl CapitalsMode {
    /// Returns the lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapitalsMode::Default => "default",
            CapitalsMode::Off => "off",
            CapitalsMode::Word => "word",
            CapitalsMode::Pitch => "pitch",
            CapitalsMode::Sound => "sound",
        }
    }
}

impl FromStr for PunctuationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" => Ok(PunctuationMode::Default),
            "none" => Ok(PunctuationMode::None),
            "all" => Ok(PunctuationMode::All),
            "some" => Ok(PunctuationMode::Some),
            _ => Err(ParseModeError {
                kind: "punctuation",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for CapitalsMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" => Ok(CapitalsMode::Default),
            "off" => Ok(CapitalsMode::Off),
            "word" => Ok(CapitalsMode::Word),
            "pitch" => Ok(CapitalsMode::Pitch),
            "sound" => Ok(CapitalsMode::Sound),
            _ => Err(ParseModeError {
                kind: "capitals",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PunctuationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CapitalsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesis style, fixed for the lifetime of a session.
///
/// Absolute values are normalized to -1.0..=1.0 so the same settings work
/// across voices; relative values scale them and default to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    /// Voice profile name (e.g. "Slt", "Alan+Slt").
    pub profile: String,
    pub absolute_rate: f64,
    pub absolute_pitch: f64,
    pub absolute_volume: f64,
    pub relative_rate: f64,
    pub relative_pitch: f64,
    pub relative_volume: f64,
    pub punctuation: PunctuationMode,
    /// Characters spoken when `punctuation` is [`PunctuationMode::Some`].
    pub punctuation_list: String,
    pub capitals: CapitalsMode,
    /// Backend-specific flags; 0 for defaults.
    pub flags: i32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            profile: "Slt".to_string(),
            absolute_rate: 0.9,
            absolute_pitch: 0.0,
            absolute_volume: 1.0,
            relative_rate: 1.0,
            relative_pitch: 1.0,
            relative_volume: 1.0,
            punctuation: PunctuationMode::Default,
            punctuation_list: String::new(),
            capitals: CapitalsMode::Default,
            flags: 0,
        }
    }
}

impl VoiceParams {
    /// Sets the voice profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Sets the absolute rate, clamped to -1.0..=1.0.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.absolute_rate = rate.clamp(-1.0, 1.0);
        self
    }

    /// Sets the absolute pitch, clamped to -1.0..=1.0.
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.absolute_pitch = pitch.clamp(-1.0, 1.0);
        self
    }

    /// Sets the absolute volume, clamped to -1.0..=1.0.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.absolute_volume = volume.clamp(-1.0, 1.0);
        self
    }

    /// Sets the punctuation mode.
    pub fn with_punctuation(mut self, mode: PunctuationMode) -> Self {
        self.punctuation = mode;
        self
    }

    /// Sets the capitals mode.
    pub fn with_capitals(mut self, mode: CapitalsMode) -> Self {
        self.capitals = mode;
        self
    }
}
