//! RHVoice synthesis backend.
//!
//! Wraps a libRHVoice engine. The engine reports audio through callbacks
//! registered at creation; each message carries a pointer to the buffer the
//! callbacks fill, so one call returns one [`Synthesized`].

mod ffi;

use std::ffi::{CString, c_void};
use std::os::raw::{c_int, c_short, c_uint};
use std::path::{Path, PathBuf};
use std::ptr;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::tts::{SynthesisError, Synthesized, Synthesizer};
use crate::voice::{CapitalsMode, PunctuationMode, VoiceParams};

/// Default location of voice data.
pub const DEFAULT_DATA_PATH: &str = "/usr/share/RHVoice";
/// Default location of `RHVoice.conf`.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/RHVoice";

/// Paths used to create the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhVoiceOptions {
    pub data_path: PathBuf,
    pub config_path: PathBuf,
}

impl Default for RhVoiceOptions {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

struct Engine(ffi::RHVoiceTtsEngine);

// SAFETY: the engine handle is only used while holding the `RhVoice` mutex.
unsafe impl Send for Engine {}

/// A libRHVoice engine.
///
/// Messages are spoken one at a time; concurrent callers wait for the
/// engine.
pub struct RhVoice {
    engine: Mutex<Engine>,
}

impl RhVoice {
    /// Creates an engine with the given paths.
    pub fn new(options: &RhVoiceOptions) -> Result<Self, SynthesisError> {
        let data_path = path_cstring(&options.data_path)?;
        let config_path = path_cstring(&options.config_path)?;

        let params = ffi::RHVoiceInitParams {
            data_path: data_path.as_ptr(),
            config_path: config_path.as_ptr(),
            resource_paths: ptr::null(),
            callbacks: ffi::RHVoiceCallbacks {
                set_sample_rate: Some(set_sample_rate),
                play_speech: Some(play_speech),
                process_mark: None,
                word_starts: None,
                word_ends: None,
                sentence_starts: None,
                sentence_ends: None,
                play_audio: None,
                done: None,
            },
            options: 0,
        };

        let engine = unsafe { ffi::RHVoice_new_tts_engine(&params) };
        if engine.is_null() {
            return Err(SynthesisError::Engine(format!(
                "failed to create engine (data {}, config {})",
                options.data_path.display(),
                options.config_path.display()
            )));
        }
        info!(data_path = %options.data_path.display(), "rhvoice: engine created");
        Ok(Self {
            engine: Mutex::new(Engine(engine)),
        })
    }
}

impl Drop for RhVoice {
    fn drop(&mut self) {
        let engine = self.engine.get_mut();
        if !engine.0.is_null() {
            unsafe { ffi::RHVoice_delete_tts_engine(engine.0) };
            engine.0 = ptr::null_mut();
            info!("rhvoice: engine deleted");
        }
    }
}

impl Synthesizer for RhVoice {
    fn synthesize(&self, text: &str, params: &VoiceParams) -> Result<Synthesized, SynthesisError> {
        let length = c_uint::try_from(text.len())
            .map_err(|_| SynthesisError::Rejected("text too long".to_string()))?;
        let text_c = CString::new(text)
            .map_err(|_| SynthesisError::Rejected("text contains NUL".to_string()))?;
        let profile = CString::new(params.profile.as_str())
            .map_err(|_| SynthesisError::Rejected("profile contains NUL".to_string()))?;
        let punctuation_list = CString::new(params.punctuation_list.as_str())
            .map_err(|_| SynthesisError::Rejected("punctuation list contains NUL".to_string()))?;

        let synth_params = ffi::RHVoiceSynthParams {
            voice_profile: profile.as_ptr(),
            absolute_rate: params.absolute_rate,
            absolute_pitch: params.absolute_pitch,
            absolute_volume: params.absolute_volume,
            relative_rate: params.relative_rate,
            relative_pitch: params.relative_pitch,
            relative_volume: params.relative_volume,
            punctuation_mode: punctuation_code(params.punctuation),
            punctuation_list: punctuation_list.as_ptr(),
            capitals_mode: capitals_code(params.capitals),
            flags: params.flags,
        };

        let mut out = Synthesized::default();
        let engine = self.engine.lock();
        // SAFETY: `out` outlives the message; the callbacks only run inside
        // RHVoice_speak, before the message is deleted.
        unsafe {
            let message = ffi::RHVoice_new_message(
                engine.0,
                text_c.as_ptr(),
                length,
                ffi::RHVOICE_MESSAGE_TEXT,
                &synth_params,
                (&mut out as *mut Synthesized).cast::<c_void>(),
            );
            if message.is_null() {
                return Err(SynthesisError::Rejected("engine refused message".to_string()));
            }
            let spoken = ffi::RHVoice_speak(message);
            ffi::RHVoice_delete_message(message);
            if spoken == 0 {
                return Err(SynthesisError::Engine("speak failed".to_string()));
            }
        }
        drop(engine);

        debug!(
            sample_rate = out.sample_rate,
            samples = out.samples.len(),
            "rhvoice: message spoken"
        );
        Ok(out)
    }

    fn name(&self) -> &str {
        "rhvoice"
    }
}

fn path_cstring(path: &Path) -> Result<CString, SynthesisError> {
    CString::new(path.to_string_lossy().as_bytes())
        .map_err(|_| SynthesisError::Engine(format!("invalid path: {}", path.display())))
}

fn punctuation_code(mode: PunctuationMode) -> c_int {
    match mode {
        PunctuationMode::Default => 0,
        PunctuationMode::None => 1,
        PunctuationMode::All => 2,
        PunctuationMode::Some => 3,
    }
}

fn capitals_code(mode: CapitalsMode) -> c_int {
    match mode {
        CapitalsMode::Default => 0,
        CapitalsMode::Off => 1,
        CapitalsMode::Word => 2,
        CapitalsMode::Pitch => 3,
        CapitalsMode::Sound => 4,
    }
}

unsafe extern "C" fn set_sample_rate(sample_rate: c_int, user_data: *mut c_void) -> c_int {
    if user_data.is_null() {
        return 0;
    }
    let out = unsafe { &mut *user_data.cast::<Synthesized>() };
    out.sample_rate = u32::try_from(sample_rate).unwrap_or(0);
    1
}

unsafe extern "C" fn play_speech(
    samples: *const c_short,
    count: c_uint,
    user_data: *mut c_void,
) -> c_int {
    if user_data.is_null() {
        return 0;
    }
    let out = unsafe { &mut *user_data.cast::<Synthesized>() };
    if !samples.is_null() && count > 0 {
        let block = unsafe { std::slice::from_raw_parts(samples, count as usize) };
        out.samples.extend_from_slice(block);
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RhVoiceOptions::default();
        assert_eq!(options.data_path, PathBuf::from("/usr/share/RHVoice"));
        assert_eq!(options.config_path, PathBuf::from("/etc/RHVoice"));
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(punctuation_code(PunctuationMode::Default), 0);
        assert_eq!(punctuation_code(PunctuationMode::Some), 3);
        assert_eq!(capitals_code(CapitalsMode::Default), 0);
        assert_eq!(capitals_code(CapitalsMode::Sound), 4);
    }

    #[test]
    fn test_callbacks_collect_into_buffer() {
        let mut out = Synthesized::default();
        let user_data = (&mut out as *mut Synthesized).cast::<c_void>();
        let block: [c_short; 3] = [1, -2, 3];
        unsafe {
            assert_eq!(set_sample_rate(24000, user_data), 1);
            assert_eq!(play_speech(block.as_ptr(), 3, user_data), 1);
            assert_eq!(play_speech(block.as_ptr(), 2, user_data), 1);
        }
        assert_eq!(out.sample_rate, 24000);
        assert_eq!(out.samples, vec![1, -2, 3, 1, -2]);
    }
}
