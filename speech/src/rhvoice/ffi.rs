//! Raw FFI bindings for libRHVoice.
//!
//! Only the engine and message calls used for offline synthesis are bound.
//! `build.rs` links against `RHVoice` (set `RHVOICE_LIB_DIR` to add a
//! search path).

use std::os::raw::{c_char, c_double, c_int, c_short, c_uint, c_void};

#[repr(C)]
pub struct RHVoiceEngine {
    _private: [u8; 0],
}

#[repr(C)]
pub struct RHVoiceMessage {
    _private: [u8; 0],
}

pub type RHVoiceTtsEngine = *mut RHVoiceEngine;
pub type RHVoiceMsg = *mut RHVoiceMessage;

pub type SetSampleRateFn =
    unsafe extern "C" fn(sample_rate: c_int, user_data: *mut c_void) -> c_int;
pub type PlaySpeechFn =
    unsafe extern "C" fn(samples: *const c_short, count: c_uint, user_data: *mut c_void) -> c_int;
pub type ProcessMarkFn = unsafe extern "C" fn(name: *const c_char, user_data: *mut c_void) -> c_int;
pub type PositionFn =
    unsafe extern "C" fn(position: c_uint, length: c_uint, user_data: *mut c_void) -> c_int;
pub type PlayAudioFn = unsafe extern "C" fn(src: *const c_char, user_data: *mut c_void) -> c_int;
pub type DoneFn = unsafe extern "C" fn(user_data: *mut c_void);

#[repr(C)]
pub struct RHVoiceCallbacks {
    pub set_sample_rate: Option<SetSampleRateFn>,
    pub play_speech: Option<PlaySpeechFn>,
    pub process_mark: Option<ProcessMarkFn>,
    pub word_starts: Option<PositionFn>,
    pub word_ends: Option<PositionFn>,
    pub sentence_starts: Option<PositionFn>,
    pub sentence_ends: Option<PositionFn>,
    pub play_audio: Option<PlayAudioFn>,
    pub done: Option<DoneFn>,
}

#[repr(C)]
pub struct RHVoiceInitParams {
    pub data_path: *const c_char,
    pub config_path: *const c_char,
    pub resource_paths: *const *const c_char,
    pub callbacks: RHVoiceCallbacks,
    pub options: c_uint,
}

pub const RHVOICE_MESSAGE_TEXT: c_int = 0;

#[repr(C)]
pub struct RHVoiceSynthParams {
    pub voice_profile: *const c_char,
    pub absolute_rate: c_double,
    pub absolute_pitch: c_double,
    pub absolute_volume: c_double,
    pub relative_rate: c_double,
    pub relative_pitch: c_double,
    pub relative_volume: c_double,
    pub punctuation_mode: c_int,
    pub punctuation_list: *const c_char,
    pub capitals_mode: c_int,
    pub flags: c_int,
}

unsafe extern "C" {
    pub fn RHVoice_new_tts_engine(init_params: *const RHVoiceInitParams) -> RHVoiceTtsEngine;
    pub fn RHVoice_delete_tts_engine(tts_engine: RHVoiceTtsEngine);

    pub fn RHVoice_new_message(
        tts_engine: RHVoiceTtsEngine,
        text: *const c_char,
        length: c_uint,
        message_type: c_int,
        synth_params: *const RHVoiceSynthParams,
        user_data: *mut c_void,
    ) -> RHVoiceMsg;
    pub fn RHVoice_delete_message(message: RHVoiceMsg);

    pub fn RHVoice_speak(message: RHVoiceMsg) -> c_int;
}
