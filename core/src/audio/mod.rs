//! Audio subsystem for voice cues and background music
//!
//! The core never talks to a sound device. Playback goes through the
//! [`VoiceOutput`] and [`MusicOutput`] seams, implemented by the front end.

mod cues;
mod error;
mod music;

pub use cues::{AudioClip, CLIP_EXTENSIONS, Cue, CueRegistry, MAX_COUNTDOWN_CUE, clip_path};
pub use error::{AudioError, CueError};
pub use music::{
    FadeProgress, MUSIC_LIMIT_BYTES, MUSIC_WARN_BYTES, MusicController, load_music,
};

/// Fire-and-forget voice playback. Overlapping plays are independent.
pub trait VoiceOutput {
    fn play(&mut self, cue: Cue, clip: &AudioClip, volume: f32);
}

/// A single looping music channel
pub trait MusicOutput {
    /// Start the track from the beginning, looping forever
    fn start_loop(&mut self, clip: &AudioClip, volume: f32);
    fn set_volume(&mut self, volume: f32);
    fn stop(&mut self);
}

/// Output that discards everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl VoiceOutput for Silent {
    fn play(&mut self, _cue: Cue, _clip: &AudioClip, _volume: f32) {}
}

impl MusicOutput for Silent {
    fn start_loop(&mut self, _clip: &AudioClip, _volume: f32) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn stop(&mut self) {}
}
