//! Background music controller
//!
//! Wraps a looping track behind the [`MusicOutput`] seam. Without a track
//! every operation is a no-op, so sessions run the same with or without music.

use std::path::Path;

use super::error::AudioError;
use super::{AudioClip, MusicOutput};

/// Tracks above this size are refused
pub const MUSIC_LIMIT_BYTES: u64 = 50 * 1024 * 1024;

/// Tracks above this size load, with a warning
pub const MUSIC_WARN_BYTES: u64 = 5 * 1024 * 1024;

/// Volumes at or below this are treated as silence
const SILENCE: f32 = 1e-3;

/// Result of one fade step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeProgress {
    /// Volume lowered to the contained value
    Fading(f32),
    /// Volume reached the floor and the track was stopped
    Finished,
    /// Nothing is playing
    Silent,
}

/// Start / fade / stop control over one looping track
#[derive(Debug)]
pub struct MusicController<M: MusicOutput> {
    output: M,
    clip: Option<AudioClip>,
    /// Volume from settings, restored after a fade
    configured_volume: f32,
    /// Volume currently applied to the output
    volume: f32,
    playing: bool,
}

impl<M: MusicOutput> MusicController<M> {
    pub fn new(output: M, clip: Option<AudioClip>, volume: f32) -> Self {
        Self {
            output,
            clip,
            configured_volume: volume,
            volume,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn output(&self) -> &M {
        &self.output
    }

    /// Restart the track from the beginning at the configured volume
    pub fn start(&mut self) {
        let Some(clip) = &self.clip else { return };
        self.volume = self.configured_volume;
        self.output.start_loop(clip, self.volume);
        self.playing = true;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.clip.is_some() {
            self.output.set_volume(self.volume);
        }
    }

    /// Lower the volume by `decrement`. The step that reaches silence sets
    /// the volume to 0 before stopping the track.
    pub fn fade_step(&mut self, decrement: f32) -> FadeProgress {
        if !self.playing {
            return FadeProgress::Silent;
        }
        let next = self.volume - decrement;
        if next > SILENCE {
            self.set_volume(next);
            FadeProgress::Fading(self.volume)
        } else {
            self.set_volume(0.0);
            self.stop();
            FadeProgress::Finished
        }
    }

    /// Stop immediately, no fade
    pub fn stop(&mut self) {
        if self.playing {
            self.output.stop();
            self.playing = false;
        }
    }

    /// Put the configured volume back for the next run
    pub fn restore_volume(&mut self) {
        self.set_volume(self.configured_volume);
    }
}

/// Load a background track, refusing files above [`MUSIC_LIMIT_BYTES`]
pub fn load_music(path: &Path) -> Result<AudioClip, AudioError> {
    let size = std::fs::metadata(path)
        .map_err(|source| AudioError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let size_mb = size as f64 / (1024.0 * 1024.0);

    if size > MUSIC_LIMIT_BYTES {
        return Err(AudioError::MusicTooLarge {
            path: path.to_path_buf(),
            size_mb,
            limit_mb: MUSIC_LIMIT_BYTES / (1024 * 1024),
        });
    }
    if size > MUSIC_WARN_BYTES {
        let size_label = format!("{size_mb:.1} MB");
        tracing::warn!(
            path = %path.display(),
            size = %size_label,
            "large music file, consider re-encoding at 96 kbps mono"
        );
    }

    AudioClip::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl MusicOutput for Recorder {
        fn start_loop(&mut self, clip: &AudioClip, volume: f32) {
            self.calls.push(format!("start {} {volume:.2}", clip.len()));
        }
        fn set_volume(&mut self, volume: f32) {
            self.calls.push(format!("volume {volume:.2}"));
        }
        fn stop(&mut self) {
            self.calls.push("stop".into());
        }
    }

    fn controller(volume: f32) -> MusicController<Recorder> {
        MusicController::new(Recorder::default(), Some(AudioClip::new(vec![0; 4])), volume)
    }

    #[test]
    fn without_track_everything_is_noop() {
        let mut music = MusicController::new(Recorder::default(), None, 0.5);
        music.start();
        assert_eq!(music.fade_step(0.05), FadeProgress::Silent);
        music.restore_volume();
        music.stop();
        assert!(music.output().calls.is_empty());
    }

    #[test]
    fn fade_lowers_volume_then_stops() {
        let mut music = controller(0.2);
        music.start();

        let mut steps = 0;
        loop {
            match music.fade_step(0.05) {
                FadeProgress::Fading(v) => {
                    assert!(v < 0.2);
                    steps += 1;
                }
                FadeProgress::Finished => break,
                FadeProgress::Silent => panic!("track should still be playing"),
            }
            assert!(steps < 10, "fade never finished");
        }

        assert!(!music.is_playing());
        assert_eq!(music.output().calls.last().map(String::as_str), Some("stop"));
        assert_eq!(music.fade_step(0.05), FadeProgress::Silent);
    }

    #[test]
    fn fade_reaches_zero_despite_float_remainders() {
        let mut music = controller(0.3);
        music.start();

        let mut results = Vec::new();
        for _ in 0..6 {
            results.push(music.fade_step(0.05));
        }
        assert_eq!(results.last(), Some(&FadeProgress::Finished));
        assert!(results[..5].iter().all(|r| matches!(r, FadeProgress::Fading(_))));

        let calls = &music.output().calls;
        assert_eq!(calls[calls.len() - 2], "volume 0.00");
        assert_eq!(calls[calls.len() - 1], "stop");
    }

    #[test]
    fn wide_fade_step_finishes_at_zero() {
        let mut music = controller(1.0);
        music.start();
        for _ in 0..13 {
            assert!(matches!(music.fade_step(1.0 / 14.0), FadeProgress::Fading(_)));
        }
        assert_eq!(music.fade_step(1.0 / 14.0), FadeProgress::Finished);
        assert_eq!(music.volume(), 0.0);
    }

    #[test]
    fn restore_after_fade_uses_configured_volume() {
        let mut music = controller(0.3);
        music.start();
        music.fade_step(0.05);
        music.stop();
        music.restore_volume();
        assert!((music.volume() - 0.3).abs() < f32::EPSILON);

        music.start();
        assert_eq!(music.output().calls.last().map(String::as_str), Some("start 4 0.30"));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut music = controller(0.3);
        music.start();
        music.stop();
        music.stop();
        let stops = music.output().calls.iter().filter(|c| *c == "stop").count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn oversized_music_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music.mp3");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MUSIC_LIMIT_BYTES + 1).unwrap();

        assert!(matches!(
            load_music(&path),
            Err(AudioError::MusicTooLarge { limit_mb: 50, .. })
        ));
    }

    #[test]
    fn small_music_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music.mp3");
        std::fs::write(&path, b"loop").unwrap();
        assert_eq!(load_music(&path).unwrap().bytes(), b"loop");
    }
}
