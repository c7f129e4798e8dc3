//! Voice cues and the registry that maps them to pre-rendered clips
//!
//! Cue clips are produced ahead of time by an external text-to-speech step.
//! The registry is filled once before a session and only read while it runs.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{AudioError, CueError};

/// Highest number announced during the preparation countdown
pub const MAX_COUNTDOWN_CUE: u8 = 10;

/// File extensions tried, in order, when loading a clip from disk
pub const CLIP_EXTENSIONS: [&str; 3] = ["mp3", "ogg", "wav"];

/// A logical voice prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Prepare,
    Ready,
    Inhale,
    Hold,
    Exhale,
    Complete,
    /// Announces the switch to the secondary breathing profile
    Phase2,
    /// Spoken digit, only 1..=10
    Countdown(u8),
}

impl Cue {
    /// Digit cue for a remaining-seconds value, if it is announceable
    pub fn countdown(remaining: u32) -> Option<Cue> {
        if (1..=MAX_COUNTDOWN_CUE as u32).contains(&remaining) {
            Some(Cue::Countdown(remaining as u8))
        } else {
            None
        }
    }

    /// Every cue the session can request
    pub fn all() -> impl Iterator<Item = Cue> {
        [
            Cue::Prepare,
            Cue::Ready,
            Cue::Inhale,
            Cue::Hold,
            Cue::Exhale,
            Cue::Complete,
            Cue::Phase2,
        ]
        .into_iter()
        .chain((1..=MAX_COUNTDOWN_CUE).rev().map(Cue::Countdown))
    }

    /// File stem of the clip (`inhale`, `countdown_3`, ...)
    pub fn file_stem(self) -> String {
        match self {
            Cue::Prepare => "prepare".into(),
            Cue::Ready => "ready".into(),
            Cue::Inhale => "inhale".into(),
            Cue::Hold => "hold".into(),
            Cue::Exhale => "exhale".into(),
            Cue::Complete => "complete".into(),
            Cue::Phase2 => "phase2".into(),
            Cue::Countdown(n) => format!("countdown_{n}"),
        }
    }

    /// Text the pre-generation step should speak for this cue
    pub fn phrase(self) -> String {
        match self {
            Cue::Prepare => "Sit comfortably and prepare your mind".into(),
            Cue::Ready => "Get ready to begin".into(),
            Cue::Inhale => "Breathe in".into(),
            Cue::Hold => "Hold".into(),
            Cue::Exhale => "Breathe out".into(),
            Cue::Complete => "Complete. Well done".into(),
            Cue::Phase2 => "Switching to the second breathing phase".into(),
            Cue::Countdown(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Encoded audio bytes (mp3/ogg/wav), cheap to clone
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip(Arc<[u8]>);

impl AudioClip {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Shared handle for decoders that need an owned `AsRef<[u8]>`
    pub fn shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a whole file into a clip
    pub fn from_file(path: &Path) -> Result<Self, AudioError> {
        std::fs::read(path)
            .map(Self::new)
            .map_err(|source| AudioError::ReadFile {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AudioClip({} bytes)", self.0.len())
    }
}

/// Cue → clip lookup
#[derive(Debug, Clone, Default)]
pub struct CueRegistry {
    clips: HashMap<Cue, AudioClip>,
}

impl CueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cue: Cue, clip: AudioClip) {
        self.clips.insert(cue, clip);
    }

    pub fn with(mut self, cue: Cue, clip: AudioClip) -> Self {
        self.insert(cue, clip);
        self
    }

    pub fn resolve(&self, cue: Cue) -> Result<&AudioClip, CueError> {
        self.clips.get(&cue).ok_or(CueError::Unavailable { cue })
    }

    pub fn contains(&self, cue: Cue) -> bool {
        self.clips.contains_key(&cue)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Cues that have no clip registered
    pub fn missing(&self) -> Vec<Cue> {
        Cue::all().filter(|cue| !self.contains(*cue)).collect()
    }

    /// Load every cue found in a voice directory.
    ///
    /// Missing files are skipped; an unreadable file is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, AudioError> {
        if !dir.is_dir() {
            return Err(AudioError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut registry = Self::new();
        for cue in Cue::all() {
            match clip_path(dir, cue) {
                Some(path) => {
                    registry.insert(cue, AudioClip::from_file(&path)?);
                }
                None => tracing::debug!(%cue, dir = %dir.display(), "no clip for cue"),
            }
        }

        tracing::info!(
            dir = %dir.display(),
            loaded = registry.len(),
            missing = registry.missing().len(),
            "voice clips loaded"
        );
        Ok(registry)
    }
}

/// First existing `<stem>.<ext>` for a cue in `dir`
pub fn clip_path(dir: &Path, cue: Cue) -> Option<PathBuf> {
    let stem = cue.file_stem();
    CLIP_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_cue_only_for_one_to_ten() {
        assert_eq!(Cue::countdown(0), None);
        assert_eq!(Cue::countdown(1), Some(Cue::Countdown(1)));
        assert_eq!(Cue::countdown(10), Some(Cue::Countdown(10)));
        assert_eq!(Cue::countdown(11), None);
        assert_eq!(Cue::countdown(30), None);
    }

    #[test]
    fn file_stems_match_clip_names() {
        assert_eq!(Cue::Phase2.file_stem(), "phase2");
        assert_eq!(Cue::Countdown(7).file_stem(), "countdown_7");
        assert_eq!(Cue::all().count(), 17);
    }

    #[test]
    fn resolve_missing_cue_is_error() {
        let registry = CueRegistry::new().with(Cue::Inhale, AudioClip::new(vec![1, 2, 3]));
        assert_eq!(registry.resolve(Cue::Inhale).unwrap().len(), 3);
        assert!(matches!(
            registry.resolve(Cue::Hold),
            Err(CueError::Unavailable { cue: Cue::Hold })
        ));
        assert_eq!(registry.missing().len(), 16);
    }

    #[test]
    fn load_dir_picks_up_known_stems() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inhale.mp3"), b"in").unwrap();
        std::fs::write(dir.path().join("countdown_3.wav"), b"three").unwrap();
        std::fs::write(dir.path().join("unrelated.mp3"), b"x").unwrap();

        let registry = CueRegistry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve(Cue::Inhale).unwrap().bytes(), b"in");
        assert_eq!(registry.resolve(Cue::Countdown(3)).unwrap().bytes(), b"three");
        assert!(!registry.contains(Cue::Exhale));
    }

    #[test]
    fn load_dir_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("voices");
        assert!(matches!(
            CueRegistry::load_dir(&missing),
            Err(AudioError::NotADirectory { .. })
        ));
    }
}
