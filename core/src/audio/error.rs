//! Error types for audio operations

use std::path::PathBuf;
use thiserror::Error;

use super::Cue;

/// A cue was requested that has no clip. Recovered locally by skipping it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CueError {
    #[error("no clip registered for cue '{cue}'")]
    Unavailable { cue: Cue },
}

/// Errors while loading audio from disk
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read audio file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("voice directory {path} does not exist")]
    NotADirectory { path: PathBuf },

    #[error("music file {path} is {size_mb:.1} MB, the limit is {limit_mb} MB")]
    MusicTooLarge {
        path: PathBuf,
        size_mb: f64,
        limit_mb: u64,
    },
}
