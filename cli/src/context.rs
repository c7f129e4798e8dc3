use std::path::{Path, PathBuf};

use breathe_core::audio::{AudioClip, AudioError, CueRegistry, load_music};
use breathe_core::context::{AppConfig, AppConfigExt, ConfigError, validate_session};

use crate::args::Args;
use crate::logging;

/// Settings and assets resolved before a session can run
#[derive(Debug)]
pub struct CliContext {
    pub config: AppConfig,
    /// Where the config file lives, if the platform has a config dir
    pub config_path: Option<PathBuf>,
    pub voice_dir: Option<PathBuf>,
    pub registry: CueRegistry,
    pub music: Option<AudioClip>,
}

impl CliContext {
    /// Load the persisted config, merge the flags and load audio assets.
    ///
    /// Settings problems are fatal; missing audio only costs sound.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let loaded = AppConfig::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not load settings, using defaults");
            AppConfig::default()
        });
        let config = resolve_config(args, loaded)?;

        if args.save {
            config.save()?;
            tracing::info!(path = ?AppConfig::config_path(), "settings saved");
        }

        let voice_dir = voice_dir(&config);
        let registry = voice_dir
            .as_deref()
            .map(load_voice_clips)
            .unwrap_or_default();
        let music = config
            .audio
            .music_file
            .as_deref()
            .and_then(|path| load_music_clip(Path::new(path)));

        Ok(Self {
            config,
            config_path: AppConfig::config_path(),
            voice_dir,
            registry,
            music,
        })
    }
}

/// Apply the flags to the loaded settings and validate the result
pub fn resolve_config(args: &Args, mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    args.apply(&mut config)?;
    validate_session(&config.session)?;
    Ok(config)
}

/// Configured voice directory, else `<config dir>/breathe/voice`
pub fn voice_dir(config: &AppConfig) -> Option<PathBuf> {
    config
        .audio
        .voice_dir
        .as_deref()
        .map(PathBuf::from)
        .or_else(|| logging::app_dir().map(|dir| dir.join("voice")))
}

fn load_voice_clips(dir: &Path) -> CueRegistry {
    match CueRegistry::load_dir(dir) {
        Ok(registry) => registry,
        Err(AudioError::NotADirectory { path }) => {
            tracing::warn!(path = %path.display(), "voice directory not found, cues will be silent");
            CueRegistry::new()
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load voice clips, cues will be silent");
            CueRegistry::new()
        }
    }
}

fn load_music_clip(path: &Path) -> Option<AudioClip> {
    match load_music(path) {
        Ok(clip) => Some(clip),
        Err(err) => {
            tracing::warn!(error = %err, "background music disabled");
            None
        }
    }
}
