mod config;
mod error;

pub use config::{AppConfigExt, validate_session};
pub use error::ConfigError;

pub use breathe_types::{
    AppConfig, AudioPaths, BreathingPreset, BreathingProfile, MAX_BREATH_SECS, MAX_CYCLES,
    MAX_PREPARE_SECS, ProfileSlot, SessionConfig,
};
