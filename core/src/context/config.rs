//! Application configuration
//!
//! This module re-exports shared types from breathe-types and provides
//! validation and persistence for them.

use breathe_types::{
    AppConfig, BreathingPreset, BreathingProfile, MAX_BREATH_SECS, MAX_CYCLES, MAX_PREPARE_SECS,
    SessionConfig,
};

use super::ConfigError;

const APP_NAME: &str = "breathe";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Check a session config before it is allowed to drive a session.
///
/// Inhale and exhale must be non-zero, hold may be zero. The phase-1 cycle
/// threshold may not exceed a finite cycle count.
pub fn validate_session(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.prepare_secs > MAX_PREPARE_SECS {
        return Err(ConfigError::invalid(
            "prepare_secs",
            format!("must be at most {MAX_PREPARE_SECS} seconds"),
        ));
    }
    if config.total_cycles > MAX_CYCLES {
        return Err(ConfigError::invalid(
            "total_cycles",
            format!("must be at most {MAX_CYCLES} (0 runs until stopped)"),
        ));
    }

    validate_profile("phase1", &config.phase1)?;
    if config.two_phase {
        if let Some(phase2) = &config.phase2 {
            validate_profile("phase2", phase2)?;
        }
        if config.total_cycles > 0 && config.phase1_cycles > config.total_cycles {
            return Err(ConfigError::invalid(
                "phase1_cycles",
                format!(
                    "{} exceeds the total of {} cycles",
                    config.phase1_cycles, config.total_cycles
                ),
            ));
        }
    }

    validate_volume("voice_volume", config.voice_volume)?;
    validate_volume("music_volume", config.music_volume)?;
    Ok(())
}

fn validate_profile(field: &'static str, profile: &BreathingProfile) -> Result<(), ConfigError> {
    let check = |name: &str, secs: u32, allow_zero: bool| {
        if !allow_zero && secs == 0 {
            return Err(ConfigError::invalid(field, format!("{name} must be at least 1 second")));
        }
        if secs > MAX_BREATH_SECS {
            return Err(ConfigError::invalid(
                field,
                format!("{name} must be at most {MAX_BREATH_SECS} seconds"),
            ));
        }
        Ok(())
    };

    check("inhale", profile.inhale_secs, false)?;
    check("hold", profile.hold_secs, true)?;
    check("exhale", profile.exhale_secs, false)
}

fn validate_volume(field: &'static str, volume: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&volume) {
        return Err(ConfigError::invalid(field, format!("{volume} is outside 0.0 - 1.0")));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    fn load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Option<std::path::PathBuf>;
    fn apply_preset_key(&mut self, key: &str) -> Result<(), ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        tracing::debug!(path = ?Self::config_path(), "configuration loaded");
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Option<std::path::PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    fn apply_preset_key(&mut self, key: &str) -> Result<(), ConfigError> {
        let preset = BreathingPreset::from_key(key).ok_or_else(|| ConfigError::UnknownPreset {
            name: key.to_string(),
        })?;
        self.session.apply_preset(preset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &SessionConfig) -> &'static str {
        match validate_session(config) {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_session(&SessionConfig::default()).is_ok());
    }

    #[test]
    fn zero_inhale_or_exhale_is_rejected() {
        let mut config = SessionConfig::default();
        config.phase1.inhale_secs = 0;
        assert_eq!(invalid_field(&config), "phase1");

        let mut config = SessionConfig::default();
        config.phase1.exhale_secs = 0;
        assert_eq!(invalid_field(&config), "phase1");
    }

    #[test]
    fn zero_hold_and_zero_prepare_are_allowed() {
        let mut config = SessionConfig::default();
        config.phase1.hold_secs = 0;
        config.prepare_secs = 0;
        assert!(validate_session(&config).is_ok());
    }

    #[test]
    fn threshold_above_total_is_rejected() {
        let mut config = SessionConfig {
            two_phase: true,
            total_cycles: 5,
            phase1_cycles: 6,
            ..Default::default()
        };
        assert_eq!(invalid_field(&config), "phase1_cycles");

        // Infinite mode accepts any threshold
        config.total_cycles = 0;
        assert!(validate_session(&config).is_ok());
    }

    #[test]
    fn secondary_profile_only_checked_in_two_phase_mode() {
        let mut config = SessionConfig {
            phase2: Some(BreathingProfile::new(0, 0, 4)),
            ..Default::default()
        };
        assert!(validate_session(&config).is_ok());

        config.two_phase = true;
        assert_eq!(invalid_field(&config), "phase2");
    }

    #[test]
    fn volume_out_of_range_is_rejected() {
        let config = SessionConfig {
            music_volume: 1.5,
            ..Default::default()
        };
        assert_eq!(invalid_field(&config), "music_volume");

        let config = SessionConfig {
            voice_volume: f32::NAN,
            ..Default::default()
        };
        assert_eq!(invalid_field(&config), "voice_volume");
    }

    #[test]
    fn preset_key_applies_primary_profile() {
        let mut config = AppConfig::default();
        config.apply_preset_key("wim-hof").unwrap();
        assert_eq!(config.session.phase1, BreathingProfile::new(2, 0, 2));

        assert!(matches!(
            config.apply_preset_key("lotus"),
            Err(ConfigError::UnknownPreset { .. })
        ));
    }
}
