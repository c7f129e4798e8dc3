//! Shared configuration types for breathe
//!
//! This crate contains serializable configuration types that are shared between
//! the session engine (breathe-core) and the terminal front end (breathe-cli).
//! Validation lives in breathe-core, next to the error types it produces.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────────────────────

/// Longest accepted preparation countdown, in seconds
pub const MAX_PREPARE_SECS: u32 = 300;

/// Largest accepted finite cycle count
pub const MAX_CYCLES: u32 = 999;

/// Longest accepted inhale/hold/exhale duration, in seconds
pub const MAX_BREATH_SECS: u32 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Breathing Profile
// ─────────────────────────────────────────────────────────────────────────────

/// Durations of one inhale → hold → exhale cycle, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingProfile {
    pub inhale_secs: u32,
    /// 0 skips the hold step entirely
    #[serde(default)]
    pub hold_secs: u32,
    pub exhale_secs: u32,
}

impl BreathingProfile {
    pub const fn new(inhale_secs: u32, hold_secs: u32, exhale_secs: u32) -> Self {
        Self {
            inhale_secs,
            hold_secs,
            exhale_secs,
        }
    }

    /// Total length of one cycle in seconds
    pub fn cycle_secs(&self) -> u32 {
        self.inhale_secs + self.hold_secs + self.exhale_secs
    }

    pub fn has_hold(&self) -> bool {
        self.hold_secs > 0
    }
}

impl Default for BreathingProfile {
    fn default() -> Self {
        Self::new(4, 4, 6)
    }
}

impl std::fmt::Display for BreathingProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.inhale_secs, self.hold_secs, self.exhale_secs
        )
    }
}

/// Which breathing profile drives the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileSlot {
    #[default]
    Primary,
    Secondary,
}

impl ProfileSlot {
    /// 1-based number shown to the user
    pub fn number(self) -> u8 {
        match self {
            ProfileSlot::Primary => 1,
            ProfileSlot::Secondary => 2,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

/// Common breathing techniques that can seed the primary profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreathingPreset {
    /// Stress relief and focus
    Box,
    /// Deep relaxation before sleep
    #[serde(rename = "relax-478")]
    Relax478,
    /// Quick energizing breaths, no hold
    WimHof,
    /// Gentle rhythm for beginners
    Relaxation,
}

impl BreathingPreset {
    pub const ALL: [BreathingPreset; 4] = [
        BreathingPreset::Box,
        BreathingPreset::Relax478,
        BreathingPreset::WimHof,
        BreathingPreset::Relaxation,
    ];

    pub fn profile(self) -> BreathingProfile {
        match self {
            BreathingPreset::Box => BreathingProfile::new(4, 4, 6),
            BreathingPreset::Relax478 => BreathingProfile::new(4, 7, 8),
            BreathingPreset::WimHof => BreathingProfile::new(2, 0, 2),
            BreathingPreset::Relaxation => BreathingProfile::new(4, 0, 6),
        }
    }

    /// Stable identifier used on the command line and in config files
    pub fn key(self) -> &'static str {
        match self {
            BreathingPreset::Box => "box",
            BreathingPreset::Relax478 => "relax-478",
            BreathingPreset::WimHof => "wim-hof",
            BreathingPreset::Relaxation => "relaxation",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn description(self) -> &'static str {
        match self {
            BreathingPreset::Box => "stress relief, focus",
            BreathingPreset::Relax478 => "deep relaxation, sleep",
            BreathingPreset::WimHof => "energy, quick breaths",
            BreathingPreset::Relaxation => "beginners, light relaxation",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Config
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for one meditation run.
///
/// Immutable once a session starts. `total_cycles == 0` means infinite mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Preparation countdown before breathing starts
    #[serde(default = "default_prepare_secs")]
    pub prepare_secs: u32,

    /// Number of breathing cycles (0 = run until stopped)
    #[serde(default = "default_total_cycles")]
    pub total_cycles: u32,

    #[serde(default)]
    pub phase1: BreathingProfile,

    /// Only used when `two_phase` is set
    #[serde(default)]
    pub phase2: Option<BreathingProfile>,

    /// Switch to `phase2` after `phase1_cycles` cycles
    #[serde(default)]
    pub two_phase: bool,

    /// Cycles breathed with the primary profile before switching
    #[serde(default)]
    pub phase1_cycles: u32,

    /// Speak the last ten seconds of the preparation countdown
    #[serde(default = "default_true")]
    pub prepare_countdown_voice: bool,

    /// Voice cue volume (0.0 - 1.0)
    #[serde(default = "default_voice_volume")]
    pub voice_volume: f32,

    /// Background music volume (0.0 - 1.0)
    #[serde(default = "default_music_volume")]
    pub music_volume: f32,
}

fn default_true() -> bool {
    true
}

fn default_prepare_secs() -> u32 {
    10
}

fn default_total_cycles() -> u32 {
    10
}

fn default_voice_volume() -> f32 {
    0.8
}

fn default_music_volume() -> f32 {
    0.3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prepare_secs: default_prepare_secs(),
            total_cycles: default_total_cycles(),
            phase1: BreathingProfile::default(),
            phase2: None,
            two_phase: false,
            phase1_cycles: 0,
            prepare_countdown_voice: true,
            voice_volume: default_voice_volume(),
            music_volume: default_music_volume(),
        }
    }
}

impl SessionConfig {
    /// Infinite mode: no natural completion
    pub fn is_infinite(&self) -> bool {
        self.total_cycles == 0
    }

    /// Durations for the given slot. The secondary slot falls back to the
    /// primary profile unless two-phase mode is on and a profile is set.
    pub fn profile(&self, slot: ProfileSlot) -> BreathingProfile {
        match slot {
            ProfileSlot::Primary => self.phase1,
            ProfileSlot::Secondary if self.two_phase => self.phase2.unwrap_or(self.phase1),
            ProfileSlot::Secondary => self.phase1,
        }
    }

    /// Length of one cycle for the given slot, in seconds
    pub fn cycle_secs(&self, slot: ProfileSlot) -> u32 {
        self.profile(slot).cycle_secs()
    }

    /// Replace the primary profile with a preset
    pub fn apply_preset(&mut self, preset: BreathingPreset) {
        self.phase1 = preset.profile();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Where pre-rendered audio lives on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioPaths {
    /// Directory holding one clip per cue (`inhale.mp3`, `countdown_3.mp3`, ...)
    #[serde(default)]
    pub voice_dir: Option<String>,

    /// Looping background track
    #[serde(default)]
    pub music_file: Option<String>,
}

/// Persisted application settings.
///
/// Note: Persistence methods (load/save) are provided by breathe-core via the
/// `AppConfigExt` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub audio: AudioPaths,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_profile_falls_back_to_primary() {
        let mut config = SessionConfig {
            phase2: Some(BreathingProfile::new(5, 0, 5)),
            ..Default::default()
        };
        assert_eq!(config.profile(ProfileSlot::Secondary), config.phase1);

        config.two_phase = true;
        assert_eq!(
            config.profile(ProfileSlot::Secondary),
            BreathingProfile::new(5, 0, 5)
        );

        config.phase2 = None;
        assert_eq!(config.profile(ProfileSlot::Secondary), config.phase1);
    }

    #[test]
    fn preset_keys_round_trip() {
        for preset in BreathingPreset::ALL {
            assert_eq!(BreathingPreset::from_key(preset.key()), Some(preset));
        }
        assert_eq!(BreathingPreset::from_key("nope"), None);
        assert_eq!(BreathingPreset::Relax478.profile().cycle_secs(), 19);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.session.prepare_secs, 10);
        assert_eq!(config.session.total_cycles, 10);
        assert!(config.session.prepare_countdown_voice);
    }

    #[test]
    fn partial_session_table_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [session]
            total_cycles = 0
            [session.phase1]
            inhale_secs = 2
            exhale_secs = 2
            "#,
        )
        .unwrap();
        assert!(config.session.is_infinite());
        assert_eq!(config.session.phase1, BreathingProfile::new(2, 0, 2));
        assert_eq!(config.session.music_volume, 0.3);
    }
}
