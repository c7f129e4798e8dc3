//! Command-line flags
//!
//! Every session flag overrides the matching field of the persisted config
//! for one run. `--save` writes the merged result back.

use std::path::PathBuf;

use breathe_core::context::{AppConfig, AppConfigExt, BreathingProfile, ConfigError};
use clap::Parser;

#[derive(Debug, Default, Parser)]
#[command(version, about = "Guided breathing meditation timer")]
pub struct Args {
    /// Breathing preset (box, relax-478, wim-hof, relaxation)
    #[arg(long)]
    pub preset: Option<String>,

    /// Preparation countdown in seconds (0 skips it)
    #[arg(long)]
    pub prepare: Option<u32>,

    /// Number of breathing cycles (0 runs until stopped)
    #[arg(long)]
    pub cycles: Option<u32>,

    #[arg(long)]
    pub inhale: Option<u32>,

    /// Hold after inhaling (0 skips the hold)
    #[arg(long)]
    pub hold: Option<u32>,

    #[arg(long)]
    pub exhale: Option<u32>,

    /// Switch to a second breathing profile after --phase1-cycles cycles
    #[arg(long)]
    pub two_phase: bool,

    #[arg(long)]
    pub phase1_cycles: Option<u32>,

    /// Inhale length of the second profile
    #[arg(long)]
    pub inhale2: Option<u32>,

    #[arg(long)]
    pub hold2: Option<u32>,

    #[arg(long)]
    pub exhale2: Option<u32>,

    /// Do not speak the last ten seconds of the preparation countdown
    #[arg(long)]
    pub no_countdown_voice: bool,

    /// Voice cue volume, 0.0 to 1.0
    #[arg(long)]
    pub voice_volume: Option<f32>,

    /// Background music volume, 0.0 to 1.0
    #[arg(long)]
    pub music_volume: Option<f32>,

    /// Directory holding one clip per voice cue
    #[arg(long)]
    pub voice_dir: Option<PathBuf>,

    /// Background music file, looped during the session
    #[arg(long)]
    pub music: Option<PathBuf>,

    /// Persist the merged settings
    #[arg(long)]
    pub save: bool,

    /// Start immediately and exit when the session ends
    #[arg(long)]
    pub auto_start: bool,

    /// Print display frames as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Merge the flags into `config`
    ///
    /// The preset is applied first so individual duration flags can adjust it.
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(preset) = &self.preset {
            config.apply_preset_key(preset)?;
        }

        let session = &mut config.session;
        if let Some(prepare) = self.prepare {
            session.prepare_secs = prepare;
        }
        if let Some(cycles) = self.cycles {
            session.total_cycles = cycles;
        }
        override_profile(&mut session.phase1, self.inhale, self.hold, self.exhale);

        if self.two_phase {
            session.two_phase = true;
        }
        if let Some(threshold) = self.phase1_cycles {
            session.phase1_cycles = threshold;
        }
        if self.inhale2.is_some() || self.hold2.is_some() || self.exhale2.is_some() {
            let phase2 = session.phase2.get_or_insert(session.phase1);
            override_profile(phase2, self.inhale2, self.hold2, self.exhale2);
        }

        if self.no_countdown_voice {
            session.prepare_countdown_voice = false;
        }
        if let Some(volume) = self.voice_volume {
            session.voice_volume = volume;
        }
        if let Some(volume) = self.music_volume {
            session.music_volume = volume;
        }

        if let Some(dir) = &self.voice_dir {
            config.audio.voice_dir = Some(dir.display().to_string());
        }
        if let Some(music) = &self.music {
            config.audio.music_file = Some(music.display().to_string());
        }
        Ok(())
    }
}

fn override_profile(
    profile: &mut BreathingProfile,
    inhale: Option<u32>,
    hold: Option<u32>,
    exhale: Option<u32>,
) {
    if let Some(inhale) = inhale {
        profile.inhale_secs = inhale;
    }
    if let Some(hold) = hold {
        profile.hold_secs = hold;
    }
    if let Some(exhale) = exhale {
        profile.exhale_secs = exhale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breathe_core::context::BreathingPreset;

    fn parse(flags: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("breathe").chain(flags.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_loaded_values() {
        let mut config = AppConfig::default();
        parse(&["--cycles", "0", "--prepare", "5", "--hold", "0"])
            .apply(&mut config)
            .unwrap();

        assert!(config.session.is_infinite());
        assert_eq!(config.session.prepare_secs, 5);
        assert_eq!(config.session.phase1, BreathingProfile::new(4, 0, 6));
    }

    #[test]
    fn duration_flags_adjust_the_preset() {
        let mut config = AppConfig::default();
        parse(&["--preset", "relax-478", "--exhale", "9"])
            .apply(&mut config)
            .unwrap();

        let mut expected = BreathingPreset::Relax478.profile();
        expected.exhale_secs = 9;
        assert_eq!(config.session.phase1, expected);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let mut config = AppConfig::default();
        let err = parse(&["--preset", "square"]).apply(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset { .. }));
    }

    #[test]
    fn second_profile_starts_from_the_first() {
        let mut config = AppConfig::default();
        parse(&["--two-phase", "--phase1-cycles", "3", "--inhale2", "6"])
            .apply(&mut config)
            .unwrap();

        assert!(config.session.two_phase);
        assert_eq!(config.session.phase1_cycles, 3);
        assert_eq!(config.session.phase2, Some(BreathingProfile::new(6, 4, 6)));
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let mut config = AppConfig::default();
        parse(&[]).apply(&mut config).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn audio_paths_are_recorded() {
        let mut config = AppConfig::default();
        parse(&["--voice-dir", "clips", "--music", "calm.mp3", "--no-countdown-voice"])
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.audio.voice_dir.as_deref(), Some("clips"));
        assert_eq!(config.audio.music_file.as_deref(), Some("calm.mp3"));
        assert!(!config.session.prepare_countdown_voice);
    }
}
