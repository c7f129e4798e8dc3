use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use breathe_core::audio::{Cue, CueRegistry};
use breathe_core::context::{AppConfig, ProfileSlot};
use breathe_core::session::{SessionMachine, SessionOutcome, cycle_noun};

/// One-line summary of the running session
pub fn status(machine: &SessionMachine) -> String {
    let phase = machine.phase();
    if phase.is_idle() {
        return match machine.outcome() {
            Some(SessionOutcome::Completed { cycles }) => {
                format!("idle (last session completed {cycles} {})", cycle_noun(cycles))
            }
            Some(SessionOutcome::Stopped { cycles }) => {
                format!("idle (last session stopped after {cycles} {})", cycle_noun(cycles))
            }
            None => "idle".to_string(),
        };
    }

    let mut line = phase.label().to_string();
    let state = machine.state();
    if state.cycle > 0 {
        let config = machine.config();
        if config.is_infinite() {
            let _ = write!(line, ", cycle {} of ∞", state.cycle);
        } else {
            let _ = write!(line, ", cycle {} of {}", state.cycle, config.total_cycles);
        }
        if config.two_phase {
            let _ = write!(line, ", profile {}", state.profile.number());
        }
    }
    if let Some(remaining) = machine.countdown_remaining() {
        let _ = write!(line, ", {remaining}s left");
    }
    line
}

/// Current settings, as they will drive the next session
pub fn settings(config: &AppConfig, path: Option<&Path>) -> String {
    let session = &config.session;
    let mut out = String::new();

    if let Some(path) = path {
        let _ = writeln!(out, "config file:    {}", path.display());
    }
    let _ = writeln!(out, "prepare:        {}s", session.prepare_secs);
    if session.is_infinite() {
        let _ = writeln!(out, "cycles:         until stopped");
    } else {
        let _ = writeln!(out, "cycles:         {}", session.total_cycles);
    }
    let _ = writeln!(
        out,
        "profile 1:      {} ({}s per cycle)",
        session.phase1,
        session.cycle_secs(ProfileSlot::Primary)
    );
    if session.two_phase {
        let _ = writeln!(
            out,
            "profile 2:      {} ({}s per cycle) after {} cycles",
            session.profile(ProfileSlot::Secondary),
            session.cycle_secs(ProfileSlot::Secondary),
            session.phase1_cycles
        );
    }
    let _ = writeln!(
        out,
        "countdown voice: {}",
        if session.prepare_countdown_voice { "on" } else { "off" }
    );
    let _ = writeln!(
        out,
        "volume:         voice {:.0}%, music {:.0}%",
        session.voice_volume * 100.0,
        session.music_volume * 100.0
    );
    let _ = writeln!(
        out,
        "voice dir:      {}",
        config.audio.voice_dir.as_deref().unwrap_or("(default)")
    );
    let _ = write!(
        out,
        "music:          {}",
        config.audio.music_file.as_deref().unwrap_or("(none)")
    );
    out
}

/// Expected clip for every cue, marking the ones not found
pub fn cue_listing(registry: &CueRegistry, voice_dir: Option<&Path>) -> String {
    let mut out = String::new();
    if let Some(dir) = voice_dir {
        let _ = writeln!(out, "voice dir: {}", dir.display());
    }
    let _ = writeln!(out, "{:<14} {:<8} Phrase", "Clip", "Status");
    let _ = writeln!(out, "{}", "-".repeat(60));

    for cue in Cue::all() {
        let status = if registry.contains(cue) { "ok" } else { "missing" };
        let _ = writeln!(out, "{:<14} {:<8} {}", cue.file_stem(), status, cue.phrase());
    }

    let _ = write!(
        out,
        "\n{} of {} clips loaded (.mp3, .ogg or .wav)",
        registry.len(),
        Cue::all().count()
    );
    out
}

pub fn exit() {
    let mut stdout = std::io::stdout();
    if write!(stdout, "quitting...").and_then(|_| stdout.flush()).is_err() {
        tracing::debug!("stdout closed before exit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breathe_core::audio::AudioClip;
    use breathe_core::context::{BreathingProfile, SessionConfig};
    use std::time::Duration;

    fn machine(config: SessionConfig) -> SessionMachine {
        SessionMachine::new(config).unwrap()
    }

    #[test]
    fn idle_status_reports_last_outcome() {
        let mut m = machine(SessionConfig {
            prepare_secs: 0,
            total_cycles: 1,
            phase1: BreathingProfile::new(1, 0, 1),
            ..Default::default()
        });
        assert_eq!(status(&m), "idle");

        m.start();
        m.advance_clock(Duration::from_secs(60));
        assert_eq!(status(&m), "idle (last session completed 1 cycle)");
    }

    #[test]
    fn stopped_status_counts_cycles() {
        let mut m = machine(SessionConfig {
            prepare_secs: 0,
            total_cycles: 5,
            phase1: BreathingProfile::new(1, 0, 1),
            ..Default::default()
        });
        m.start();
        m.advance_clock(Duration::from_millis(4500));
        m.stop();
        m.advance_clock(Duration::from_secs(20));
        assert_eq!(status(&m), "idle (last session stopped after 1 cycle)");
    }

    #[test]
    fn running_status_shows_cycle_and_countdown() {
        let mut m = machine(SessionConfig {
            prepare_secs: 0,
            total_cycles: 0,
            phase1: BreathingProfile::new(4, 0, 4),
            ..Default::default()
        });
        m.start();
        m.advance_clock(Duration::from_secs(3));
        assert_eq!(status(&m), "inhale, cycle 1 of ∞, 3s left");
    }

    #[test]
    fn settings_show_second_profile_only_in_two_phase_mode() {
        let mut config = AppConfig::default();
        assert!(!settings(&config, None).contains("profile 2"));

        config.session.two_phase = true;
        config.session.phase1_cycles = 5;
        config.session.phase2 = Some(BreathingProfile::new(6, 0, 6));
        let text = settings(&config, None);
        assert!(text.contains("profile 1:      4-4-6 (14s per cycle)"));
        assert!(text.contains("profile 2:      6-0-6 (12s per cycle) after 5 cycles"));
    }

    #[test]
    fn cue_listing_marks_missing_clips() {
        let registry = CueRegistry::new().with(Cue::Inhale, AudioClip::new(vec![1]));
        let text = cue_listing(&registry, None);

        assert!(text.contains("inhale         ok       Breathe in"));
        assert!(text.contains("exhale         missing  Breathe out"));
        assert!(text.ends_with("1 of 17 clips loaded (.mp3, .ogg or .wav)"));
    }
}
