//! Session lifecycle state

use breathe_types::ProfileSlot;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session; `start` is accepted
    #[default]
    Idle,
    /// Preparation countdown
    Preparing,
    /// Fixed settle pause after preparation, music starting
    ReadyTransition,
    Inhale,
    Hold,
    Exhale,
    /// Fixed pause while switching to the secondary profile
    PhaseTransition,
    /// Natural end; music fading, returns to Idle after a fixed delay
    Complete,
    /// Stopped by the user; returns to Idle after a fixed delay
    Stopped,
}

impl SessionPhase {
    pub fn is_idle(self) -> bool {
        self == SessionPhase::Idle
    }

    /// Inhale, hold or exhale
    pub fn is_breathing(self) -> bool {
        matches!(
            self,
            SessionPhase::Inhale | SessionPhase::Hold | SessionPhase::Exhale
        )
    }

    /// A cycle has been counted but not finished
    pub fn is_mid_cycle(self) -> bool {
        self.is_breathing() || self == SessionPhase::PhaseTransition
    }

    /// Phases that own a running countdown
    pub fn runs_countdown(self) -> bool {
        self.is_breathing() || self == SessionPhase::Preparing
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Preparing => "preparing",
            SessionPhase::ReadyTransition => "ready",
            SessionPhase::Inhale => "inhale",
            SessionPhase::Hold => "hold",
            SessionPhase::Exhale => "exhale",
            SessionPhase::PhaseTransition => "phase transition",
            SessionPhase::Complete => "complete",
            SessionPhase::Stopped => "stopped",
        }
    }
}

/// Mutable state of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Incremented on entry to every breathing cycle, starts at 0
    pub cycle: u32,
    pub profile: ProfileSlot,
}

impl SessionState {
    /// Fresh state for a run that is starting
    pub fn preparing() -> Self {
        Self {
            phase: SessionPhase::Preparing,
            cycle: 0,
            profile: ProfileSlot::Primary,
        }
    }

    /// Fully breathed cycles so far.
    ///
    /// A counted cycle that is still in progress is not complete. On
    /// completion the counter has already moved past the last cycle.
    pub fn cycles_completed(&self) -> u32 {
        if self.phase.is_mid_cycle() || self.phase == SessionPhase::Complete {
            self.cycle.saturating_sub(1)
        } else {
            self.cycle
        }
    }
}

/// How the last run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed { cycles: u32 },
    Stopped { cycles: u32 },
}

impl SessionOutcome {
    pub fn cycles(self) -> u32 {
        match self {
            SessionOutcome::Completed { cycles } | SessionOutcome::Stopped { cycles } => cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_cycle_does_not_count_current_cycle() {
        let mut state = SessionState {
            phase: SessionPhase::Hold,
            cycle: 4,
            profile: ProfileSlot::Primary,
        };
        assert_eq!(state.cycles_completed(), 3);

        state.phase = SessionPhase::PhaseTransition;
        assert_eq!(state.cycles_completed(), 3);

        state.phase = SessionPhase::Complete;
        assert_eq!(state.cycles_completed(), 3);
    }

    #[test]
    fn preparing_has_no_cycles() {
        let state = SessionState::preparing();
        assert_eq!(state.cycles_completed(), 0);
        assert!(state.phase.runs_countdown());
        assert!(!state.phase.is_mid_cycle());
    }
}
