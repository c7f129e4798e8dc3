//! Display frames emitted by the session
//!
//! A frame is the full visible state: a status line, a cycle label and a
//! progress indicator. Rendering surfaces replace whatever they showed with
//! each new frame. `Display` impls give the plain-text rendering.

use std::fmt;

use serde::Serialize;

/// Main status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusView {
    Blank,
    Preparing { remaining: u32 },
    Ready,
    Inhale { remaining: u32 },
    Hold { remaining: u32 },
    Exhale { remaining: u32 },
    PhaseTransition { profile: u8 },
    Complete,
    Stopped { cycles: u32 },
}

impl StatusView {
    pub fn title(&self) -> &'static str {
        match self {
            StatusView::Blank => "",
            StatusView::Preparing { .. } => "Prepare your mind",
            StatusView::Ready => "Get ready to begin...",
            StatusView::Inhale { .. } => "BREATHE IN",
            StatusView::Hold { .. } => "HOLD",
            StatusView::Exhale { .. } => "BREATHE OUT",
            StatusView::PhaseTransition { .. } => "Switching breathing phase",
            StatusView::Complete => "Complete!",
            StatusView::Stopped { .. } => "Stopped",
        }
    }

    /// Seconds left in the visible countdown, if the status has one
    pub fn remaining(&self) -> Option<u32> {
        match *self {
            StatusView::Preparing { remaining }
            | StatusView::Inhale { remaining }
            | StatusView::Hold { remaining }
            | StatusView::Exhale { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Copy of this status with the countdown replaced
    pub fn with_remaining(self, remaining: u32) -> Self {
        match self {
            StatusView::Preparing { .. } => StatusView::Preparing { remaining },
            StatusView::Inhale { .. } => StatusView::Inhale { remaining },
            StatusView::Hold { .. } => StatusView::Hold { remaining },
            StatusView::Exhale { .. } => StatusView::Exhale { remaining },
            other => other,
        }
    }
}

/// "cycle" or "cycles" to follow `count`
pub fn cycle_noun(count: u32) -> &'static str {
    if count == 1 { "cycle" } else { "cycles" }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusView::PhaseTransition { profile } => {
                write!(f, "{} {profile}", self.title())
            }
            StatusView::Stopped { cycles } if *cycles > 0 => {
                write!(f, "{} (you completed {cycles} {})", self.title(), cycle_noun(*cycles))
            }
            _ => match self.remaining() {
                Some(remaining) => write!(f, "{}  {remaining}", self.title()),
                None => f.write_str(self.title()),
            },
        }
    }
}

/// Secondary line under the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleLabel {
    Empty,
    /// Shown during preparation
    Relax,
    /// Shown during the settle pause
    StartingMusic,
    Counter {
        current: u32,
        /// None in infinite mode
        total: Option<u32>,
        /// Only set in two-phase mode
        profile: Option<u8>,
    },
    Completed { cycles: u32 },
}

impl fmt::Display for CycleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleLabel::Empty => Ok(()),
            CycleLabel::Relax => f.write_str("Sit comfortably and relax..."),
            CycleLabel::StartingMusic => f.write_str("Starting background music..."),
            CycleLabel::Counter {
                current,
                total,
                profile,
            } => {
                match total {
                    Some(total) => write!(f, "Cycle: {current}/{total}")?,
                    None => write!(f, "Cycle: {current} ∞")?,
                }
                if let Some(profile) = profile {
                    write!(f, " (phase {profile})")?;
                }
                Ok(())
            }
            CycleLabel::Completed { cycles } => {
                write!(f, "You completed {cycles} meditation {}", cycle_noun(*cycles))
            }
        }
    }
}

/// Progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressView {
    Empty,
    Bar { value: u32, max: u32 },
    /// Infinite mode has no bar
    Infinite,
    Full,
}

impl ProgressView {
    /// Fill fraction for bar-style rendering (None when there is no bar)
    pub fn fraction(&self) -> Option<f32> {
        match *self {
            ProgressView::Bar { value, max } if max > 0 => {
                Some((value as f32 / max as f32).clamp(0.0, 1.0))
            }
            ProgressView::Bar { .. } | ProgressView::Full => Some(1.0),
            ProgressView::Empty | ProgressView::Infinite => None,
        }
    }
}

impl fmt::Display for ProgressView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressView::Empty => Ok(()),
            ProgressView::Bar { value, max } => write!(f, "{value}/{max}"),
            ProgressView::Infinite => f.write_str("∞"),
            ProgressView::Full => f.write_str("100%"),
        }
    }
}

/// One complete display update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayFrame {
    pub status: StatusView,
    pub cycle: CycleLabel,
    pub progress: ProgressView,
}

impl DisplayFrame {
    pub fn new(status: StatusView, cycle: CycleLabel, progress: ProgressView) -> Self {
        Self {
            status,
            cycle,
            progress,
        }
    }

    /// Empty frame shown once a session is back to idle
    pub fn cleared() -> Self {
        Self::new(StatusView::Blank, CycleLabel::Empty, ProgressView::Empty)
    }

    pub fn is_cleared(&self) -> bool {
        *self == Self::cleared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_includes_countdown() {
        assert_eq!(StatusView::Inhale { remaining: 4 }.to_string(), "BREATHE IN  4");
        assert_eq!(StatusView::Complete.to_string(), "Complete!");
        assert_eq!(StatusView::Stopped { cycles: 0 }.to_string(), "Stopped");
        assert_eq!(
            StatusView::Stopped { cycles: 3 }.to_string(),
            "Stopped (you completed 3 cycles)"
        );
        assert_eq!(
            StatusView::Stopped { cycles: 1 }.to_string(),
            "Stopped (you completed 1 cycle)"
        );
    }

    #[test]
    fn completed_label_counts_cycles() {
        assert_eq!(
            CycleLabel::Completed { cycles: 1 }.to_string(),
            "You completed 1 meditation cycle"
        );
        assert_eq!(
            CycleLabel::Completed { cycles: 10 }.to_string(),
            "You completed 10 meditation cycles"
        );
    }

    #[test]
    fn cycle_label_text() {
        let finite = CycleLabel::Counter {
            current: 2,
            total: Some(10),
            profile: None,
        };
        assert_eq!(finite.to_string(), "Cycle: 2/10");

        let infinite = CycleLabel::Counter {
            current: 7,
            total: None,
            profile: Some(2),
        };
        assert_eq!(infinite.to_string(), "Cycle: 7 ∞ (phase 2)");
    }

    #[test]
    fn with_remaining_only_touches_countdowns() {
        assert_eq!(
            StatusView::Hold { remaining: 4 }.with_remaining(1),
            StatusView::Hold { remaining: 1 }
        );
        assert_eq!(StatusView::Ready.with_remaining(1), StatusView::Ready);
    }

    #[test]
    fn progress_fraction() {
        assert_eq!(ProgressView::Bar { value: 5, max: 10 }.fraction(), Some(0.5));
        assert_eq!(ProgressView::Full.fraction(), Some(1.0));
        assert_eq!(ProgressView::Infinite.fraction(), None);
    }
}
