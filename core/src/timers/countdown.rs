//! Countdown timer state
//!
//! # Lifecycle
//!
//! 1. `start(duration, purpose)` → any previous countdown is cancelled
//! 2. each `tick(id)` decrements and reports the remaining seconds
//! 3. the tick that reaches 0 is reported as finished, then the timer is empty

/// Identifies one started countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountdownId(u64);

/// What a countdown is timing; decides what the session does on each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPurpose {
    Prepare,
    Inhale,
    Hold,
    Exhale,
}

/// The running countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub id: CountdownId,
    pub purpose: CountdownPurpose,
    pub remaining_secs: u32,
}

/// Outcome of delivering one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// One second elapsed. `remaining` is the post-decrement value and
    /// `finished` is set on the tick that reaches 0.
    Tick {
        purpose: CountdownPurpose,
        remaining: u32,
        finished: bool,
    },
    /// The tick belongs to a countdown that was cancelled or replaced
    Stale,
}

/// Holds at most one active countdown
#[derive(Debug, Default)]
pub struct CountdownTimer {
    next_id: u64,
    active: Option<Countdown>,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, cancelling whatever was running
    pub fn start(&mut self, duration_secs: u32, purpose: CountdownPurpose) -> CountdownId {
        if let Some(previous) = self.cancel() {
            tracing::trace!(purpose = ?previous.purpose, "countdown replaced");
        }

        let id = CountdownId(self.next_id);
        self.next_id += 1;
        self.active = Some(Countdown {
            id,
            purpose,
            remaining_secs: duration_secs,
        });
        id
    }

    /// Deliver one elapsed second to countdown `id`
    pub fn tick(&mut self, id: CountdownId) -> CountdownStep {
        let Some(countdown) = self.active.as_mut().filter(|c| c.id == id) else {
            return CountdownStep::Stale;
        };

        countdown.remaining_secs = countdown.remaining_secs.saturating_sub(1);
        let step = CountdownStep::Tick {
            purpose: countdown.purpose,
            remaining: countdown.remaining_secs,
            finished: countdown.remaining_secs == 0,
        };

        if countdown.remaining_secs == 0 {
            self.active = None;
        }
        step
    }

    /// Stop ticking; later ticks for the cancelled id are stale
    pub fn cancel(&mut self) -> Option<Countdown> {
        self.active.take()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.active.as_ref().map(|c| c.remaining_secs)
    }
}
