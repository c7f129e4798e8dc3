//! Virtual clock for session timing
//!
//! The session never sleeps. Every wait (countdown tick, settle delay,
//! fade step) is a wakeup queued here against virtual time. Callers move the
//! clock forward:
//! - Tests advance it instantly to any point
//! - The CLI maps it onto a real monotonic clock and sleeps until the next deadline

use std::collections::BTreeMap;
use std::time::Duration;

/// Ordered queue of pending wakeups in virtual time
#[derive(Debug)]
pub struct Scheduler<T> {
    /// Current virtual time (time since the scheduler was created)
    now: Duration,

    /// Monotonic sequence number; also breaks ties between equal deadlines
    next_seq: u64,

    /// Pending wakeups keyed by (deadline, sequence)
    pending: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `payload` to fire `delay` after the current virtual time
    pub fn schedule_in(&mut self, delay: Duration, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((self.now + delay, seq), payload);
    }

    /// Drop every pending wakeup
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest wakeup due at or before `until`, moving the clock to
    /// its deadline. When nothing is due the clock moves to `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        match self.next_deadline() {
            Some(deadline) if deadline <= until => {
                let ((deadline, _), payload) = self.pending.pop_first()?;
                self.now = self.now.max(deadline);
                Some(payload)
            }
            _ => {
                self.now = self.now.max(until);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut clock = Scheduler::new();
        clock.schedule_in(secs(3), "c");
        clock.schedule_in(secs(1), "a");
        clock.schedule_in(secs(2), "b");

        let mut fired = Vec::new();
        while let Some(p) = clock.pop_due(secs(10)) {
            fired.push((p, clock.now()));
        }
        assert_eq!(fired, vec![("a", secs(1)), ("b", secs(2)), ("c", secs(3))]);
        assert_eq!(clock.now(), secs(10));
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut clock = Scheduler::new();
        clock.schedule_in(secs(1), 1);
        clock.schedule_in(secs(1), 2);
        assert_eq!(clock.pop_due(secs(1)), Some(1));
        assert_eq!(clock.pop_due(secs(1)), Some(2));
    }

    #[test]
    fn nothing_due_advances_to_target() {
        let mut clock = Scheduler::new();
        clock.schedule_in(secs(5), ());
        assert!(clock.pop_due(secs(2)).is_none());
        assert_eq!(clock.now(), secs(2));

        // Delays are relative to the advanced clock
        clock.schedule_in(secs(1), ());
        assert_eq!(clock.next_deadline(), Some(secs(3)));
    }

    #[test]
    fn cleared_wakeups_never_fire() {
        let mut clock = Scheduler::new();
        clock.schedule_in(secs(1), "gone");
        clock.clear();
        clock.schedule_in(secs(2), "kept");

        assert_eq!(clock.pop_due(secs(5)), Some("kept"));
        assert_eq!(clock.next_deadline(), None);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut clock: Scheduler<()> = Scheduler::new();
        clock.pop_due(secs(4));
        clock.pop_due(secs(1));
        assert_eq!(clock.now(), secs(4));
    }
}
