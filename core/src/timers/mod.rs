//! Countdown timer
//!
//! A single 1-second-tick countdown drives every timed breathing step.
//! Starting a new countdown replaces the previous one, and each start hands
//! out a fresh id so ticks scheduled for a replaced or cancelled countdown
//! can be recognised and dropped.

mod countdown;

pub use countdown::{Countdown, CountdownId, CountdownPurpose, CountdownStep, CountdownTimer};
