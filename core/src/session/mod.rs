//! Meditation session: state machine, display model and effect driver

mod display;
mod driver;
mod machine;
mod state;


pub use display::{CycleLabel, DisplayFrame, ProgressView, StatusView, cycle_noun};
pub use driver::{DisplaySink, SessionDriver};
pub use machine::{
    COMPLETION_DELAY, Effect, FADE_DECREMENT, FADE_STEP_INTERVAL, MusicCommand,
    PHASE_TRANSITION_DELAY, SETTLE_DELAY, STOP_DELAY, SessionEvent, SessionMachine,
    SessionTimings, TICK_INTERVAL, Wakeup,
};
pub use state::{SessionOutcome, SessionPhase, SessionState};
