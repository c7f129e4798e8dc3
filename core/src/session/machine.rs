//! Session state machine
//!
//! Sequences one meditation run:
//! - Idle → Preparing (countdown, optional spoken digits)
//! - ReadyTransition (fixed settle pause, music starts)
//! - breathing cycles: Inhale → Hold (skipped when 0) → Exhale
//! - optional PhaseTransition to the secondary profile
//! - Complete (music fade) or Stopped, both returning to Idle after a fixed delay
//!
//! The machine is pure: [`SessionMachine::advance`] takes one event and
//! returns the effects to carry out. Waits are wakeups on the internal
//! [`Scheduler`], delivered by [`SessionMachine::advance_clock`].

use std::time::Duration;

use breathe_types::{BreathingProfile, ProfileSlot, SessionConfig};

use crate::audio::Cue;
use crate::clock::Scheduler;
use crate::context::{ConfigError, validate_session};
use crate::timers::{CountdownId, CountdownPurpose, CountdownStep, CountdownTimer};

use super::display::{CycleLabel, DisplayFrame, ProgressView, StatusView};
use super::state::{SessionOutcome, SessionPhase, SessionState};

// ─────────────────────────────────────────────────────────────────────────────
// Timings
// ─────────────────────────────────────────────────────────────────────────────

/// Countdown tick interval
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Pause between the end of preparation and the first cycle
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);
/// Pause while switching to the secondary profile
pub const PHASE_TRANSITION_DELAY: Duration = Duration::from_secs(3);
/// Time the completion message stays up before returning to idle
pub const COMPLETION_DELAY: Duration = Duration::from_secs(3);
/// Time the stop message stays up before returning to idle
pub const STOP_DELAY: Duration = Duration::from_secs(3);
/// Interval between music fade steps
pub const FADE_STEP_INTERVAL: Duration = Duration::from_millis(200);
/// Volume removed per fade step, widened when the fade would outlast
/// the completion delay
pub const FADE_DECREMENT: f32 = 0.05;
/// Volumes at or below this count as silent
pub const FADE_EPSILON: f32 = 1e-3;

/// Fixed delays used by the machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTimings {
    pub tick: Duration,
    pub settle: Duration,
    pub phase_transition: Duration,
    pub completion: Duration,
    pub stop: Duration,
    pub fade_step: Duration,
    pub fade_decrement: f32,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            tick: TICK_INTERVAL,
            settle: SETTLE_DELAY,
            phase_transition: PHASE_TRANSITION_DELAY,
            completion: COMPLETION_DELAY,
            stop: STOP_DELAY,
            fade_step: FADE_STEP_INTERVAL,
            fade_decrement: FADE_DECREMENT,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events and Effects
// ─────────────────────────────────────────────────────────────────────────────

/// Scheduled continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    CountdownTick(CountdownId),
    SettleElapsed,
    TransitionElapsed,
    FadeStep,
    CompletionElapsed,
    StopElapsed,
}

/// Input to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Stop,
    Wakeup(Wakeup),
}

/// Command for the background music channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MusicCommand {
    /// Restart the track at the configured volume
    Start,
    /// Lower the volume by the given amount
    FadeStep(f32),
    /// Stop immediately
    Stop,
    /// Reset to the configured volume
    RestoreVolume,
}

/// Side effect requested by the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PlayCue(Cue),
    Music(MusicCommand),
    Display(DisplayFrame),
}

// ─────────────────────────────────────────────────────────────────────────────
// Machine
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum BreathStep {
    Inhale,
    Hold,
    Exhale,
}

impl BreathStep {
    fn secs(self, profile: &BreathingProfile) -> u32 {
        match self {
            BreathStep::Inhale => profile.inhale_secs,
            BreathStep::Hold => profile.hold_secs,
            BreathStep::Exhale => profile.exhale_secs,
        }
    }

    fn phase(self) -> SessionPhase {
        match self {
            BreathStep::Inhale => SessionPhase::Inhale,
            BreathStep::Hold => SessionPhase::Hold,
            BreathStep::Exhale => SessionPhase::Exhale,
        }
    }

    fn cue(self) -> Cue {
        match self {
            BreathStep::Inhale => Cue::Inhale,
            BreathStep::Hold => Cue::Hold,
            BreathStep::Exhale => Cue::Exhale,
        }
    }

    fn purpose(self) -> CountdownPurpose {
        match self {
            BreathStep::Inhale => CountdownPurpose::Inhale,
            BreathStep::Hold => CountdownPurpose::Hold,
            BreathStep::Exhale => CountdownPurpose::Exhale,
        }
    }

    fn status(self, remaining: u32) -> StatusView {
        match self {
            BreathStep::Inhale => StatusView::Inhale { remaining },
            BreathStep::Hold => StatusView::Hold { remaining },
            BreathStep::Exhale => StatusView::Exhale { remaining },
        }
    }
}

/// One meditation session, reusable across runs
#[derive(Debug)]
pub struct SessionMachine {
    config: SessionConfig,
    timings: SessionTimings,
    state: SessionState,
    countdown: CountdownTimer,
    clock: Scheduler<Wakeup>,
    /// Status of the frame currently shown, so ticks can update its countdown
    status: StatusView,
    cycle_label: CycleLabel,
    progress: ProgressView,
    fade_steps_left: u32,
    /// Volume removed by each fade step of the current completion
    fade_size: f32,
    outcome: Option<SessionOutcome>,
}

impl SessionMachine {
    /// Build a machine for a validated config with the default delays
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_timings(config, SessionTimings::default())
    }

    pub fn with_timings(config: SessionConfig, timings: SessionTimings) -> Result<Self, ConfigError> {
        validate_session(&config)?;
        Ok(Self {
            config,
            timings,
            state: SessionState::default(),
            countdown: CountdownTimer::new(),
            clock: Scheduler::new(),
            status: StatusView::Blank,
            cycle_label: CycleLabel::Empty,
            progress: ProgressView::Empty,
            fade_steps_left: 0,
            fade_size: 0.0,
            outcome: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn timings(&self) -> &SessionTimings {
        &self.timings
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// When the next wakeup is due, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.clock.next_deadline()
    }

    /// Seconds left on the running countdown
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    /// The frame most recently emitted
    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame::new(self.status, self.cycle_label, self.progress)
    }

    /// How the most recent run ended (cleared by `start`)
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn start(&mut self) -> Vec<Effect> {
        self.advance(SessionEvent::Start)
    }

    pub fn stop(&mut self) -> Vec<Effect> {
        self.advance(SessionEvent::Stop)
    }

    /// Apply one event and return the effects it produced
    pub fn advance(&mut self, event: SessionEvent) -> Vec<Effect> {
        let mut fx = Vec::new();
        match event {
            SessionEvent::Start => self.on_start(&mut fx),
            SessionEvent::Stop => self.on_stop(&mut fx),
            SessionEvent::Wakeup(wakeup) => self.on_wakeup(wakeup, &mut fx),
        }
        fx
    }

    /// Move virtual time forward to `until`, delivering every wakeup due on
    /// the way in deadline order
    pub fn advance_clock(&mut self, until: Duration) -> Vec<Effect> {
        let mut fx = Vec::new();
        while let Some(wakeup) = self.clock.pop_due(until) {
            self.on_wakeup(wakeup, &mut fx);
        }
        fx
    }

    /// Advance virtual time by `delta`
    pub fn advance_by(&mut self, delta: Duration) -> Vec<Effect> {
        self.advance_clock(self.clock.now() + delta)
    }

    // ─── Commands ───────────────────────────────────────────────────────────

    fn on_start(&mut self, fx: &mut Vec<Effect>) {
        if !self.state.phase.is_idle() {
            tracing::debug!(phase = self.state.phase.label(), "start ignored, session active");
            return;
        }

        tracing::info!(
            prepare_secs = self.config.prepare_secs,
            total_cycles = self.config.total_cycles,
            two_phase = self.config.two_phase,
            "session starting"
        );

        self.clock.clear();
        self.state = SessionState::preparing();
        self.outcome = None;

        let prepare_secs = self.config.prepare_secs;
        self.show(
            fx,
            StatusView::Preparing {
                remaining: prepare_secs,
            },
            CycleLabel::Relax,
            ProgressView::Empty,
        );
        fx.push(Effect::PlayCue(Cue::Prepare));

        if prepare_secs == 0 {
            self.finish_prepare(fx);
        } else {
            self.start_countdown(prepare_secs, CountdownPurpose::Prepare);
        }
    }

    fn on_stop(&mut self, fx: &mut Vec<Effect>) {
        if matches!(self.state.phase, SessionPhase::Idle | SessionPhase::Stopped) {
            tracing::debug!(phase = self.state.phase.label(), "stop ignored");
            return;
        }

        let cycles = self.state.cycles_completed();
        tracing::info!(phase = self.state.phase.label(), cycles, "session stopped");

        self.countdown.cancel();
        self.clock.clear();
        fx.push(Effect::Music(MusicCommand::Stop));

        self.state = SessionState {
            phase: SessionPhase::Stopped,
            ..SessionState::default()
        };
        self.outcome = Some(SessionOutcome::Stopped { cycles });
        self.show(
            fx,
            StatusView::Stopped { cycles },
            CycleLabel::Empty,
            ProgressView::Empty,
        );
        self.clock.schedule_in(self.timings.stop, Wakeup::StopElapsed);
    }

    // ─── Wakeups ────────────────────────────────────────────────────────────

    fn on_wakeup(&mut self, wakeup: Wakeup, fx: &mut Vec<Effect>) {
        let phase = self.state.phase;
        match wakeup {
            Wakeup::CountdownTick(id) => self.on_tick(id, fx),
            Wakeup::SettleElapsed if phase == SessionPhase::ReadyTransition => {
                self.begin_cycle(true, fx);
            }
            Wakeup::TransitionElapsed if phase == SessionPhase::PhaseTransition => {
                self.begin_cycle(false, fx);
            }
            Wakeup::FadeStep if phase == SessionPhase::Complete => self.fade_step(fx),
            Wakeup::CompletionElapsed if phase == SessionPhase::Complete => {
                fx.push(Effect::Music(MusicCommand::Stop));
                self.return_to_idle(fx);
            }
            Wakeup::StopElapsed if phase == SessionPhase::Stopped => self.return_to_idle(fx),
            stale => {
                tracing::trace!(?stale, phase = phase.label(), "stale wakeup discarded");
            }
        }
    }

    fn on_tick(&mut self, id: CountdownId, fx: &mut Vec<Effect>) {
        if !self.state.phase.runs_countdown() {
            // Session left the countdown phase; drop whatever is still ticking
            self.countdown.cancel();
            tracing::trace!(phase = self.state.phase.label(), "countdown tick after phase exit");
            return;
        }

        let CountdownStep::Tick {
            purpose,
            remaining,
            finished,
        } = self.countdown.tick(id)
        else {
            tracing::trace!(?id, "stale countdown tick discarded");
            return;
        };

        if purpose == CountdownPurpose::Prepare
            && self.config.prepare_countdown_voice
            && let Some(cue) = Cue::countdown(remaining)
        {
            fx.push(Effect::PlayCue(cue));
        }
        self.status = self.status.with_remaining(remaining);
        fx.push(Effect::Display(self.frame()));

        if finished {
            self.on_countdown_finished(purpose, fx);
        } else {
            self.clock.schedule_in(self.timings.tick, Wakeup::CountdownTick(id));
        }
    }

    fn on_countdown_finished(&mut self, purpose: CountdownPurpose, fx: &mut Vec<Effect>) {
        match purpose {
            CountdownPurpose::Prepare => self.finish_prepare(fx),
            CountdownPurpose::Inhale => {
                if self.active_profile().has_hold() {
                    self.enter_breath(BreathStep::Hold, fx);
                } else {
                    self.enter_breath(BreathStep::Exhale, fx);
                }
            }
            CountdownPurpose::Hold => self.enter_breath(BreathStep::Exhale, fx),
            CountdownPurpose::Exhale => self.begin_cycle(true, fx),
        }
    }

    // ─── Transitions ────────────────────────────────────────────────────────

    fn finish_prepare(&mut self, fx: &mut Vec<Effect>) {
        self.state.phase = SessionPhase::ReadyTransition;
        fx.push(Effect::PlayCue(Cue::Ready));
        self.show(
            fx,
            StatusView::Ready,
            CycleLabel::StartingMusic,
            ProgressView::Empty,
        );
        fx.push(Effect::Music(MusicCommand::Start));
        self.clock.schedule_in(self.timings.settle, Wakeup::SettleElapsed);
    }

    /// Breathing-cycle entry point. `increment` is false when re-entering
    /// after a profile switch, so the switching cycle is breathed with the
    /// secondary profile instead of being skipped.
    fn begin_cycle(&mut self, increment: bool, fx: &mut Vec<Effect>) {
        if increment {
            self.state.cycle += 1;
        }
        let cycle = self.state.cycle;

        if !self.config.is_infinite() && cycle > self.config.total_cycles {
            self.complete(fx);
            return;
        }

        // Completion is checked first, so a threshold equal to the total
        // never plays the phase2 cue on the last cycle
        if self.config.two_phase
            && self.state.profile == ProfileSlot::Primary
            && cycle > self.config.phase1_cycles
        {
            self.enter_phase_transition(fx);
            return;
        }

        tracing::debug!(cycle, profile = self.state.profile.number(), "cycle started");
        self.enter_breath(BreathStep::Inhale, fx);
    }

    fn enter_phase_transition(&mut self, fx: &mut Vec<Effect>) {
        tracing::info!(cycle = self.state.cycle, "switching to secondary breathing profile");
        self.state.profile = ProfileSlot::Secondary;
        self.state.phase = SessionPhase::PhaseTransition;
        fx.push(Effect::PlayCue(Cue::Phase2));
        self.show(
            fx,
            StatusView::PhaseTransition {
                profile: ProfileSlot::Secondary.number(),
            },
            self.counter_label(),
            self.counter_progress(),
        );
        self.clock.schedule_in(self.timings.phase_transition, Wakeup::TransitionElapsed);
    }

    fn enter_breath(&mut self, step: BreathStep, fx: &mut Vec<Effect>) {
        let secs = step.secs(&self.active_profile());
        self.state.phase = step.phase();
        self.show(fx, step.status(secs), self.counter_label(), self.counter_progress());
        fx.push(Effect::PlayCue(step.cue()));

        if secs == 0 {
            // Zero-length steps never start a countdown
            self.on_countdown_finished(step.purpose(), fx);
        } else {
            self.start_countdown(secs, step.purpose());
        }
    }

    fn complete(&mut self, fx: &mut Vec<Effect>) {
        self.state.phase = SessionPhase::Complete;
        let cycles = self.state.cycles_completed();
        tracing::info!(cycles, "session complete");

        self.countdown.cancel();
        self.outcome = Some(SessionOutcome::Completed { cycles });
        self.show(
            fx,
            StatusView::Complete,
            CycleLabel::Completed { cycles },
            ProgressView::Full,
        );
        fx.push(Effect::PlayCue(Cue::Complete));

        self.plan_fade();
        if self.fade_steps_left > 0 {
            self.clock.schedule_in(self.timings.fade_step, Wakeup::FadeStep);
        }
        self.clock.schedule_in(self.timings.completion, Wakeup::CompletionElapsed);
    }

    /// Split the music fade into steps that all land inside the completion
    /// window. Steps are `fade_decrement` wide unless that would need more
    /// steps than fit, in which case they widen so the volume still reaches 0.
    fn plan_fade(&mut self) {
        self.fade_steps_left = 0;
        self.fade_size = 0.0;

        let volume = self.config.music_volume;
        let decrement = self.timings.fade_decrement;
        if volume <= 0.0 || decrement <= 0.0 || self.timings.fade_step.is_zero() {
            return;
        }

        // A step due at the same instant as CompletionElapsed would never run
        let window = self.timings.completion.as_millis() / self.timings.fade_step.as_millis();
        let max_steps = u32::try_from(window.saturating_sub(1)).unwrap_or(u32::MAX);
        let wanted = ((volume / decrement) - FADE_EPSILON).ceil().max(1.0) as u32;

        self.fade_steps_left = wanted.min(max_steps);
        if self.fade_steps_left > 0 {
            self.fade_size = volume / self.fade_steps_left as f32;
        }
    }

    fn fade_step(&mut self, fx: &mut Vec<Effect>) {
        fx.push(Effect::Music(MusicCommand::FadeStep(self.fade_size)));
        self.fade_steps_left = self.fade_steps_left.saturating_sub(1);
        if self.fade_steps_left > 0 {
            self.clock.schedule_in(self.timings.fade_step, Wakeup::FadeStep);
        }
    }

    fn return_to_idle(&mut self, fx: &mut Vec<Effect>) {
        self.countdown.cancel();
        self.clock.clear();
        self.state = SessionState::default();
        self.fade_steps_left = 0;
        fx.push(Effect::Music(MusicCommand::RestoreVolume));
        let cleared = DisplayFrame::cleared();
        self.show(fx, cleared.status, cleared.cycle, cleared.progress);
        tracing::debug!("session idle");
    }

    // ─── Helpers ────────────────────────────────────────────────────────────

    fn start_countdown(&mut self, secs: u32, purpose: CountdownPurpose) {
        let id = self.countdown.start(secs, purpose);
        self.clock.schedule_in(self.timings.tick, Wakeup::CountdownTick(id));
    }

    fn active_profile(&self) -> BreathingProfile {
        self.config.profile(self.state.profile)
    }

    fn counter_label(&self) -> CycleLabel {
        CycleLabel::Counter {
            current: self.state.cycle,
            total: (!self.config.is_infinite()).then_some(self.config.total_cycles),
            profile: self.config.two_phase.then(|| self.state.profile.number()),
        }
    }

    fn counter_progress(&self) -> ProgressView {
        if self.config.is_infinite() {
            ProgressView::Infinite
        } else {
            ProgressView::Bar {
                value: self.state.cycle,
                max: self.config.total_cycles,
            }
        }
    }

    fn show(
        &mut self,
        fx: &mut Vec<Effect>,
        status: StatusView,
        cycle: CycleLabel,
        progress: ProgressView,
    ) {
        self.status = status;
        self.cycle_label = cycle;
        self.progress = progress;
        fx.push(Effect::Display(self.frame()));
    }
}
