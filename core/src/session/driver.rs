//! Runs a [`SessionMachine`] against real outputs
//!
//! The driver owns the machine together with the cue registry and the audio
//! and display outputs, and carries out every effect the machine emits.
//! A cue with no clip is logged and skipped; the session keeps going.

use std::time::Duration;

use crate::audio::{CueRegistry, FadeProgress, MusicController, MusicOutput, VoiceOutput};

use super::display::DisplayFrame;
use super::machine::{Effect, MusicCommand, SessionMachine};
use super::state::SessionPhase;

/// Receives every display update
pub trait DisplaySink {
    fn show(&mut self, frame: &DisplayFrame);
}

#[derive(Debug)]
pub struct SessionDriver<V: VoiceOutput, M: MusicOutput, D: DisplaySink> {
    machine: SessionMachine,
    registry: CueRegistry,
    voice: V,
    music: MusicController<M>,
    display: D,
}

impl<V: VoiceOutput, M: MusicOutput, D: DisplaySink> SessionDriver<V, M, D> {
    pub fn new(
        machine: SessionMachine,
        registry: CueRegistry,
        voice: V,
        music: MusicController<M>,
        display: D,
    ) -> Self {
        Self {
            machine,
            registry,
            voice,
            music,
            display,
        }
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn registry(&self) -> &CueRegistry {
        &self.registry
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn music(&self) -> &MusicController<M> {
        &self.music
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.machine.next_deadline()
    }

    pub fn start(&mut self) {
        let fx = self.machine.start();
        self.apply(fx);
    }

    pub fn stop(&mut self) {
        let fx = self.machine.stop();
        self.apply(fx);
    }

    /// Deliver every wakeup due up to `now` (time since the driver started)
    pub fn advance_to(&mut self, now: Duration) {
        let fx = self.machine.advance_clock(now);
        self.apply(fx);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        let fx = self.machine.advance_by(delta);
        self.apply(fx);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PlayCue(cue) => match self.registry.resolve(cue) {
                    Ok(clip) => {
                        self.voice.play(cue, clip, self.machine.config().voice_volume);
                    }
                    Err(err) => tracing::warn!(%err, "skipping voice cue"),
                },
                Effect::Music(command) => self.apply_music(command),
                Effect::Display(frame) => self.display.show(&frame),
            }
        }
    }

    fn apply_music(&mut self, command: MusicCommand) {
        match command {
            MusicCommand::Start => self.music.start(),
            MusicCommand::FadeStep(decrement) => {
                if self.music.fade_step(decrement) == FadeProgress::Finished {
                    tracing::debug!("music faded out");
                }
            }
            MusicCommand::Stop => self.music.stop(),
            MusicCommand::RestoreVolume => self.music.restore_volume(),
        }
    }
}
