//! Audio playback service on a dedicated thread
//!
//! Rodio output streams cannot move between threads, so one thread owns the
//! output device and receives [`AudioCommand`]s over a channel. The session
//! side holds cheap senders implementing the core's output seams.
//!
//! Voice cues each get their own detached sink, so overlapping cues play
//! independently. Music has a single looping sink.

use std::io::Cursor;
use std::thread::JoinHandle;

use breathe_core::audio::{AudioClip, Cue, MusicOutput, VoiceOutput};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::mpsc;

/// Work for the audio thread
#[derive(Debug)]
pub enum AudioCommand {
    PlayVoice {
        cue: Cue,
        clip: AudioClip,
        volume: f32,
    },
    StartMusic {
        clip: AudioClip,
        volume: f32,
    },
    MusicVolume(f32),
    StopMusic,
}

/// Sender handle for audio commands
pub type AudioSender = mpsc::Sender<AudioCommand>;

/// Create a new audio channel
pub fn create_audio_channel() -> (AudioSender, mpsc::Receiver<AudioCommand>) {
    // Fade steps are the densest traffic, 64 is plenty
    mpsc::channel(64)
}

/// Owns the output device and the music sink
pub struct AudioService {
    command_rx: mpsc::Receiver<AudioCommand>,
    music: Option<Sink>,
}

impl AudioService {
    pub fn new(command_rx: mpsc::Receiver<AudioCommand>) -> Self {
        Self {
            command_rx,
            music: None,
        }
    }

    /// Spawn the service on its own thread. The thread ends once every
    /// sender is dropped.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("breathe-audio".into())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        let device = match OutputStream::try_default() {
            Ok(device) => Some(device),
            Err(err) => {
                tracing::warn!(%err, "no audio output device, playing silently");
                None
            }
        };

        while let Some(command) = self.command_rx.blocking_recv() {
            let Some((_stream, handle)) = &device else {
                continue;
            };
            self.handle(handle, command);
        }

        if let Some(sink) = self.music.take() {
            sink.stop();
        }
        tracing::debug!("audio service stopped");
    }

    fn handle(&mut self, handle: &OutputStreamHandle, command: AudioCommand) {
        match command {
            AudioCommand::PlayVoice { cue, clip, volume } => {
                let Some(sink) = new_sink(handle) else { return };
                match Decoder::new(Cursor::new(clip.shared())) {
                    Ok(source) => {
                        sink.set_volume(volume);
                        sink.append(source);
                        sink.detach();
                    }
                    Err(err) => tracing::warn!(%cue, %err, "voice clip could not be decoded"),
                }
            }
            AudioCommand::StartMusic { clip, volume } => {
                if let Some(old) = self.music.take() {
                    old.stop();
                }
                let Some(sink) = new_sink(handle) else { return };
                match Decoder::new_looped(Cursor::new(clip.shared())) {
                    Ok(source) => {
                        sink.set_volume(volume);
                        sink.append(source);
                        self.music = Some(sink);
                    }
                    Err(err) => tracing::warn!(%err, "music track could not be decoded"),
                }
            }
            AudioCommand::MusicVolume(volume) => {
                if let Some(sink) = &self.music {
                    sink.set_volume(volume);
                }
            }
            AudioCommand::StopMusic => {
                if let Some(sink) = self.music.take() {
                    sink.stop();
                }
            }
        }
    }
}

fn new_sink(handle: &OutputStreamHandle) -> Option<Sink> {
    match Sink::try_new(handle) {
        Ok(sink) => Some(sink),
        Err(err) => {
            tracing::warn!(%err, "failed to open audio sink");
            None
        }
    }
}

fn send(tx: &AudioSender, command: AudioCommand) {
    if let Err(err) = tx.try_send(command) {
        tracing::warn!(%err, "audio command dropped");
    }
}

/// Voice side of the audio channel
#[derive(Debug, Clone)]
pub struct VoiceChannel(AudioSender);

impl VoiceChannel {
    pub fn new(tx: AudioSender) -> Self {
        Self(tx)
    }
}

impl VoiceOutput for VoiceChannel {
    fn play(&mut self, cue: Cue, clip: &AudioClip, volume: f32) {
        tracing::debug!(%cue, "voice cue");
        send(
            &self.0,
            AudioCommand::PlayVoice {
                cue,
                clip: clip.clone(),
                volume,
            },
        );
    }
}

/// Music side of the audio channel
#[derive(Debug, Clone)]
pub struct MusicChannel(AudioSender);

impl MusicChannel {
    pub fn new(tx: AudioSender) -> Self {
        Self(tx)
    }
}

impl MusicOutput for MusicChannel {
    fn start_loop(&mut self, clip: &AudioClip, volume: f32) {
        send(
            &self.0,
            AudioCommand::StartMusic {
                clip: clip.clone(),
                volume,
            },
        );
    }

    fn set_volume(&mut self, volume: f32) {
        send(&self.0, AudioCommand::MusicVolume(volume));
    }

    fn stop(&mut self) {
        send(&self.0, AudioCommand::StopMusic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_forward_commands_in_order() {
        let (tx, mut rx) = create_audio_channel();
        let mut voice = VoiceChannel::new(tx.clone());
        let mut music = MusicChannel::new(tx);
        let clip = AudioClip::new(vec![0; 8]);

        voice.play(Cue::Inhale, &clip, 0.5);
        music.start_loop(&clip, 0.3);
        music.set_volume(0.25);
        music.stop();

        assert!(matches!(
            rx.try_recv(),
            Ok(AudioCommand::PlayVoice { cue: Cue::Inhale, .. })
        ));
        assert!(matches!(rx.try_recv(), Ok(AudioCommand::StartMusic { .. })));
        assert!(matches!(rx.try_recv(), Ok(AudioCommand::MusicVolume(v)) if v == 0.25));
        assert!(matches!(rx.try_recv(), Ok(AudioCommand::StopMusic)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (tx, _rx) = mpsc::channel(1);
        let mut music = MusicChannel::new(tx);
        music.stop();
        music.stop();
    }
}
