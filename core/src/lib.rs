pub mod audio;
pub mod clock;
pub mod context;
pub mod session;
pub mod timers;

// Re-exports for convenience
pub use audio::{
    AudioClip, AudioError, Cue, CueError, CueRegistry, MusicController, MusicOutput, Silent,
    VoiceOutput, load_music,
};
pub use context::{AppConfigExt, ConfigError, validate_session};
pub use session::{
    DisplayFrame, DisplaySink, Effect, SessionDriver, SessionEvent, SessionMachine,
    SessionOutcome, SessionPhase,
};
pub use timers::{CountdownPurpose, CountdownTimer};
