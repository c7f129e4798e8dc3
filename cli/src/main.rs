use breathe_cli::audio::{AudioService, MusicChannel, VoiceChannel, create_audio_channel};
use breathe_cli::render::TerminalRenderer;
use breathe_cli::{Args, CliContext, repl, runner};
use breathe_core::audio::MusicController;
use breathe_core::session::{SessionDriver, SessionMachine};
use clap::Parser;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let _log_guard = breathe_cli::logging::init();

    let ctx = CliContext::from_args(&args).map_err(|e| e.to_string())?;
    let machine = SessionMachine::new(ctx.config.session.clone()).map_err(|e| e.to_string())?;

    let (audio_tx, audio_rx) = create_audio_channel();
    let audio_thread = AudioService::new(audio_rx)
        .spawn()
        .map_err(|e| e.to_string())?;

    let music = MusicController::new(
        MusicChannel::new(audio_tx.clone()),
        ctx.music.clone(),
        ctx.config.session.music_volume,
    );
    let mut driver = SessionDriver::new(
        machine,
        ctx.registry.clone(),
        VoiceChannel::new(audio_tx),
        music,
        TerminalRenderer::stdout(args.json),
    );

    let (commands_tx, commands_rx) = mpsc::channel(16);
    // The prompt thread is not joined; it may be parked in a stdin read
    repl::spawn_reader(commands_tx).map_err(|e| e.to_string())?;
    if !args.auto_start && !args.json {
        println!("{}", repl::HELP);
    }

    runner::run(&mut driver, &ctx, commands_rx, args.auto_start).await;

    // Dropping the driver closes the audio channel and ends the audio thread
    drop(driver);
    if audio_thread.join().is_err() {
        tracing::error!("audio thread panicked");
    }

    Ok(())
}
