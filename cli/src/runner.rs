//! Session task: maps the driver's virtual clock onto real time
//!
//! The loop sleeps until the next scheduler deadline or the next prompt
//! command, whichever comes first, then brings the driver up to the current
//! elapsed time.

use std::future;

use breathe_core::audio::{MusicOutput, VoiceOutput};
use breathe_core::session::{DisplaySink, SessionDriver};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::commands;
use crate::context::CliContext;
use crate::repl::ReplCommand;

/// Drive the session until `exit`, stdin closing, or (with `auto_start`)
/// the session returning to idle
pub async fn run<V, M, D>(
    driver: &mut SessionDriver<V, M, D>,
    ctx: &CliContext,
    mut commands_rx: mpsc::Receiver<ReplCommand>,
    auto_start: bool,
) where
    V: VoiceOutput,
    M: MusicOutput,
    D: DisplaySink,
{
    let epoch = Instant::now();
    let mut prompt_open = true;

    if auto_start {
        driver.start();
    }

    loop {
        let deadline = driver.next_deadline().map(|offset| epoch + offset);
        let wait = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => future::pending().await,
            }
        };

        tokio::select! {
            command = commands_rx.recv(), if prompt_open => {
                driver.advance_to(epoch.elapsed());
                match command {
                    Some(ReplCommand::Exit) => {
                        driver.stop();
                        commands::exit();
                        break;
                    }
                    Some(command) => respond(command, driver, ctx),
                    // Stdin closed: keep running an auto-started session
                    None if auto_start => prompt_open = false,
                    None => {
                        driver.stop();
                        break;
                    }
                }
            }
            _ = wait => driver.advance_to(epoch.elapsed()),
        }

        if auto_start && driver.phase().is_idle() {
            break;
        }
    }
}

fn respond<V, M, D>(command: ReplCommand, driver: &mut SessionDriver<V, M, D>, ctx: &CliContext)
where
    V: VoiceOutput,
    M: MusicOutput,
    D: DisplaySink,
{
    match command {
        ReplCommand::Start => {
            if !driver.phase().is_idle() {
                println!("a session is already running");
            }
            driver.start();
        }
        ReplCommand::Stop => driver.stop(),
        ReplCommand::Status => println!("{}", commands::status(driver.machine())),
        ReplCommand::Config => {
            println!("{}", commands::settings(&ctx.config, ctx.config_path.as_deref()))
        }
        ReplCommand::Cues => println!(
            "{}",
            commands::cue_listing(driver.registry(), ctx.voice_dir.as_deref())
        ),
        ReplCommand::Exit => {}
    }
}
