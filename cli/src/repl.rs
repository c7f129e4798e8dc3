//! Interactive command prompt
//!
//! Each stdin line is split with shell quoting rules and parsed with clap,
//! then handed to the session task.

use std::io::BufRead;
use std::thread::JoinHandle;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

pub const HELP: &str = "commands: start, stop, status, config, cues, exit";

#[derive(Parser)]
#[command(about = "breathe prompt", disable_version_flag = true)]
struct Repl {
    #[command(subcommand)]
    command: Option<ReplCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ReplCommand {
    /// Begin a session (ignored while one is running)
    Start,
    /// Stop the running session
    Stop,
    /// Show the session phase, cycle and countdown
    Status,
    /// Show the settings in effect
    Config,
    /// List voice clips and the phrases they should contain
    Cues,
    Exit,
}

/// Parse one prompt line. Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "breathe".to_string());
    let repl = Repl::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(repl.command)
}

/// Read stdin lines on a dedicated thread until EOF or `exit`, forwarding
/// parsed commands
pub fn spawn_reader(tx: mpsc::Sender<ReplCommand>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("breathe-prompt".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(%err, "failed to read from stdin");
                        break;
                    }
                };

                match parse_line(&line) {
                    Ok(Some(command)) => {
                        if tx.blocking_send(command).is_err() || command == ReplCommand::Exit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => print!("{err}"),
                }
            }
            tracing::debug!("prompt closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_line("start"), Ok(Some(ReplCommand::Start)));
        assert_eq!(parse_line("  cues  "), Ok(Some(ReplCommand::Cues)));
        assert_eq!(parse_line(""), Ok(None));
    }

    #[test]
    fn rejects_unknown_commands_and_bad_quoting() {
        assert!(parse_line("breathe-faster").is_err());
        assert_eq!(
            parse_line("start \"unterminated"),
            Err("error: Invalid quoting".to_string())
        );
    }
}
