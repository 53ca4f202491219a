//! Line-oriented control surface
//!
//! Each input line is one command: `toggle-play` (or an empty line), `play`,
//! `pause`, `set-speed <n>`, `restart`, `quit`. Invalid input is rejected here
//! and never reaches the driver.

use routeplay_core::{Command, ControlError};
use std::io::BufRead;
use std::thread;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What one input line asks for
#[derive(Debug, PartialEq)]
pub enum LineAction {
    Command(Command),
    Quit,
}

/// Interpret a single control line
pub fn parse_line(line: &str) -> Result<LineAction, ControlError> {
    match line.trim() {
        "" => Ok(LineAction::Command(Command::TogglePlay)),
        "quit" | "q" | "exit" => Ok(LineAction::Quit),
        other => other.parse().map(LineAction::Command),
    }
}

/// Read commands from `reader` until EOF, `quit`, or cancellation.
///
/// Blocking; call from a plain thread, not from inside the runtime.
pub fn read_commands<R: BufRead>(
    reader: R,
    commands: &mpsc::Sender<Command>,
    cancel: &CancellationToken,
) {
    for line in reader.lines() {
        if cancel.is_cancelled() {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read control input: {}", e);
                return;
            }
        };

        match parse_line(&line) {
            Ok(LineAction::Command(command)) => {
                if commands.blocking_send(command).is_err() {
                    return;
                }
            }
            Ok(LineAction::Quit) => {
                info!("Quit requested");
                cancel.cancel();
                return;
            }
            Err(e) => warn!("{}", e),
        }
    }
}

/// Read commands from stdin on a dedicated thread.
///
/// The thread is detached: a pending stdin read never holds up shutdown.
pub fn spawn_stdin_reader(commands: mpsc::Sender<Command>, cancel: CancellationToken) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        read_commands(stdin.lock(), &commands, &cancel);
    });
}
