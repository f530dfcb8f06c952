use std::io::BufRead;

use log::{debug, warn};
use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserCommand {
    RequestLocation,
    DismissAlert,
    CloseMap,
    Quit,
}

impl UserCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "m" | "map" | "view" => Some(UserCommand::RequestLocation),
            "d" | "dismiss" => Some(UserCommand::DismissAlert),
            "c" | "close" => Some(UserCommand::CloseMap),
            "q" | "quit" | "exit" => Some(UserCommand::Quit),
            _ => None,
        }
    }
}

/// Forwards parsed commands from `input` until it ends or the receiver goes
/// away. End of input is reported as [`UserCommand::Quit`]. Blocks, so it
/// must run off the async runtime.
pub fn read_commands<R: BufRead>(input: R, tx: mpsc::Sender<UserCommand>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("Error reading commands: {:?}", err);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match UserCommand::parse(&line) {
            Some(command) => {
                if tx.blocking_send(command).is_err() {
                    debug!("Tracker gone, no longer reading commands");
                    return;
                }
            }
            None => warn!("Unknown command {:?} (use m, d, c or q)", line.trim()),
        }
    }
    let _ = tx.blocking_send(UserCommand::Quit);
}

/// Reads stdin on a detached thread so a pending read never holds up exit.
pub fn spawn_stdin_reader(tx: mpsc::Sender<UserCommand>) {
    std::thread::spawn(move || read_commands(std::io::stdin().lock(), tx));
}
