//! Console control surface.
//!
//! Reads commands from stdin and applies them to the shared monitor state.

use anyhow::{anyhow, Result};
use camwatch::prelude::v1::{AlertPosition, MonitorHandle, PositionStore};
use log::*;
use std::io::BufRead;
use std::sync::mpsc::{channel, Receiver};
use std::thread::spawn;

pub const HELP: &str = "commands: pause | resume | toggle | move <x> <y> | where | quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Toggle,
    Move(AlertPosition),
    Where,
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();

        let cmd = match words.next().map(str::to_ascii_lowercase).as_deref() {
            Some("pause") => Self::Pause,
            Some("resume") => Self::Resume,
            Some("toggle") | Some("p") => Self::Toggle,
            Some("move") => {
                let mut coord = || -> Result<i32> {
                    Ok(words
                        .next()
                        .ok_or_else(|| anyhow!("usage: move <x> <y>"))?
                        .parse()?)
                };
                let x = coord()?;
                let y = coord()?;
                Self::Move(AlertPosition::new(x, y))
            }
            Some("where") => Self::Where,
            Some("help") | Some("?") => Self::Help,
            Some("quit") | Some("exit") | Some("q") => Self::Quit,
            Some(other) => return Err(anyhow!("unknown command {:?}", other)),
            None => return Err(anyhow!("empty command")),
        };

        Ok(cmd)
    }
}

/// Owner of the writable side of the monitor's shared state.
pub struct ControlSurface {
    handle: MonitorHandle,
    store: PositionStore,
}

impl ControlSurface {
    pub fn new(handle: MonitorHandle, store: PositionStore) -> Self {
        Self { handle, store }
    }

    /// Apply a command, returning a line of feedback for the user.
    pub fn apply(&mut self, cmd: Command) -> Result<String> {
        let reply = match cmd {
            Command::Pause => {
                self.handle.set_paused(true);
                "paused".to_string()
            }
            Command::Resume => {
                self.handle.set_paused(false);
                "monitoring".to_string()
            }
            Command::Toggle => {
                if self.handle.toggle_paused() {
                    "paused".to_string()
                } else {
                    "monitoring".to_string()
                }
            }
            Command::Move(position) => {
                self.store.save(position)?;
                self.handle.set_position(position);
                info!("Preview position set to ({}, {})", position.x, position.y);
                format!("preview at ({}, {})", position.x, position.y)
            }
            Command::Where => {
                let AlertPosition { x, y } = self.handle.position();
                format!(
                    "preview at ({}, {}), {}",
                    x,
                    y,
                    if self.handle.is_paused() {
                        "paused"
                    } else {
                        "monitoring"
                    }
                )
            }
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.handle.stop();
                "stopping".to_string()
            }
        };

        Ok(reply)
    }
}

/// Forward stdin lines over a channel.
///
/// The channel disconnects once stdin is closed.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel();

    spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!("pause".parse::<Command>().unwrap(), Command::Pause);
        assert_eq!(" Toggle ".parse::<Command>().unwrap(), Command::Toggle);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "move 100 -20".parse::<Command>().unwrap(),
            Command::Move(AlertPosition::new(100, -20))
        );
    }

    #[test]
    fn reject_bad_commands() {
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
        assert!("move 10".parse::<Command>().is_err());
        assert!("move ten 20".parse::<Command>().is_err());
    }

    #[test]
    fn commands_drive_shared_state() {
        let mut path = std::env::temp_dir();
        path.push(format!("camwatch-control-{}.json", std::process::id()));

        let handle = MonitorHandle::default();
        let store = PositionStore::new(&path);
        let mut surface = ControlSurface::new(handle.clone(), store.clone());

        surface.apply(Command::Toggle).unwrap();
        assert!(handle.is_paused());
        surface.apply(Command::Resume).unwrap();
        assert!(!handle.is_paused());

        surface
            .apply(Command::Move(AlertPosition::new(300, 400)))
            .unwrap();
        assert_eq!(handle.position(), AlertPosition::new(300, 400));
        assert_eq!(store.load(), AlertPosition::new(300, 400));

        surface.apply(Command::Quit).unwrap();
        assert!(!handle.is_running());

        std::fs::remove_file(&path).unwrap();
    }
}
