//! Console input adapter.
//!
//! A dedicated reader thread turns stdin lines into [`ConsoleInput`]
//! messages on a static `embassy-sync` channel.  The control task awaits
//! the channel, so all monitor mutation stays on one thread.
//!
//! ```text
//! ┌──────────────┐  ConsoleInput  ┌──────────────┐
//! │ stdin thread │───────────────▶│ control task │
//! │  (blocking)  │                │   (async)    │
//! └──────────────┘                └──────────────┘
//! ```
//!
//! | Line              | Meaning                                 |
//! |-------------------|-----------------------------------------|
//! | `toggle`          | the start/stop control                  |
//! | `foreground`      | host resumed                            |
//! | `background`      | host paused / torn down                 |
//! | `level <x>`       | inject a simulated amplitude            |
//! | `reload`          | re-read the settings file               |
//! | `quit`, EOF       | shut down                               |
//! | anything else     | forwarded verbatim as a remote message  |

use std::io::BufRead;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Toggle,
    Foreground,
    Background,
    Level(f32),
    Reload,
    Quit,
    Remote(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        match trimmed {
            "toggle" => Self::Toggle,
            "foreground" => Self::Foreground,
            "background" => Self::Background,
            "reload" => Self::Reload,
            "quit" => Self::Quit,
            _ => match trimmed.strip_prefix("level ").map(|v| v.trim().parse::<f32>()) {
                Some(Ok(level)) => Self::Level(level),
                _ => Self::Remote(trimmed.to_string()),
            },
        }
    }
}

const INPUT_DEPTH: usize = 8;

/// Inbound channel: stdin thread → control task.
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, ConsoleInput, INPUT_DEPTH> =
    Channel::new();

/// Forward every line of `reader` into [`INPUT_CHANNEL`], then `Quit`.
///
/// Blocks while the channel is full; a remote text channel applies back
/// pressure the same way.
pub fn pump_lines(reader: impl BufRead) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("console: read failed: {}", e);
                break;
            }
        };
        let input = ConsoleInput::parse(&line);
        debug!("console: {:?}", input);
        let quit = input == ConsoleInput::Quit;
        futures_lite::future::block_on(INPUT_CHANNEL.send(input));
        if quit {
            return;
        }
    }
    futures_lite::future::block_on(INPUT_CHANNEL.send(ConsoleInput::Quit));
}

/// Spawn the stdin reader thread.
pub fn spawn_stdin_reader() -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console-in".into())
        .spawn(|| pump_lines(std::io::stdin().lock()))
}
