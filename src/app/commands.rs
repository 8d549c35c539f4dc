//! Inbound commands to the alert loop.
//!
//! These represent actions requested by the outside world (the user's
//! start/stop control, the remote text channel, lifecycle callbacks) that
//! the [`AlertLoop`](super::service::AlertLoop) interprets and acts upon.

use core::str::FromStr;

use crate::config::MonitorConfig;

/// Commands accepted over the remote channel.
///
/// The wire form is the exact lower-case literal; anything else is not a
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Start,
    Stop,
}

impl RemoteCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Error for strings that are not a remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand;

impl FromStr for RemoteCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            _ => Err(UnknownCommand),
        }
    }
}

/// Commands that adapters can send into the alert loop.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// The single user control: start when stopped, stop when running.
    Toggle,

    /// Raw text received on the remote channel.
    Remote(String),

    /// The host brought the monitor back to the foreground.
    Foreground,

    /// The host is sending the monitor to the background / tearing it down.
    Background,

    /// Hot-reload configuration.
    UpdateConfig(MonitorConfig),
}
