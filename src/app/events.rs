//! Outbound application events.
//!
//! The [`AlertLoop`](super::service::AlertLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::SensorError;
use crate::fsm::StateId;

/// Structured events emitted by the alert loop.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// One poll tick completed.
    Sample(TelemetryData),

    /// The loop moved between states (including a restart of `Polling`).
    StateChanged { from: StateId, to: StateId },

    /// Too many ticks exceeded the threshold; polling has ceased.
    Alarm { hits: u32, amplitude: f32 },

    /// The amplitude source refused to start.
    SensorFault(SensorError),

    /// A remote command was received but had no effect.
    CommandIgnored(String),

    /// Configuration replaced at runtime.
    ConfigUpdated,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: StateId,
    pub amplitude: f32,
    pub threshold: f32,
    pub tick_count: u32,
    pub hit_count: u32,
    pub running: bool,
}
