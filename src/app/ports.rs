//! Port traits: the hexagonal boundary between the alert loop and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlertLoop (domain)
//! ```
//!
//! Driven adapters (microphone, display, wake lock, event sinks, settings
//! storage) implement these traits.  The [`AlertLoop`](super::service::AlertLoop)
//! consumes them via generics at each call site, so the domain core never
//! touches a device directly.

use crate::config::MonitorConfig;
use crate::error::{ConfigError, SensorError};

// ───────────────────────────────────────────────────────────────
// Amplitude source (driven adapter: microphone → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain amplitude samples.
pub trait AmplitudeSource {
    /// Begin capturing.  Fails with [`SensorError::InvalidState`] or
    /// [`SensorError::Io`].
    fn start(&mut self) -> Result<(), SensorError>;

    /// Stop capturing.  Must be idempotent.
    fn stop(&mut self);

    /// Current amplitude (non-negative).  Non-blocking; called on the same
    /// thread as the poll tick.
    fn amplitude(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Display sink (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the status line and the level meter.
pub trait DisplaySink {
    /// Replace the status text.
    fn set_status(&mut self, status: &str);

    /// Render the current amplitude against the configured threshold.
    fn set_level(&mut self, level: f32, threshold: f32);
}

// ───────────────────────────────────────────────────────────────
// Wake lock (driven adapter: domain → power management)
// ───────────────────────────────────────────────────────────────

/// Keeps the device awake while monitoring is active.
///
/// The underlying platform lock is reference counted; callers check
/// [`is_held`](Self::is_held) before every acquire and release so the
/// two calls stay balanced.
pub trait WakeLock {
    fn is_held(&self) -> bool;
    fn acquire(&mut self);
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Platform bundle
// ───────────────────────────────────────────────────────────────

/// Everything the alert loop drives on each transition.  Taking one
/// `&mut impl Platform` avoids juggling three mutable borrows at every
/// call site while keeping the port boundary explicit.
pub trait Platform: AmplitudeSource + DisplaySink + WakeLock {}

impl<T: AmplitudeSource + DisplaySink + WakeLock> Platform for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`MonitorEvent`](super::events::MonitorEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::MonitorEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ settings file)
// ───────────────────────────────────────────────────────────────

/// Loads monitor configuration.
///
/// Implementations MUST run [`MonitorConfig::validate`] and reject bad
/// values with [`ConfigError::ValidationFailed`] instead of clamping.
pub trait ConfigPort {
    fn load(&self) -> Result<MonitorConfig, ConfigError>;
}
