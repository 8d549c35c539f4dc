//! Shared mutable context threaded through every FSM handler.
//!
//! `MonitorContext` is the single struct that state handlers read from and
//! write to.  It holds the run flags and counters, the latest amplitude
//! sample, the configuration, and the queue of side effects the handlers
//! request.  Handlers never touch a port directly: they push [`Effect`]s and
//! the service executes them in order after the handler returns.

use heapless::Vec;
use log::warn;

use crate::config::MonitorConfig;
use crate::scheduler::TaskId;

/// Upper bound on effects produced by a single dispatch (tick + transition).
pub const MAX_EFFECTS: usize = 8;

// ---------------------------------------------------------------------------
// Display status
// ---------------------------------------------------------------------------

/// Status line shown by the display sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Monitoring,
    Paused,
    Stopped,
    Alarm,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monitoring => "monitoring...",
            Self::Paused => "paused...",
            Self::Stopped => "stopped...",
            Self::Alarm => "alarm!",
        }
    }
}

// ---------------------------------------------------------------------------
// Effects (written by state handlers; executed by the service)
// ---------------------------------------------------------------------------

/// A side effect requested by a state handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Start the amplitude source.
    StartSensor,
    /// Stop the amplitude source (idempotent).
    StopSensor,
    /// Take the wake lock unless already held.
    AcquireWakeLock,
    /// Drop the wake lock if held.
    ReleaseWakeLock,
    /// Push a status line and level to the display.
    Display { status: Status, level: f32 },
    /// Post a deferred task.
    Schedule { task: TaskId, delay_ms: u64 },
    /// Cancel the pending poll tick and the pending resume.
    CancelAll,
}

// ---------------------------------------------------------------------------
// Alert state snapshot
// ---------------------------------------------------------------------------

/// Point-in-time view of the loop's flags, counters and thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertState {
    pub running: bool,
    pub auto_resume: bool,
    pub tick_count: u32,
    pub hit_count: u32,
    pub threshold: f32,
    pub poll_delay_secs: u32,
}

// ---------------------------------------------------------------------------
// MonitorContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct MonitorContext {
    // -- Flags --
    /// Monitoring has been requested and not yet stopped.
    pub running: bool,
    /// Restart automatically when brought back to the foreground.
    pub auto_resume: bool,

    // -- Counters (reset only on (re)start) --
    /// Ticks polled since the last start.
    pub tick_count: u32,
    /// Ticks whose sample exceeded the threshold since the last start.
    pub hit_count: u32,

    // -- Sensor data --
    /// Latest amplitude sample.  Written before each poll tick.
    pub sample: f32,

    // -- Configuration --
    pub config: MonitorConfig,

    // -- Outputs --
    effects: Vec<Effect, MAX_EFFECTS>,
}

impl MonitorContext {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            running: false,
            auto_resume: false,
            tick_count: 0,
            hit_count: 0,
            sample: 0.0,
            config,
            effects: Vec::new(),
        }
    }

    /// Queue a side effect for the service to execute.
    pub fn push(&mut self, effect: Effect) {
        if self.effects.push(effect).is_err() {
            warn!("MonitorContext: effect queue full, dropping {:?}", effect);
        }
    }

    /// Take every queued effect, leaving the queue empty.
    pub fn take_effects(&mut self) -> Vec<Effect, MAX_EFFECTS> {
        core::mem::take(&mut self.effects)
    }

    /// Discard queued effects without executing them.
    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Reset both counters: the only place they go back to zero.
    pub fn reset_counters(&mut self) {
        self.tick_count = 0;
        self.hit_count = 0;
    }

    /// Whether the latest sample counts as a hit.
    pub fn sample_is_hit(&self) -> bool {
        self.sample > self.config.threshold
    }

    pub fn alert_state(&self) -> AlertState {
        AlertState {
            running: self.running,
            auto_resume: self.auto_resume,
            tick_count: self.tick_count,
            hit_count: self.hit_count,
            threshold: self.config.threshold,
            poll_delay_secs: self.config.poll_delay_secs,
        }
    }
}
