//! Platform adapter: bundles the three devices the alert loop drives.
//!
//! Owns the [`SoundMeter`], the console display and the wake lock, and
//! exposes them through [`AmplitudeSource`], [`DisplaySink`] and
//! [`WakeLock`] by plain delegation.  This is the only place the binary
//! wires concrete devices together.

use crate::adapters::console_display::ConsoleDisplay;
use crate::adapters::wake_lock::SimWakeLock;
use crate::app::ports::{AmplitudeSource, DisplaySink, WakeLock};
use crate::error::SensorError;
use crate::sensors::SoundMeter;

pub struct HostPlatform {
    meter: SoundMeter,
    display: ConsoleDisplay,
    wake: SimWakeLock,
}

impl HostPlatform {
    pub fn new(meter: SoundMeter, display: ConsoleDisplay, wake: SimWakeLock) -> Self {
        Self {
            meter,
            display,
            wake,
        }
    }

    /// Push a new `amplitude_scale` down to the meter.
    pub fn set_amplitude_scale(&mut self, amplitude_scale: f32) {
        self.meter.set_scale(amplitude_scale);
    }

    pub fn meter(&self) -> &SoundMeter {
        &self.meter
    }

    pub fn display(&self) -> &ConsoleDisplay {
        &self.display
    }

    pub fn wake_lock(&self) -> &SimWakeLock {
        &self.wake
    }
}

// ── AmplitudeSource ───────────────────────────────────────────

impl AmplitudeSource for HostPlatform {
    fn start(&mut self) -> Result<(), SensorError> {
        self.meter.start()
    }

    fn stop(&mut self) {
        self.meter.stop();
    }

    fn amplitude(&mut self) -> f32 {
        self.meter.amplitude()
    }
}

// ── DisplaySink ───────────────────────────────────────────────

impl DisplaySink for HostPlatform {
    fn set_status(&mut self, status: &str) {
        self.display.set_status(status);
    }

    fn set_level(&mut self, level: f32, threshold: f32) {
        self.display.set_level(level, threshold);
    }
}

// ── WakeLock ──────────────────────────────────────────────────

impl WakeLock for HostPlatform {
    fn is_held(&self) -> bool {
        self.wake.is_held()
    }

    fn acquire(&mut self) {
        self.wake.acquire();
    }

    fn release(&mut self) {
        self.wake.release();
    }
}
