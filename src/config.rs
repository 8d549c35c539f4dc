//! Monitor configuration parameters
//!
//! All tunable parameters for the noise alert loop.
//! Values can be overridden from a JSON settings file or at runtime via
//! [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Detection ---
    /// Amplitude above which a tick counts as a hit
    pub threshold: f32,
    /// Hits tolerated before the alarm fires (alarm when `hits > max_hits`)
    pub max_hits: u32,

    // --- Timing ---
    /// Delay between two poll ticks (milliseconds)
    pub poll_interval_ms: u32,
    /// Pause length of the auto-pause cycle (seconds, 0 = never pause)
    pub poll_delay_secs: u32,
    /// Ticks to poll before pausing (pause when `ticks > ticks_before_sleep`)
    pub ticks_before_sleep: u32,

    // --- Sensor ---
    /// Divisor from raw peak PCM sample to amplitude units
    pub amplitude_scale: f32,
    /// Keep polling when the amplitude source fails to start
    pub tolerate_sensor_failure: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Detection
            threshold: 5.0,
            max_hits: 5,

            // Timing
            poll_interval_ms: 300,
            poll_delay_secs: 0,
            ticks_before_sleep: 100,

            // Sensor
            amplitude_scale: 2700.0,
            tolerate_sensor_failure: false,
        }
    }
}

impl MonitorConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "threshold must be a finite, non-negative number",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be greater than zero",
            ));
        }
        if !self.amplitude_scale.is_finite() || self.amplitude_scale <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "amplitude_scale must be a finite, positive number",
            ));
        }
        Ok(())
    }

    /// Pause length in milliseconds.
    pub fn poll_delay_ms(&self) -> u64 {
        u64::from(self.poll_delay_secs) * 1000
    }

    /// Whether the auto-pause/resume cycle is enabled at all.
    pub fn sleep_enabled(&self) -> bool {
        self.poll_delay_secs > 0
    }
}
