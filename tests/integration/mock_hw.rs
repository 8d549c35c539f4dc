//! Mock platform for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without a microphone, a screen or a power manager.

use std::collections::VecDeque;

use noisealert::app::events::MonitorEvent;
use noisealert::app::ports::{AmplitudeSource, DisplaySink, EventSink, WakeLock};
use noisealert::error::SensorError;
use noisealert::fsm::StateId;

// ── Platform call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Start,
    Stop,
    Acquire,
    Release,
    Status(String),
    Level { level: f32, threshold: f32 },
}

// ── MockPlatform ──────────────────────────────────────────────

/// Scripted amplitude source, recording display and counting wake lock.
///
/// Samples are served from `script` in order; once it runs dry every
/// reading returns `fallback`.
pub struct MockPlatform {
    pub calls: Vec<PlatformCall>,
    pub script: VecDeque<f32>,
    pub fallback: f32,
    /// When set, the next `start` fails with this error.
    pub fail_start: Option<SensorError>,
    pub capturing: bool,
    pub holds: u32,
    /// Highest hold count ever observed.
    pub max_holds: u32,
    /// `release` calls made while nothing was held.
    pub unbalanced_releases: u32,
    /// `start` calls made while already capturing.
    pub double_starts: u32,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            fallback: 0.0,
            fail_start: None,
            capturing: false,
            holds: 0,
            max_holds: 0,
            unbalanced_releases: 0,
            double_starts: 0,
            reads: 0,
        }
    }

    /// Every reading returns `amplitude`.
    pub fn constant(amplitude: f32) -> Self {
        Self {
            fallback: amplitude,
            ..Self::new()
        }
    }

    pub fn scripted(samples: &[f32]) -> Self {
        Self {
            script: samples.iter().copied().collect(),
            ..Self::new()
        }
    }

    pub fn last_status(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|c| match c {
            PlatformCall::Status(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn last_level(&self) -> Option<(f32, f32)> {
        self.calls.iter().rev().find_map(|c| match c {
            PlatformCall::Level { level, threshold } => Some((*level, *threshold)),
            _ => None,
        })
    }

    pub fn count(&self, call: &PlatformCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl AmplitudeSource for MockPlatform {
    fn start(&mut self) -> Result<(), SensorError> {
        self.calls.push(PlatformCall::Start);
        if let Some(e) = self.fail_start.take() {
            return Err(e);
        }
        if self.capturing {
            self.double_starts += 1;
            return Err(SensorError::InvalidState);
        }
        self.capturing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.push(PlatformCall::Stop);
        self.capturing = false;
    }

    fn amplitude(&mut self) -> f32 {
        self.reads += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

impl DisplaySink for MockPlatform {
    fn set_status(&mut self, status: &str) {
        self.calls.push(PlatformCall::Status(status.to_string()));
    }

    fn set_level(&mut self, level: f32, threshold: f32) {
        self.calls.push(PlatformCall::Level { level, threshold });
    }
}

impl WakeLock for MockPlatform {
    fn is_held(&self) -> bool {
        self.holds > 0
    }

    fn acquire(&mut self) {
        self.calls.push(PlatformCall::Acquire);
        self.holds += 1;
        self.max_holds = self.max_holds.max(self.holds);
    }

    fn release(&mut self) {
        self.calls.push(PlatformCall::Release);
        if self.holds == 0 {
            self.unbalanced_releases += 1;
        } else {
            self.holds -= 1;
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink that keeps everything it was given.
pub struct RecordingSink {
    pub events: Vec<MonitorEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn samples(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MonitorEvent::Sample(_)))
            .count()
    }

    pub fn alarms(&self) -> Vec<(u32, f32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::Alarm { hits, amplitude } => Some((*hits, *amplitude)),
                _ => None,
            })
            .collect()
    }

    pub fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn ignored(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::CommandIgnored(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &MonitorEvent) {
        self.events.push(event.clone());
    }
}
