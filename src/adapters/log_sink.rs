//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured monitor events to the
//! `log` facade.  An SMS or push-notification adapter would implement the
//! same trait.

use log::{debug, info, warn};

use crate::app::events::MonitorEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`MonitorEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    alarms: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alarms seen so far.
    pub fn alarms(&self) -> u32 {
        self.alarms
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MonitorEvent) {
        match event {
            MonitorEvent::Sample(t) => {
                debug!(
                    "SAMPLE | state={:?} | amp={:.2}/{:.2} | tick={} hits={} | running={}",
                    t.state, t.amplitude, t.threshold, t.tick_count, t.hit_count, t.running,
                );
            }
            MonitorEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            MonitorEvent::Alarm { hits, amplitude } => {
                self.alarms = self.alarms.saturating_add(1);
                warn!("ALARM | hits={} last_amp={:.2}", hits, amplitude);
            }
            MonitorEvent::SensorFault(e) => {
                warn!("FAULT | amplitude source: {}", e);
            }
            MonitorEvent::CommandIgnored(cmd) => {
                debug!("REMOTE | ignored {:?}", cmd);
            }
            MonitorEvent::ConfigUpdated => {
                info!("CONFIG | updated");
            }
        }
    }
}
