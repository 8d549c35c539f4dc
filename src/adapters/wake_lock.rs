//! Simulated wake lock.
//!
//! Models a reference-counted platform lock: every `acquire` bumps the
//! count and every `release` drops it.  Releasing an unheld lock is a
//! caller bug and is logged rather than wrapping the counter.

use log::{debug, warn};

use crate::app::ports::WakeLock;

#[derive(Debug, Default)]
pub struct SimWakeLock {
    holds: u32,
    acquisitions: u32,
}

impl SimWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding holds.
    pub fn holds(&self) -> u32 {
        self.holds
    }

    /// Lifetime acquire count.
    pub fn acquisitions(&self) -> u32 {
        self.acquisitions
    }
}

impl WakeLock for SimWakeLock {
    fn is_held(&self) -> bool {
        self.holds > 0
    }

    fn acquire(&mut self) {
        self.holds = self.holds.saturating_add(1);
        self.acquisitions = self.acquisitions.saturating_add(1);
        debug!("wake lock acquired (holds={})", self.holds);
    }

    fn release(&mut self) {
        if self.holds == 0 {
            warn!("wake lock released while not held");
            return;
        }
        self.holds -= 1;
        debug!("wake lock released (holds={})", self.holds);
    }
}
