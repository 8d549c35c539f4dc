//! Application service: the hexagonal core.
//!
//! [`AlertLoop`] owns the FSM, the shared context and the deferred task
//! queue.  It exposes the start / stop / receive / lifecycle API and
//! executes the [`Effect`]s the state handlers request.  All I/O flows
//! through port traits injected at call sites, making the whole loop
//! testable with mock adapters and an explicit clock.
//!
//! ```text
//!  AmplitudeSource ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                      │        AlertLoop         │
//!      DisplaySink ◀── │  FSM · TaskQueue · ctx   │
//!         WakeLock ◀── └─────────────────────────┘
//! ```
//!
//! Everything runs on one logical thread: the caller feeds commands and
//! calls [`AlertLoop::run_due`] when [`AlertLoop::next_deadline`] passes.

use log::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::error::{Result, SensorError};
use crate::fsm::context::{AlertState, Effect, MonitorContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::scheduler::{TaskId, TaskQueue};

use super::commands::{AppCommand, RemoteCommand};
use super::events::{MonitorEvent, TelemetryData};
use super::ports::{EventSink, Platform};

// ───────────────────────────────────────────────────────────────
// AlertLoop
// ───────────────────────────────────────────────────────────────

/// The noise alert loop.
pub struct AlertLoop {
    fsm: Fsm,
    ctx: MonitorContext,
    tasks: TaskQueue,
    /// Set by `apply_effects` when the source refuses to start.
    start_failure: Option<SensorError>,
    /// Poll ticks executed since construction.
    ticks_total: u64,
}

impl AlertLoop {
    /// Construct the loop in `Stopped`.  Nothing is touched until the first
    /// command.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Stopped),
            ctx: MonitorContext::new(config),
            tasks: TaskQueue::new(),
            start_failure: None,
            ticks_total: 0,
        }
    }

    // ── User / remote control ─────────────────────────────────

    /// Start monitoring.  No-op when already running.
    ///
    /// Fails only when the amplitude source refuses to start and
    /// `tolerate_sensor_failure` is off; the loop is then back in
    /// `Stopped` with nothing held.
    pub fn start(
        &mut self,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.ctx.running {
            debug!("AlertLoop: start ignored, already running");
            return Ok(());
        }
        self.ctx.auto_resume = true;
        self.ctx.running = true;
        self.start_polling(now_ms, io, sink)
    }

    /// Stop monitoring and forget the auto-resume request.
    /// Always cancels both pending tasks, whatever the current state.
    pub fn stop(&mut self, io: &mut impl Platform, sink: &mut impl EventSink) {
        self.ctx.auto_resume = false;
        self.switch_to(StateId::Stopped, 0, io, sink);
    }

    /// The single user control.
    pub fn toggle(
        &mut self,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.ctx.running {
            self.stop(io, sink);
            Ok(())
        } else {
            self.start(now_ms, io, sink)
        }
    }

    /// Label for the user control, reflecting the current `running` flag.
    pub fn toggle_label(&self) -> &'static str {
        if self.ctx.running { "Stop" } else { "Start" }
    }

    /// Handle text from the remote channel.  `"start"` while stopped and
    /// `"stop"` while running act like the user control; every other input
    /// is ignored.
    pub fn receive(
        &mut self,
        cmd: &str,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd.parse::<RemoteCommand>() {
            Ok(command @ RemoteCommand::Start) if !self.ctx.running => {
                info!("AlertLoop: remote {}", command.as_str());
                self.start(now_ms, io, sink)
            }
            Ok(command @ RemoteCommand::Stop) if self.ctx.running => {
                info!("AlertLoop: remote {}", command.as_str());
                self.stop(io, sink);
                Ok(())
            }
            _ => {
                debug!("AlertLoop: remote command {:?} ignored", cmd);
                sink.emit(&MonitorEvent::CommandIgnored(cmd.to_string()));
                Ok(())
            }
        }
    }

    // ── Host lifecycle ────────────────────────────────────────

    /// Back in the foreground: reset the meter and, if monitoring was
    /// requested before, restart it with fresh counters.
    pub fn on_foreground(
        &mut self,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        io.set_level(0.0, self.ctx.config.threshold);
        if !self.ctx.auto_resume {
            return Ok(());
        }
        info!("AlertLoop: auto-resuming");
        self.ctx.running = true;
        self.start_polling(now_ms, io, sink)
    }

    /// Leaving the foreground or tearing down: force a stop but keep the
    /// auto-resume request.
    pub fn on_background(&mut self, io: &mut impl Platform, sink: &mut impl EventSink) {
        self.switch_to(StateId::Stopped, 0, io, sink);
    }

    // ── Deferred work ─────────────────────────────────────────

    /// Run every task due at `now_ms`.  Returns how many ran.
    pub fn run_due(
        &mut self,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<usize> {
        let mut ran = 0;
        // A task never re-posts itself for the same instant, so one pass per
        // task kind drains everything that is due.
        for _ in 0..TaskId::COUNT {
            let Some(task) = self.tasks.pop_due(now_ms) else {
                break;
            };
            ran += 1;
            match task {
                TaskId::Poll => self.poll_tick(now_ms, io, sink),
                TaskId::Resume => self.resume(now_ms, io, sink)?,
            }
        }
        Ok(ran)
    }

    /// Earliest pending task deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.tasks.next_deadline()
    }

    pub fn is_pending(&self, task: TaskId) -> bool {
        self.tasks.is_pending(task)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an inbound command from any adapter.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::Toggle => self.toggle(now_ms, io, sink),
            AppCommand::Remote(text) => self.receive(&text, now_ms, io, sink),
            AppCommand::Foreground => self.on_foreground(now_ms, io, sink),
            AppCommand::Background => {
                self.on_background(io, sink);
                Ok(())
            }
            AppCommand::UpdateConfig(config) => {
                config.validate()?;
                self.ctx.config = config;
                sink.emit(&MonitorEvent::ConfigUpdated);
                info!("Configuration updated at runtime");
                Ok(())
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn alert_state(&self) -> AlertState {
        self.ctx.alert_state()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.ctx.config
    }

    /// Poll ticks executed since construction.
    pub fn ticks_total(&self) -> u64 {
        self.ticks_total
    }

    /// State transitions taken since construction, restarts included.
    pub fn transitions(&self) -> u64 {
        self.fsm.transitions()
    }

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            amplitude: self.ctx.sample,
            threshold: self.ctx.config.threshold,
            tick_count: self.ctx.tick_count,
            hit_count: self.ctx.hit_count,
            running: self.ctx.running,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_tick(&mut self, now_ms: u64, io: &mut impl Platform, sink: &mut impl EventSink) {
        let prev = self.fsm.current_state();
        if prev != StateId::Polling {
            debug!("AlertLoop: poll tick in {:?} dropped", prev);
            return;
        }

        self.ctx.sample = sanitize(io.amplitude());
        let next = self.fsm.tick(&mut self.ctx);
        self.ticks_total = self.ticks_total.wrapping_add(1);

        sink.emit(&MonitorEvent::Sample(self.build_telemetry()));
        if next != prev {
            sink.emit(&MonitorEvent::StateChanged {
                from: prev,
                to: next,
            });
            if next == StateId::Alarmed {
                sink.emit(&MonitorEvent::Alarm {
                    hits: self.ctx.hit_count,
                    amplitude: self.ctx.sample,
                });
            }
        }

        self.apply_effects(now_ms, io, sink);
    }

    fn resume(
        &mut self,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.fsm.current_state() != StateId::Sleeping {
            debug!("AlertLoop: stale resume in {:?} dropped", self.fsm.current_state());
            return Ok(());
        }
        info!("AlertLoop: pause over, restarting");
        self.start_polling(now_ms, io, sink)
    }

    /// Enter (or re-enter) `Polling`; roll back to `Stopped` if the source
    /// refuses to start.
    fn start_polling(
        &mut self,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if matches!(self.fsm.current_state(), StateId::Polling | StateId::Alarmed) {
            // Restarting a live loop: the source may still be capturing.
            io.stop();
        }
        self.switch_to(StateId::Polling, now_ms, io, sink);
        if let Some(e) = self.start_failure.take() {
            self.ctx.auto_resume = false;
            self.switch_to(StateId::Stopped, now_ms, io, sink);
            return Err(e.into());
        }
        Ok(())
    }

    fn switch_to(
        &mut self,
        next: StateId,
        now_ms: u64,
        io: &mut impl Platform,
        sink: &mut impl EventSink,
    ) {
        let prev = self.fsm.current_state();
        self.fsm.enter(next, &mut self.ctx);
        sink.emit(&MonitorEvent::StateChanged { from: prev, to: next });
        self.apply_effects(now_ms, io, sink);
    }

    /// Execute queued effects in order.
    fn apply_effects(&mut self, now_ms: u64, io: &mut impl Platform, sink: &mut impl EventSink) {
        let threshold = self.ctx.config.threshold;
        for effect in self.ctx.take_effects() {
            match effect {
                Effect::StartSensor => {
                    if let Err(e) = io.start() {
                        error!("AlertLoop: amplitude source failed to start: {}", e);
                        sink.emit(&MonitorEvent::SensorFault(e));
                        if !self.ctx.config.tolerate_sensor_failure {
                            self.start_failure = Some(e);
                            return;
                        }
                        warn!("AlertLoop: polling without a working amplitude source");
                    }
                }
                Effect::StopSensor => io.stop(),
                Effect::AcquireWakeLock => {
                    if !io.is_held() {
                        io.acquire();
                    }
                }
                Effect::ReleaseWakeLock => {
                    if io.is_held() {
                        io.release();
                    }
                }
                Effect::Display { status, level } => {
                    io.set_status(status.as_str());
                    io.set_level(level, threshold);
                }
                Effect::Schedule { task, delay_ms } => {
                    self.tasks.post_delayed(task, now_ms, delay_ms);
                }
                Effect::CancelAll => self.tasks.cancel_all(),
            }
        }
    }
}

/// Samples are non-negative; anything else reads as silence.
fn sanitize(sample: f32) -> f32 {
    if sample.is_finite() && sample > 0.0 {
        sample
    } else {
        0.0
    }
}
