//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch.  Handlers only mutate the [`MonitorContext`] and queue
//! [`Effect`]s; the service performs the actual port calls.
//!
//! ```text
//!  STOPPED ──[start]──▶ POLLING ◀──┐ [tick: reschedule]
//!     ▲                   │  │ └───┘
//!     │        [ticks > N]│  │[hits > max]
//!     │                   ▼  ▼
//!     │           SLEEPING   ALARMED
//!     │               │
//!     │               └──[resume: full restart]──▶ POLLING
//!     │
//!  Any state ──[stop]──▶ STOPPED
//! ```

use super::context::{Effect, MonitorContext, Status};
use super::{StateDescriptor, StateId};
use crate::scheduler::TaskId;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at construction.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Stopped
        StateDescriptor {
            name: "Stopped",
            on_enter: Some(stopped_enter),
            on_update: idle_update,
        },
        // Index 1: Polling
        StateDescriptor {
            name: "Polling",
            on_enter: Some(polling_enter),
            on_update: polling_update,
        },
        // Index 2: Sleeping
        StateDescriptor {
            name: "Sleeping",
            on_enter: Some(sleeping_enter),
            on_update: idle_update,
        },
        // Index 3: Alarmed
        StateDescriptor {
            name: "Alarmed",
            on_enter: Some(alarmed_enter),
            on_update: idle_update,
        },
    ]
}

/// Shared update for states that never poll.  A tick arriving here is
/// stale and is dropped without rescheduling.
fn idle_update(_ctx: &mut MonitorContext) -> Option<StateId> {
    debug!("FSM: stale poll tick ignored");
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPED state
// ═══════════════════════════════════════════════════════════════════════════

fn stopped_enter(ctx: &mut MonitorContext) {
    ctx.push(Effect::ReleaseWakeLock);
    ctx.push(Effect::CancelAll);
    ctx.push(Effect::StopSensor);
    ctx.push(Effect::Display {
        status: Status::Stopped,
        level: 0.0,
    });
    ctx.running = false;
    info!("STOPPED: monitoring halted");
}

// ═══════════════════════════════════════════════════════════════════════════
//  POLLING state: one amplitude sample per tick
// ═══════════════════════════════════════════════════════════════════════════

fn polling_enter(ctx: &mut MonitorContext) {
    ctx.reset_counters();
    // A restart can come from Sleeping with the resume still queued.
    ctx.push(Effect::CancelAll);
    ctx.push(Effect::StartSensor);
    ctx.push(Effect::AcquireWakeLock);
    ctx.push(Effect::Schedule {
        task: TaskId::Poll,
        delay_ms: u64::from(ctx.config.poll_interval_ms),
    });
    info!(
        "POLLING: threshold {:.1}, tick every {}ms",
        ctx.config.threshold, ctx.config.poll_interval_ms
    );
}

fn polling_update(ctx: &mut MonitorContext) -> Option<StateId> {
    ctx.push(Effect::Display {
        status: Status::Monitoring,
        level: ctx.sample,
    });

    if ctx.sample_is_hit() {
        ctx.hit_count = ctx.hit_count.saturating_add(1);
        debug!(
            "POLLING: hit {} ({:.1} > {:.1})",
            ctx.hit_count, ctx.sample, ctx.config.threshold
        );
        if ctx.hit_count > ctx.config.max_hits {
            return Some(StateId::Alarmed);
        }
    }

    ctx.tick_count = ctx.tick_count.saturating_add(1);

    if ctx.config.sleep_enabled() && ctx.tick_count > ctx.config.ticks_before_sleep {
        return Some(StateId::Sleeping);
    }

    ctx.push(Effect::Schedule {
        task: TaskId::Poll,
        delay_ms: u64::from(ctx.config.poll_interval_ms),
    });
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING state: sensor off until the resume task fires
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_enter(ctx: &mut MonitorContext) {
    ctx.push(Effect::StopSensor);
    ctx.push(Effect::Display {
        status: Status::Paused,
        level: 0.0,
    });
    ctx.push(Effect::Schedule {
        task: TaskId::Resume,
        delay_ms: ctx.config.poll_delay_ms(),
    });
    info!(
        "SLEEPING: {} quiet ticks, pausing for {}s",
        ctx.tick_count, ctx.config.poll_delay_secs
    );
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARMED state: too many hits; polling ends, wake lock stays held
// ═══════════════════════════════════════════════════════════════════════════

fn alarmed_enter(ctx: &mut MonitorContext) {
    ctx.push(Effect::StopSensor);
    ctx.push(Effect::Display {
        status: Status::Alarm,
        level: ctx.sample,
    });
    warn!(
        "ALARMED: {} hits above {:.1} (last {:.1}); polling halted until stop",
        ctx.hit_count, ctx.config.threshold, ctx.sample
    );
}
