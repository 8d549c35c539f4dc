//! Integration tests for the AlertLoop → FSM → platform pipeline.
//!
//! Time is virtual: tests hand `now_ms` to every call and step from one
//! deadline to the next, so a 30 s sleep cycle runs in microseconds.

use crate::mock_hw::{MockPlatform, PlatformCall, RecordingSink};

use noisealert::app::commands::AppCommand;
use noisealert::app::events::MonitorEvent;
use noisealert::app::service::AlertLoop;
use noisealert::config::MonitorConfig;
use noisealert::error::{Error, SensorError};
use noisealert::fsm::StateId;
use noisealert::scheduler::TaskId;

fn make_app(config: MonitorConfig) -> (AlertLoop, RecordingSink) {
    (AlertLoop::new(config), RecordingSink::new())
}

/// Run every deadline up to and including `until`.  Returns the time of
/// the last task that ran (or `from` if none did).
fn advance(
    app: &mut AlertLoop,
    hw: &mut MockPlatform,
    sink: &mut RecordingSink,
    from: u64,
    until: u64,
) -> u64 {
    let mut now = from;
    while let Some(due) = app.next_deadline() {
        if due > until {
            break;
        }
        now = due;
        app.run_due(now, hw, sink).unwrap();
    }
    now
}

fn sleepy_config() -> MonitorConfig {
    MonitorConfig {
        poll_delay_secs: 3,
        ..MonitorConfig::default()
    }
}

// ── Start ─────────────────────────────────────────────────────

#[test]
fn start_acquires_everything_and_schedules_first_tick() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.start(1_000, &mut hw, &mut sink).unwrap();

    assert_eq!(app.state(), StateId::Polling);
    assert!(hw.capturing);
    assert_eq!(hw.holds, 1);
    assert_eq!(app.next_deadline(), Some(1_300));
    assert!(app.is_pending(TaskId::Poll));
    assert_eq!(app.toggle_label(), "Stop");

    let st = app.alert_state();
    assert!(st.running);
    assert!(st.auto_resume);
    assert_eq!(st.tick_count, 0);
    assert_eq!(st.hit_count, 0);
    assert_eq!(sink.transitions(), vec![(StateId::Stopped, StateId::Polling)]);
}

#[test]
fn start_while_running_is_a_no_op() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(6.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 600);
    app.start(600, &mut hw, &mut sink).unwrap();

    assert_eq!(hw.count(&PlatformCall::Start), 1);
    assert_eq!(app.alert_state().hit_count, 2);
    assert_eq!(app.next_deadline(), Some(900));
}

#[test]
fn counters_reset_on_every_start() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(9.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    let now = advance(&mut app, &mut hw, &mut sink, 0, 900);
    assert_eq!(app.alert_state().tick_count, 3);
    assert_eq!(app.alert_state().hit_count, 3);

    app.stop(&mut hw, &mut sink);
    app.start(now, &mut hw, &mut sink).unwrap();

    let st = app.alert_state();
    assert_eq!(st.tick_count, 0);
    assert_eq!(st.hit_count, 0);
}

// ── Ticks ─────────────────────────────────────────────────────

#[test]
fn each_tick_displays_the_sample_and_reschedules() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::scripted(&[1.5, 2.5]);

    app.start(0, &mut hw, &mut sink).unwrap();
    assert_eq!(app.run_due(300, &mut hw, &mut sink).unwrap(), 1);

    assert_eq!(hw.last_status(), Some("monitoring..."));
    assert_eq!(hw.last_level(), Some((1.5, 5.0)));
    assert_eq!(app.next_deadline(), Some(600));
    assert_eq!(sink.samples(), 1);

    app.run_due(600, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.last_level(), Some((2.5, 5.0)));
    assert_eq!(app.alert_state().tick_count, 2);
}

#[test]
fn no_tick_runs_before_its_deadline() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.start(0, &mut hw, &mut sink).unwrap();
    assert_eq!(app.run_due(299, &mut hw, &mut sink).unwrap(), 0);
    assert_eq!(hw.reads, 0);
}

#[test]
fn a_late_wakeup_runs_a_single_tick() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.start(0, &mut hw, &mut sink).unwrap();
    assert_eq!(app.run_due(5_000, &mut hw, &mut sink).unwrap(), 1);
    assert_eq!(app.next_deadline(), Some(5_300));
}

#[test]
fn sample_equal_to_threshold_is_not_a_hit() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(5.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 300 * 20);

    assert_eq!(app.state(), StateId::Polling);
    assert_eq!(app.alert_state().hit_count, 0);
    assert_eq!(app.alert_state().tick_count, 20);
}

// ── Alarm ─────────────────────────────────────────────────────

#[test]
fn alarm_fires_on_the_sixth_excess_sample() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(6.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 1_500);
    assert_eq!(app.state(), StateId::Polling);
    assert_eq!(app.alert_state().hit_count, 5);
    assert!(sink.alarms().is_empty());

    app.run_due(1_800, &mut hw, &mut sink).unwrap();

    assert_eq!(app.state(), StateId::Alarmed);
    assert_eq!(sink.alarms(), vec![(6, 6.0)]);
    assert_eq!(app.next_deadline(), None, "polling must cease after the alarm");
    assert!(!hw.capturing);
    assert_eq!(hw.last_status(), Some("alarm!"));
}

#[test]
fn hits_need_not_be_consecutive() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::scripted(&[
        6.0, 0.0, 6.0, 0.0, 6.0, 0.0, 6.0, 0.0, 6.0, 0.0, 6.0,
    ]);

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 300 * 10);
    assert_eq!(app.state(), StateId::Polling);

    app.run_due(300 * 11, &mut hw, &mut sink).unwrap();
    assert_eq!(app.state(), StateId::Alarmed);
    assert_eq!(sink.alarms().len(), 1);
}

#[test]
fn alarm_keeps_the_wake_lock_until_stop() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(50.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    let now = advance(&mut app, &mut hw, &mut sink, 0, 10_000);

    assert_eq!(app.state(), StateId::Alarmed);
    assert_eq!(hw.holds, 1);
    assert!(app.alert_state().running);
    assert_eq!(app.toggle_label(), "Stop");

    app.toggle(now, &mut hw, &mut sink).unwrap();
    assert_eq!(app.state(), StateId::Stopped);
    assert_eq!(hw.holds, 0);
    assert_eq!(hw.unbalanced_releases, 0);
}

// ── Auto-pause / resume ───────────────────────────────────────

#[test]
fn never_sleeps_when_poll_delay_is_zero() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 300 * 250);

    assert_eq!(app.state(), StateId::Polling);
    assert_eq!(app.alert_state().tick_count, 250);
    assert!(!app.is_pending(TaskId::Resume));
}

#[test]
fn sleeps_after_tick_101_then_restarts_after_the_delay() {
    let (mut app, mut sink) = make_app(sleepy_config());
    let mut hw = MockPlatform::new();

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 300 * 100);
    assert_eq!(app.state(), StateId::Polling);
    assert_eq!(app.alert_state().tick_count, 100);

    app.run_due(300 * 101, &mut hw, &mut sink).unwrap();
    assert_eq!(app.state(), StateId::Sleeping);
    assert_eq!(hw.last_status(), Some("paused..."));
    assert_eq!(hw.last_level(), Some((0.0, 5.0)));
    assert!(!hw.capturing);
    assert!(!app.is_pending(TaskId::Poll));
    assert_eq!(app.next_deadline(), Some(30_300 + 3_000));

    assert_eq!(app.run_due(33_299, &mut hw, &mut sink).unwrap(), 0);
    app.run_due(33_300, &mut hw, &mut sink).unwrap();

    assert_eq!(app.state(), StateId::Polling);
    let st = app.alert_state();
    assert_eq!(st.tick_count, 0);
    assert_eq!(st.hit_count, 0);
    assert!(hw.capturing);
    assert_eq!(hw.double_starts, 0);
    assert_eq!(app.next_deadline(), Some(33_600));
}

#[test]
fn hits_are_forgotten_across_a_sleep_cycle() {
    let (mut app, mut sink) = make_app(sleepy_config());
    let mut script = vec![6.0; 5];
    script.extend(std::iter::repeat_n(0.0, 96));
    script.extend([6.0; 5]);
    let mut hw = MockPlatform::scripted(&script);

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 100_000);

    assert!(sink.alarms().is_empty());
    assert_eq!(app.alert_state().hit_count, 0);
}

#[test]
fn stop_during_sleep_cancels_the_resume() {
    let (mut app, mut sink) = make_app(sleepy_config());
    let mut hw = MockPlatform::new();

    app.start(0, &mut hw, &mut sink).unwrap();
    let now = advance(&mut app, &mut hw, &mut sink, 0, 300 * 101);
    assert_eq!(app.state(), StateId::Sleeping);

    app.stop(&mut hw, &mut sink);
    assert_eq!(app.next_deadline(), None);
    assert_eq!(app.run_due(now + 60_000, &mut hw, &mut sink).unwrap(), 0);
    assert_eq!(app.state(), StateId::Stopped);
    assert_eq!(hw.holds, 0);
}

// ── Stop ──────────────────────────────────────────────────────

#[test]
fn nothing_fires_after_stop() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(3.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 900);
    app.stop(&mut hw, &mut sink);
    let reads = hw.reads;
    sink.clear();

    assert_eq!(app.next_deadline(), None);
    assert_eq!(app.run_due(1_000_000, &mut hw, &mut sink).unwrap(), 0);
    assert_eq!(hw.reads, reads);
    assert_eq!(sink.samples(), 0);
    assert_eq!(hw.last_status(), Some("stopped..."));
    assert!(!app.alert_state().auto_resume);
}

#[test]
fn start_stop_cycles_keep_the_wake_lock_balanced() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    for i in 0..4 {
        app.toggle(i * 1_000, &mut hw, &mut sink).unwrap();
        app.toggle(i * 1_000 + 500, &mut hw, &mut sink).unwrap();
    }

    assert_eq!(hw.count(&PlatformCall::Acquire), 4);
    assert_eq!(hw.count(&PlatformCall::Release), 4);
    assert_eq!(hw.max_holds, 1);
    assert_eq!(hw.unbalanced_releases, 0);
    assert_eq!(hw.holds, 0);
}

#[test]
fn stop_while_stopped_releases_nothing() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.stop(&mut hw, &mut sink);
    assert_eq!(hw.count(&PlatformCall::Release), 0);
    assert_eq!(app.state(), StateId::Stopped);
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_start_and_stop_act_like_the_control() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.receive("start", 0, &mut hw, &mut sink).unwrap();
    assert_eq!(app.state(), StateId::Polling);
    assert!(app.alert_state().auto_resume);

    app.receive("stop", 100, &mut hw, &mut sink).unwrap();
    assert_eq!(app.state(), StateId::Stopped);
    assert!(!app.alert_state().auto_resume);
}

#[test]
fn redundant_remote_commands_are_no_ops() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.receive("stop", 0, &mut hw, &mut sink).unwrap();
    assert!(hw.calls.is_empty());

    app.receive("start", 0, &mut hw, &mut sink).unwrap();
    hw.clear_calls();
    app.receive("start", 10, &mut hw, &mut sink).unwrap();
    assert!(hw.calls.is_empty());
    assert_eq!(app.next_deadline(), Some(300));

    assert_eq!(sink.ignored(), vec!["stop".to_string(), "start".to_string()]);
}

#[test]
fn unknown_remote_text_is_ignored() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    for text in ["Start", "STOP", " start", "hello", ""] {
        app.receive(text, 0, &mut hw, &mut sink).unwrap();
    }
    assert_eq!(app.state(), StateId::Stopped);
    assert!(hw.calls.is_empty());
    assert_eq!(sink.ignored().len(), 5);
}

#[test]
fn remote_text_routes_through_handle_command() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();

    app.handle_command(AppCommand::Remote("start".into()), 0, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.state(), StateId::Polling);
}

// ── Sensor failure ────────────────────────────────────────────

#[test]
fn start_failure_aborts_and_leaves_nothing_held() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::new();
    hw.fail_start = Some(SensorError::Io);

    let res = app.start(0, &mut hw, &mut sink);

    assert_eq!(res, Err(Error::Sensor(SensorError::Io)));
    assert_eq!(app.state(), StateId::Stopped);
    assert_eq!(hw.holds, 0);
    assert_eq!(hw.count(&PlatformCall::Acquire), 0);
    assert_eq!(app.next_deadline(), None);
    assert_eq!(app.toggle_label(), "Start");
    assert!(!app.alert_state().auto_resume);
    assert!(sink
        .events
        .contains(&MonitorEvent::SensorFault(SensorError::Io)));
    assert_eq!(hw.last_status(), Some("stopped..."));
}

#[test]
fn start_failure_can_be_tolerated() {
    let config = MonitorConfig {
        tolerate_sensor_failure: true,
        ..MonitorConfig::default()
    };
    let (mut app, mut sink) = make_app(config);
    let mut hw = MockPlatform::new();
    hw.fail_start = Some(SensorError::InvalidState);

    app.start(0, &mut hw, &mut sink).unwrap();

    assert_eq!(app.state(), StateId::Polling);
    assert_eq!(hw.holds, 1);
    assert!(app.is_pending(TaskId::Poll));
    assert!(sink
        .events
        .contains(&MonitorEvent::SensorFault(SensorError::InvalidState)));
}

#[test]
fn start_failure_on_resume_stops_the_loop() {
    let (mut app, mut sink) = make_app(sleepy_config());
    let mut hw = MockPlatform::new();

    app.start(0, &mut hw, &mut sink).unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 300 * 101);
    assert_eq!(app.state(), StateId::Sleeping);

    hw.fail_start = Some(SensorError::Io);
    let res = app.run_due(33_300, &mut hw, &mut sink);

    assert_eq!(res, Err(Error::Sensor(SensorError::Io)));
    assert_eq!(app.state(), StateId::Stopped);
    assert_eq!(hw.holds, 0);
    assert_eq!(app.next_deadline(), None);
}

// ── Config ────────────────────────────────────────────────────

#[test]
fn config_update_applies_from_the_next_tick() {
    let (mut app, mut sink) = make_app(MonitorConfig::default());
    let mut hw = MockPlatform::constant(6.0);

    app.start(0, &mut hw, &mut sink).unwrap();
    let raised = MonitorConfig {
        threshold: 10.0,
        ..MonitorConfig::default()
    };
    app.handle_command(AppCommand::UpdateConfig(raised), 0, &mut hw, &mut sink)
        .unwrap();
    advance(&mut app, &mut hw, &mut sink, 0, 300 * 20);

    assert_eq!(app.alert_state().hit_count, 0);
    assert_eq!(app.config().threshold, 10.0);
    assert!(sink.events.contains(&MonitorEvent::ConfigUpdated));
}
