//! NoiseAlert: host entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HostPlatform        LogEventSink   FileConfigStore  Clock     │
//! │  (Source+Display     (EventSink)    (ConfigPort)               │
//! │   +WakeLock)         stdin thread ──▶ INPUT_CHANNEL            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AlertLoop (pure logic)                    │    │
//! │  │  FSM · TaskQueue                                       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `noisealert [config.json] [capture.pcm]`.  Without a capture
//! file the simulated meter is used; type `level <x>` to feed it.

#![deny(unused_must_use)]

use std::path::PathBuf;

use anyhow::Result;
use futures_lite::future;
use log::{error, info, warn};

use noisealert::adapters::config_file::FileConfigStore;
use noisealert::adapters::console::{spawn_stdin_reader, ConsoleInput, INPUT_CHANNEL};
use noisealert::adapters::console_display::ConsoleDisplay;
use noisealert::adapters::log_sink::LogEventSink;
use noisealert::adapters::platform::HostPlatform;
use noisealert::adapters::time::MonotonicClock;
use noisealert::adapters::wake_lock::SimWakeLock;
use noisealert::app::commands::AppCommand;
use noisealert::app::ports::ConfigPort;
use noisealert::app::service::AlertLoop;
use noisealert::config::MonitorConfig;
use noisealert::error::ConfigError;
use noisealert::sensors::{sim_set_amplitude, MeterBackend, SoundMeter};

// Links the std time driver that `async_io_mini::Timer` sleeps on.
use embassy_time as _;

const DEFAULT_CONFIG_PATH: &str = "noisealert.json";
const LOG_ENV: &str = "NOISEALERT_LOG";

/// What woke the control task.
enum Wake {
    Deadline,
    Input(ConsoleInput),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "info")).init();

    info!("NoiseAlert v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let capture = args.next().map(PathBuf::from);

    // ── Config ────────────────────────────────────────────────
    let store = FileConfigStore::new(&config_path);
    let config = match store.load() {
        Ok(cfg) => {
            info!("Config loaded from {}", config_path);
            cfg
        }
        Err(ConfigError::NotFound) => {
            warn!("No config at {}, writing defaults", config_path);
            let cfg = MonitorConfig::default();
            if let Err(e) = store.save(&cfg) {
                warn!("Could not seed {}: {}", config_path, e);
            }
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            MonitorConfig::default()
        }
    };

    // ── Adapters ──────────────────────────────────────────────
    let backend = match capture {
        Some(path) => MeterBackend::PcmFile(path),
        None => MeterBackend::Simulated,
    };
    let mut hw = HostPlatform::new(
        SoundMeter::new(backend, config.amplitude_scale),
        ConsoleDisplay::new(),
        SimWakeLock::new(),
    );
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut app = AlertLoop::new(config);

    let _reader = spawn_stdin_reader()?;
    info!("Commands: toggle | foreground | background | level <x> | reload | quit | <remote text>");

    // ── Control task ──────────────────────────────────────────
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    let control = executor.spawn(async {
        app.handle_command(AppCommand::Foreground, clock.now_ms(), &mut hw, &mut sink)?;

        loop {
            let wait = app.next_deadline().map(|deadline| clock.until(deadline));

            let wake = future::or(
                async {
                    match wait {
                        Some(d) => {
                            async_io_mini::Timer::after(d).await;
                        }
                        None => future::pending::<()>().await,
                    }
                    Wake::Deadline
                },
                async { Wake::Input(INPUT_CHANNEL.receive().await) },
            )
            .await;

            let now = clock.now_ms();
            let result = match wake {
                Wake::Deadline => app.run_due(now, &mut hw, &mut sink).map(|_| ()),
                Wake::Input(ConsoleInput::Quit) => {
                    app.on_background(&mut hw, &mut sink);
                    break;
                }
                Wake::Input(ConsoleInput::Level(level)) => {
                    sim_set_amplitude(level);
                    Ok(())
                }
                Wake::Input(ConsoleInput::Toggle) => {
                    app.handle_command(AppCommand::Toggle, now, &mut hw, &mut sink)
                }
                Wake::Input(ConsoleInput::Foreground) => {
                    app.handle_command(AppCommand::Foreground, now, &mut hw, &mut sink)
                }
                Wake::Input(ConsoleInput::Background) => {
                    app.handle_command(AppCommand::Background, now, &mut hw, &mut sink)
                }
                Wake::Input(ConsoleInput::Reload) => match store.load() {
                    Ok(cfg) => app
                        .handle_command(AppCommand::UpdateConfig(cfg), now, &mut hw, &mut sink)
                        .map(|()| hw.set_amplitude_scale(app.config().amplitude_scale)),
                    Err(e) => {
                        warn!("Reload of {} failed: {}", config_path, e);
                        Ok(())
                    }
                },
                Wake::Input(ConsoleInput::Remote(text)) => {
                    app.handle_command(AppCommand::Remote(text), now, &mut hw, &mut sink)
                }
            };

            if let Err(e) = result {
                error!("Command failed: {}", e);
            }
        }

        info!(
            "Shutting down after {} ticks, {} transitions, {} alarms",
            app.ticks_total(),
            app.transitions(),
            sink.alarms()
        );
        Ok::<(), noisealert::error::Error>(())
    });

    future::block_on(executor.run(control))?;
    Ok(())
}
