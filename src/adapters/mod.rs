//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements                 | Connects to            |
//! |-------------------|----------------------------|------------------------|
//! | `platform`        | AmplitudeSource            | `SoundMeter`           |
//! |                   | DisplaySink, WakeLock      | console display, lock  |
//! | `console_display` | DisplaySink                | log output             |
//! | `wake_lock`       | WakeLock                   | simulated power lock   |
//! | `log_sink`        | EventSink                  | log output             |
//! | `config_file`     | ConfigPort                 | JSON settings file     |
//! | `console`         | (inbound channel)          | stdin                  |
//! | `time`            | (clock)                    | `std::time::Instant`   |

pub mod config_file;
pub mod console;
pub mod console_display;
pub mod log_sink;
pub mod platform;
pub mod time;
pub mod wake_lock;
