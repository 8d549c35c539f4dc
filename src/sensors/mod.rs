//! Sensor subsystem.
//!
//! Only one sensor exists: the [`SoundMeter`](sound_meter::SoundMeter),
//! which implements the [`AmplitudeSource`](crate::app::ports::AmplitudeSource)
//! port directly.

pub mod sound_meter;

pub use sound_meter::{sim_set_amplitude, MeterBackend, SoundMeter};
