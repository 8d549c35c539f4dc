//! NoiseAlert library.
//!
//! Exposes the alert loop, its ports and the host adapters for the binary
//! and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod scheduler;
pub mod sensors;
