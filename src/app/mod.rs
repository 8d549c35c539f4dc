//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules of the noise alert loop: FSM
//! orchestration, deferred task handling and command dispatch.  All
//! interaction with devices happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without a microphone.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
