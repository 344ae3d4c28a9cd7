//! Safety monitoring
//!
//! Bounds how long the machine may wait on a switch or a move before
//! the sequencer enters the fault state.

pub mod monitor;

pub use monitor::{SafetyMonitor, SafetyStatus};
