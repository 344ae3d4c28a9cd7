//! Board-agnostic core logic for the cutting machine firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (motion axis, debounced input, clamp)
//! - Cycle state machine and the sequencer that drives it
//! - Homing procedure and the home-relative sign convention
//! - Motion watchdog (bounded wait budgets)
//! - Configuration types and the `machine.toml` reader

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod safety;
pub mod sequencer;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
