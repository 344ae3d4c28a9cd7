//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in kerf-core, written against the `embedded-hal` 1.0 digital traits:
//!
//! - Stepper axis with a trapezoidal speed profile (step/dir outputs)
//! - Debounced switch inputs
//! - GPIO clamp outputs

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clamp;
pub mod stepper;
pub mod switch;

#[cfg(test)]
pub(crate) mod mock;
