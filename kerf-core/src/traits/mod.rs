//! Collaborator traits
//!
//! These traits define the interface between the cycle sequencer
//! and hardware-specific implementations.

pub mod axis;
pub mod clamp;
pub mod input;

pub use axis::MotionAxis;
pub use clamp::Clamp;
pub use input::DebouncedInput;
