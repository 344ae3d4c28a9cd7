//! Cycle sequencer
//!
//! Owns every axis, clamp and switch of the machine and advances the
//! cycle state machine one non-blocking step per poll.

pub mod cycle;
pub mod io;

pub use cycle::CycleSequencer;
pub use io::MachineIo;
