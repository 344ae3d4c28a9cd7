//! Axis motion
//!
//! Axis roles and speed profiles, the home-relative sign convention and
//! the homing procedure that establishes it.

pub mod axis;
pub mod homing;
pub mod stroke;

pub use axis::{Axis, AxisProfile, AxisRole, SpeedMode};
pub use homing::{home, Homing, HomingError, HomingStatus};
pub use stroke::StrokeOffset;
