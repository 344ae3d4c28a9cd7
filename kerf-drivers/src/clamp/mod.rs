//! Clamp output drivers

pub mod gpio;

pub use gpio::GpioClamp;
