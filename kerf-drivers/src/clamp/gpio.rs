//! GPIO clamp output
//!
//! Drives a clamp solenoid or valve via a GPIO pin (directly or via a
//! MOSFET or relay board).

use embedded_hal::digital::OutputPin;
use kerf_core::traits::Clamp;

/// GPIO clamp output
///
/// The pin can be configured as active-high (default) or active-low.
/// The clamp does not wait for the mechanism to settle; the sequencer
/// handles that.
pub struct GpioClamp<P> {
    pin: P,
    /// If true, clamp engaged = pin LOW
    inverted: bool,
    /// Last commanded state
    engaged: bool,
}

impl<P: OutputPin> GpioClamp<P> {
    /// Create a new GPIO clamp, released
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the clamp engages when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut clamp = Self {
            pin,
            inverted,
            engaged: false,
        };
        clamp.write(false);
        clamp
    }

    /// Create a new GPIO clamp with active-high output
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a new GPIO clamp with active-low output
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    fn write(&mut self, engaged: bool) {
        self.engaged = engaged;
        // Normal: engaged → high; inverted: engaged → low
        let _ = if engaged != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}

impl<P: OutputPin> Clamp for GpioClamp<P> {
    fn engage(&mut self) {
        self.write(true);
    }

    fn disengage(&mut self) {
        self.write(false);
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }
}
