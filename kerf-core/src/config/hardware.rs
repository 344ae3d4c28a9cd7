//! Hardware configuration types
//!
//! These types define pin assignments and electrical polarity for the
//! axes, switches and clamps.

use heapless::FnvIndexSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::ConfigError;

/// Number of GPIO pins on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }

    /// Same pin with pull-up enabled
    pub const fn pulled_up(self) -> Self {
        Self {
            pull_up: true,
            ..self
        }
    }

    /// Electrical level that represents the given logical level
    pub fn level_for(&self, active: bool) -> bool {
        active != self.inverted
    }
}

/// Pins for one stepper axis and its home switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisHwConfig {
    /// Step pulse pin
    pub step_pin: PinConfig,
    /// Direction pin
    pub dir_pin: PinConfig,
    /// Home switch pin
    pub home_pin: PinConfig,
}

/// Complete pin map of the machine
///
/// The default is the reference wiring: home switches close to ground
/// (active-low with pull-ups), the run and reload switches read high
/// when active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareConfig {
    /// Cut axis pins
    pub cut_axis: AxisHwConfig,
    /// Position axis pins
    pub position_axis: AxisHwConfig,
    /// Run-cycle switch
    pub run_switch: PinConfig,
    /// Reload switch
    pub reload_switch: PinConfig,
    /// Position clamp output
    pub position_clamp: PinConfig,
    /// Secure-wood clamp output
    pub secure_clamp: PinConfig,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            cut_axis: AxisHwConfig {
                step_pin: PinConfig::new(11),
                dir_pin: PinConfig::new(12),
                home_pin: PinConfig::inverted(7).pulled_up(),
            },
            position_axis: AxisHwConfig {
                step_pin: PinConfig::new(5),
                dir_pin: PinConfig::new(6),
                home_pin: PinConfig::inverted(8).pulled_up(),
            },
            run_switch: PinConfig::with_pullup(9),
            reload_switch: PinConfig::with_pullup(10),
            position_clamp: PinConfig::new(3),
            secure_clamp: PinConfig::new(4),
        }
    }
}

impl HardwareConfig {
    /// All assigned pins
    pub fn pins(&self) -> [PinConfig; 10] {
        [
            self.cut_axis.step_pin,
            self.cut_axis.dir_pin,
            self.cut_axis.home_pin,
            self.position_axis.step_pin,
            self.position_axis.dir_pin,
            self.position_axis.home_pin,
            self.run_switch,
            self.reload_switch,
            self.position_clamp,
            self.secure_clamp,
        ]
    }

    /// Check that every pin exists and none is assigned twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut allocator = GpioAllocator::new();
        for pin in self.pins() {
            allocator.allocate(pin.pin)?;
        }
        Ok(())
    }
}

/// GPIO allocator to track pin usage
pub struct GpioAllocator {
    /// Set of allocated GPIO pins
    allocated: FnvIndexSet<u8, 32>,
}

impl Default for GpioAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioAllocator {
    /// Create a new GPIO allocator
    pub fn new() -> Self {
        Self {
            allocated: FnvIndexSet::new(),
        }
    }

    /// Allocate a GPIO pin
    pub fn allocate(&mut self, pin: u8) -> Result<(), ConfigError> {
        if pin >= GPIO_COUNT {
            return Err(ConfigError::InvalidPin(pin));
        }
        match self.allocated.insert(pin) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ConfigError::PinConflict(pin)),
            Err(_) => Err(ConfigError::InvalidPin(pin)),
        }
    }

    /// Check if a pin is allocated
    pub fn is_allocated(&self, pin: u8) -> bool {
        self.allocated.contains(&pin)
    }

    /// Get the number of allocated pins
    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "gpio11" -> pin 11
/// - "!gpio12" -> pin 12, inverted (active-low)
/// - "^gpio4" -> pin 4 with pull-up
/// - "!^gpio7" or "^!gpio7" -> both modifiers
pub fn parse_pin_string(s: &str) -> Option<PinConfig> {
    let mut s = s.trim();
    let mut config = PinConfig::default();

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            config.inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            config.pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let pin: u8 = s.strip_prefix("gpio")?.parse().ok()?;
    if pin >= GPIO_COUNT {
        return None;
    }
    config.pin = pin;

    Some(config)
}
