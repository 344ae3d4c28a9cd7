//! Configuration type definitions
//!
//! These types represent the machine configuration. All values are
//! deployment parameters: they are read once at boot and never change
//! while the machine runs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::hardware::HardwareConfig;
use crate::motion::{AxisProfile, AxisRole, SpeedMode, StrokeOffset};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Motion parameters for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisMotionConfig {
    /// Working stroke length in distance units (value × 100, e.g., 950 = 9.50)
    pub travel_x100: u32,
    /// Maximum speed for the working stroke (steps/s)
    pub normal_speed: u32,
    /// Maximum speed for the return to home (steps/s)
    pub return_speed: u32,
    /// Acceleration and deceleration (steps/s²)
    pub acceleration: u32,
}

impl AxisMotionConfig {
    /// Default cut axis parameters
    pub const fn cut() -> Self {
        Self {
            travel_x100: 950,
            normal_speed: 2000,
            return_speed: 50000,
            acceleration: 10000,
        }
    }

    /// Default position axis parameters
    pub const fn position() -> Self {
        Self {
            travel_x100: 330,
            normal_speed: 5000,
            return_speed: 3000,
            acceleration: 5000,
        }
    }

    /// Maximum speed for the given mode
    pub fn speed(&self, mode: SpeedMode) -> u32 {
        match mode {
            SpeedMode::Normal => self.normal_speed,
            SpeedMode::Return => self.return_speed,
        }
    }

    /// Speed and acceleration for the given mode
    ///
    /// Both modes share one acceleration rate.
    pub fn profile(&self, mode: SpeedMode) -> AxisProfile {
        AxisProfile {
            max_speed: self.speed(mode),
            acceleration: self.acceleration,
        }
    }

    /// Working stroke expressed in steps
    pub fn stroke(&self, steps_per_unit: u32) -> StrokeOffset {
        StrokeOffset::from_travel(steps_per_unit, self.travel_x100)
    }
}

/// Cycle timing and behavior parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleConfig {
    /// Motor steps per distance unit (steps per inch on the reference machine)
    pub steps_per_unit: u32,
    /// Wait after every clamp transition (ms)
    pub clamp_settle_ms: u32,
    /// Debounce window for the home switches (ms)
    pub home_debounce_ms: u32,
    /// Debounce window for the run and reload switches (ms)
    ///
    /// Also the extra wait before the run switch is sampled a second time.
    pub switch_debounce_ms: u32,
    /// Absolute target commanded toward home while seeking a home switch
    pub homing_seek_steps: i32,
    /// Homing budget (ms); 0 waits forever
    pub homing_timeout_ms: u32,
    /// Budget for each cut, return and positioning move (ms); 0 waits forever
    pub motion_timeout_ms: u32,
    /// Start the next cycle when the run switch is still held at the end
    /// of a cycle; when false the sequencer waits for a release first
    pub repeat_while_held: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            steps_per_unit: 2000,
            clamp_settle_ms: 100,
            home_debounce_ms: 10,
            switch_debounce_ms: 20,
            homing_seek_steps: 10000,
            homing_timeout_ms: 0,
            motion_timeout_ms: 0,
            repeat_while_held: true,
        }
    }
}

/// Errors found while validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unsupported configuration version
    VersionMismatch,
    /// Steps per unit must be non-zero
    ZeroStepsPerUnit,
    /// An axis speed or acceleration is zero
    ZeroSpeed(AxisRole),
    /// An axis has no working stroke
    ZeroTravel(AxisRole),
    /// A stroke does not fit in the step counter
    TravelOverflow(AxisRole),
    /// The homing seek target must point toward home (positive)
    InvalidSeekTarget,
    /// A GPIO is outside the valid range
    InvalidPin(u8),
    /// A GPIO is assigned to more than one signal
    PinConflict(u8),
}

/// Complete machine configuration
///
/// This is the top-level configuration structure. `Default` yields the
/// reference machine: 2000 steps per inch, a 9.5 inch cut stroke and a
/// 3.3 inch feed stroke.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Cycle timing and behavior
    pub cycle: CycleConfig,
    /// Cut axis motion
    pub cut: AxisMotionConfig,
    /// Position axis motion
    pub position: AxisMotionConfig,
    /// Pin assignments and polarity
    pub hardware: HardwareConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            cycle: CycleConfig::default(),
            cut: AxisMotionConfig::cut(),
            position: AxisMotionConfig::position(),
            hardware: HardwareConfig::default(),
        }
    }
}

impl MachineConfig {
    /// Create the reference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Motion parameters for an axis
    pub fn axis(&self, role: AxisRole) -> &AxisMotionConfig {
        match role {
            AxisRole::Cut => &self.cut,
            AxisRole::Position => &self.position,
        }
    }

    /// Check the configuration for values the sequencer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.cycle.steps_per_unit == 0 {
            return Err(ConfigError::ZeroStepsPerUnit);
        }
        if self.cycle.homing_seek_steps <= 0 {
            return Err(ConfigError::InvalidSeekTarget);
        }

        for role in [AxisRole::Cut, AxisRole::Position] {
            let axis = self.axis(role);
            if axis.normal_speed == 0 || axis.return_speed == 0 || axis.acceleration == 0 {
                return Err(ConfigError::ZeroSpeed(role));
            }
            if axis.travel_x100 == 0 {
                return Err(ConfigError::ZeroTravel(role));
            }
            let steps = self.cycle.steps_per_unit as u64 * axis.travel_x100 as u64 / 100;
            if steps > i32::MAX as u64 {
                return Err(ConfigError::TravelOverflow(role));
            }
        }

        self.hardware.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_is_valid() {
        let config = MachineConfig::new();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_reference_strokes() {
        let config = MachineConfig::new();
        let spu = config.cycle.steps_per_unit;
        assert_eq!(config.cut.stroke(spu).target(), -19000);
        assert_eq!(config.position.stroke(spu).target(), -6600);
    }

    #[test]
    fn test_speed_modes() {
        let cut = AxisMotionConfig::cut();
        assert_eq!(cut.speed(SpeedMode::Normal), 2000);
        assert_eq!(cut.speed(SpeedMode::Return), 50000);
    }

    #[test]
    fn test_reject_zero_values() {
        let mut config = MachineConfig::new();
        config.cycle.steps_per_unit = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroStepsPerUnit));

        let mut config = MachineConfig::new();
        config.position.return_speed = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroSpeed(AxisRole::Position))
        );

        let mut config = MachineConfig::new();
        config.cut.travel_x100 = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTravel(AxisRole::Cut)));
    }

    #[test]
    fn test_reject_seek_away_from_home() {
        let mut config = MachineConfig::new();
        config.cycle.homing_seek_steps = -10;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSeekTarget));
    }

    #[test]
    fn test_reject_overflowing_stroke() {
        let mut config = MachineConfig::new();
        config.cycle.steps_per_unit = u32::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TravelOverflow(AxisRole::Cut))
        );
    }

    #[test]
    fn test_reject_version() {
        let config = MachineConfig {
            version: 9,
            ..MachineConfig::new()
        };
        assert_eq!(config.validate(), Err(ConfigError::VersionMismatch));
    }
}
