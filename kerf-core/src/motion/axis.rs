//! Axis roles and the per-axis wrapper owned by the sequencer

use crate::config::MachineConfig;
use crate::traits::MotionAxis;

/// Which of the two machine axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisRole {
    /// Drives the saw through the material
    Cut,
    /// Feeds the material forward between cuts
    Position,
}

/// Speed selection for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    /// Working stroke
    Normal,
    /// Travel back to home
    Return,
}

/// Speed and acceleration applied to a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisProfile {
    /// Maximum speed (steps/s)
    pub max_speed: u32,
    /// Acceleration (steps/s²)
    pub acceleration: u32,
}

/// One machine axis: a motion driver plus its homing state
///
/// Position is trustworthy only while [`Axis::is_homed`] is true.
pub struct Axis<A: MotionAxis> {
    role: AxisRole,
    driver: A,
    homed: bool,
}

impl<A: MotionAxis> Axis<A> {
    /// Wrap a driver; the axis starts unhomed
    pub fn new(role: AxisRole, driver: A) -> Self {
        Self {
            role,
            driver,
            homed: false,
        }
    }

    pub fn role(&self) -> AxisRole {
        self.role
    }

    pub fn is_homed(&self) -> bool {
        self.homed
    }

    pub fn driver(&self) -> &A {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut A {
        &mut self.driver
    }

    /// Apply a speed profile to the driver
    pub fn apply_profile(&mut self, profile: AxisProfile) {
        self.driver.set_max_speed(profile.max_speed);
        self.driver.set_acceleration(profile.acceleration);
    }

    /// Apply the configured profile for this axis in the given mode
    pub fn apply_speed(&mut self, config: &MachineConfig, mode: SpeedMode) {
        self.apply_profile(config.axis(self.role).profile(mode));
    }

    pub fn move_to(&mut self, target: i32) {
        self.driver.move_to(target);
    }

    /// Advance one tick; returns `true` while motion remains
    pub fn run(&mut self, now_us: u64) -> bool {
        self.driver.run(now_us)
    }

    pub fn distance_to_go(&self) -> i32 {
        self.driver.distance_to_go()
    }

    pub fn current_position(&self) -> i32 {
        self.driver.current_position()
    }

    pub fn is_at_target(&self) -> bool {
        self.driver.is_at_target()
    }

    /// Stop at the home switch and define this position as zero
    pub fn seat_at_home(&mut self) {
        self.driver.stop_and_zero();
        self.homed = true;
    }

    /// Forget the reference; the axis must be homed again
    pub fn invalidate(&mut self) {
        self.driver.halt();
        self.homed = false;
    }
}
