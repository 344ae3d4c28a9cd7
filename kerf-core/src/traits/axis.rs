//! Motion axis driver trait
//!
//! Abstracts over one open-loop stepper axis. Positions are absolute
//! step counts relative to the axis zero; see [`crate::motion::StrokeOffset`]
//! for the sign convention.

/// Trait for a single stepper axis with a trapezoidal speed profile
///
/// Implementations must never block: [`MotionAxis::run`] emits at most
/// one step per call and is expected to be called from a tight poll loop.
pub trait MotionAxis {
    /// Set the maximum speed in steps per second
    fn set_max_speed(&mut self, steps_per_s: u32);

    /// Set the acceleration and deceleration rate in steps per second squared
    fn set_acceleration(&mut self, steps_per_s2: u32);

    /// Set an absolute target position in steps
    fn move_to(&mut self, target: i32);

    /// Advance the motion toward the target
    ///
    /// Emits a step if one is due at `now_us`. Returns `true` while the
    /// axis still has motion left (moving or decelerating).
    fn run(&mut self, now_us: u64) -> bool;

    /// Signed number of steps from the current position to the target
    fn distance_to_go(&self) -> i32;

    /// Current position in steps, as counted from emitted pulses
    fn current_position(&self) -> i32;

    /// Most recently commanded target position
    fn target_position(&self) -> i32;

    /// Stop immediately and redefine the current position as zero
    fn stop_and_zero(&mut self);

    /// Stop immediately, keeping the current position
    ///
    /// Any speed ramp in progress is discarded.
    fn halt(&mut self);

    /// Check if the axis has reached its target
    fn is_at_target(&self) -> bool {
        self.distance_to_go() == 0
    }
}
