//! Clamp actuator trait

/// A binary clamp actuator (solenoid or pneumatic valve)
///
/// The clamp enforces no ordering and no timing. After every transition
/// the caller must wait the configured settle delay before relying on
/// the new mechanical state.
pub trait Clamp {
    /// Engage the clamp
    fn engage(&mut self);

    /// Release the clamp
    fn disengage(&mut self);

    /// Last commanded state
    fn is_engaged(&self) -> bool;

    /// Set the clamp to a specific state
    fn set_engaged(&mut self, engaged: bool) {
        if engaged {
            self.engage();
        } else {
            self.disengage();
        }
    }
}
