//! Home-relative stroke offsets
//!
//! Position zero is the home switch. Travel along the working stroke is
//! negative, so a stroke of N steps is reached by commanding `-N`.

/// Length of a working stroke, away from home
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StrokeOffset {
    steps: u32,
}

impl StrokeOffset {
    /// The home position itself
    pub const HOME: Self = Self { steps: 0 };

    /// Create an offset of `steps` away from home
    ///
    /// Values beyond `i32::MAX` saturate so the target stays representable.
    pub const fn from_steps(steps: u32) -> Self {
        let steps = if steps > i32::MAX as u32 {
            i32::MAX as u32
        } else {
            steps
        };
        Self { steps }
    }

    /// Convert a travel distance into steps
    ///
    /// # Arguments
    /// - `steps_per_unit`: motor steps per distance unit
    /// - `travel_x100`: distance in hundredths of a unit
    pub fn from_travel(steps_per_unit: u32, travel_x100: u32) -> Self {
        let steps = steps_per_unit as u64 * travel_x100 as u64 / 100;
        Self::from_steps(steps.min(u32::MAX as u64) as u32)
    }

    /// Stroke length in steps
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Absolute axis target for this stroke
    pub fn target(&self) -> i32 {
        -(self.steps as i32)
    }

    /// Check if an axis position lies out along the stroke side of home
    pub fn is_extended(position: i32) -> bool {
        position < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_is_zero() {
        assert_eq!(StrokeOffset::HOME.target(), 0);
        assert_eq!(StrokeOffset::HOME.steps(), 0);
    }

    #[test]
    fn test_fractional_travel() {
        assert_eq!(StrokeOffset::from_travel(2000, 950).target(), -19000);
        assert_eq!(StrokeOffset::from_travel(2000, 330).target(), -6600);
        // Partial steps truncate toward home
        assert_eq!(StrokeOffset::from_travel(3, 50).steps(), 1);
    }

    #[test]
    fn test_saturates() {
        let offset = StrokeOffset::from_travel(u32::MAX, 10000);
        assert_eq!(offset.target(), -i32::MAX);
    }

    #[test]
    fn test_extended() {
        assert!(StrokeOffset::is_extended(-1));
        assert!(!StrokeOffset::is_extended(0));
        assert!(!StrokeOffset::is_extended(12));
    }
}
