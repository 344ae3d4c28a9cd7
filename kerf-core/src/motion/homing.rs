//! Homing procedure
//!
//! Drives both axes toward their home switches until both are seated.
//! Each axis is handled independently on every tick: while its switch is
//! inactive the axis seeks toward home, once active it is stopped and
//! its position redefined as zero. The procedure ends only on a tick in
//! which both switches read active.

use super::axis::Axis;
use crate::state::FaultKind;
use crate::traits::{DebouncedInput, MotionAxis};

/// Progress of a homing tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingStatus {
    /// At least one switch is still inactive
    Seeking,
    /// Both switches active, both axes at zero
    Complete,
}

/// Homing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingError {
    /// The tick budget ran out before both switches asserted
    Timeout,
}

impl From<HomingError> for FaultKind {
    fn from(err: HomingError) -> Self {
        match err {
            HomingError::Timeout => FaultKind::HomingTimeout,
        }
    }
}

/// Non-blocking homing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Homing {
    /// Absolute target commanded while seeking; positive points toward home
    seek_target: i32,
}

impl Homing {
    pub fn new(seek_target: i32) -> Self {
        Self { seek_target }
    }

    /// Run one homing tick on both axes
    ///
    /// The switches must already have been polled for this tick.
    pub fn poll<A, S>(
        &self,
        cut: &mut Axis<A>,
        position: &mut Axis<A>,
        cut_home: &S,
        position_home: &S,
        now_us: u64,
    ) -> HomingStatus
    where
        A: MotionAxis,
        S: DebouncedInput,
    {
        let cut_seated = self.seek_or_seat(cut, cut_home.is_active(), now_us);
        let position_seated = self.seek_or_seat(position, position_home.is_active(), now_us);

        if cut_seated && position_seated {
            HomingStatus::Complete
        } else {
            HomingStatus::Seeking
        }
    }

    fn seek_or_seat<A: MotionAxis>(&self, axis: &mut Axis<A>, at_home: bool, now_us: u64) -> bool {
        if at_home {
            axis.seat_at_home();
        } else {
            axis.move_to(self.seek_target);
            axis.run(now_us);
        }
        at_home
    }
}

/// Home both axes, blocking until both are seated
///
/// # Arguments
/// - `clock`: returns the current time in microseconds, called once per tick
/// - `budget_ticks`: give up after this many ticks; `None` waits forever
pub fn home<A, S, C>(
    homing: &Homing,
    cut: &mut Axis<A>,
    position: &mut Axis<A>,
    cut_home: &mut S,
    position_home: &mut S,
    mut clock: C,
    budget_ticks: Option<u32>,
) -> Result<(), HomingError>
where
    A: MotionAxis,
    S: DebouncedInput,
    C: FnMut() -> u64,
{
    let mut ticks: u32 = 0;
    loop {
        if let Some(budget) = budget_ticks {
            if ticks >= budget {
                return Err(HomingError::Timeout);
            }
        }
        ticks = ticks.saturating_add(1);

        let now_us = clock();
        cut_home.poll(now_us / 1000);
        position_home.poll(now_us / 1000);

        if homing.poll(cut, position, cut_home, position_home, now_us) == HomingStatus::Complete {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::AxisRole;
    use crate::testing::{SimAxis, SimSwitch};

    /// A switch that asserts once the carriage reaches physical home
    struct HomeSensor<'a> {
        physical: &'a core::cell::Cell<i64>,
        active: bool,
    }

    impl DebouncedInput for HomeSensor<'_> {
        fn poll(&mut self, _now_ms: u64) {
            self.active = self.physical.get() >= 0;
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn rose(&mut self) -> bool {
            false
        }
    }

    #[test]
    fn test_seated_axis_stops_while_other_seeks() {
        let homing = Homing::new(10000);
        let mut cut = Axis::new(AxisRole::Cut, SimAxis::new());
        let mut position = Axis::new(AxisRole::Position, SimAxis::new());
        let cut_home = SimSwitch::new(true);
        let position_home = SimSwitch::new(false);

        for t in 0..5 {
            let status = homing.poll(&mut cut, &mut position, &cut_home, &position_home, t);
            assert_eq!(status, HomingStatus::Seeking);
        }

        assert!(cut.is_homed());
        assert_eq!(cut.current_position(), 0);
        assert_eq!(cut.driver().steps_emitted, 0);
        assert!(!position.is_homed());
        assert_eq!(position.current_position(), 5);
        assert_eq!(position.driver().target, 10000);
    }

    #[test]
    fn test_complete_only_when_both_active() {
        let homing = Homing::new(10000);
        let mut cut = Axis::new(AxisRole::Cut, SimAxis::new());
        let mut position = Axis::new(AxisRole::Position, SimAxis::new());
        let cut_home = SimSwitch::new(true);
        let position_home = SimSwitch::new(true);

        let status = homing.poll(&mut cut, &mut position, &cut_home, &position_home, 0);
        assert_eq!(status, HomingStatus::Complete);
        assert!(cut.is_homed() && position.is_homed());
    }

    #[test]
    fn test_blocking_home_seats_at_switch() {
        let homing = Homing::new(10000);
        let mut cut = Axis::new(AxisRole::Cut, SimAxis::at_physical(-40));
        let mut position = Axis::new(AxisRole::Position, SimAxis::at_physical(-7));
        let cut_physical = cut.driver().physical.clone();
        let position_physical = position.driver().physical.clone();
        let mut cut_home = HomeSensor {
            physical: &cut_physical,
            active: false,
        };
        let mut position_home = HomeSensor {
            physical: &position_physical,
            active: false,
        };

        let mut now = 0u64;
        let result = home(
            &homing,
            &mut cut,
            &mut position,
            &mut cut_home,
            &mut position_home,
            || {
                now += 1000;
                now
            },
            Some(1000),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(cut.current_position(), 0);
        assert_eq!(position.current_position(), 0);
        assert!(cut_home.is_active() && position_home.is_active());
        assert_eq!(cut_physical.get(), 0);
        assert_eq!(position_physical.get(), 0);
    }

    #[test]
    fn test_blocking_home_budget() {
        let homing = Homing::new(10000);
        let mut cut = Axis::new(AxisRole::Cut, SimAxis::new());
        let mut position = Axis::new(AxisRole::Position, SimAxis::new());
        let mut cut_home = SimSwitch::new(false);
        let mut position_home = SimSwitch::new(true);

        let result = home(
            &homing,
            &mut cut,
            &mut position,
            &mut cut_home,
            &mut position_home,
            || 0,
            Some(25),
        );

        assert_eq!(result, Err(HomingError::Timeout));
        assert_eq!(FaultKind::from(HomingError::Timeout), FaultKind::HomingTimeout);
        assert!(!cut.is_homed());
    }
}
