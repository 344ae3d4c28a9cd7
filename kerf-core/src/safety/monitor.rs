//! Motion watchdog
//!
//! Tracks how long the current state has been active and compares it
//! against the budget for that state. A budget of zero disables the check.

use crate::config::CycleConfig;
use crate::state::{CycleState, FaultKind};

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultKind),
}

/// Watchdog for the waiting states of the cycle
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    /// Homing budget (ms), 0 = unbounded
    homing_timeout_ms: u32,
    /// Per-move budget (ms), 0 = unbounded
    motion_timeout_ms: u32,
    /// When the current state was entered
    entered_ms: u64,
}

impl SafetyMonitor {
    /// Create a monitor with explicit budgets
    pub fn new(homing_timeout_ms: u32, motion_timeout_ms: u32) -> Self {
        Self {
            homing_timeout_ms,
            motion_timeout_ms,
            entered_ms: 0,
        }
    }

    /// Create a monitor from the cycle configuration
    pub fn from_config(cycle: &CycleConfig) -> Self {
        Self::new(cycle.homing_timeout_ms, cycle.motion_timeout_ms)
    }

    /// Restart the clock for a newly entered state
    pub fn state_entered(&mut self, now_ms: u64) {
        self.entered_ms = now_ms;
    }

    /// Time spent in the current state
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.entered_ms)
    }

    /// Budget that applies to a state, if any
    pub fn budget_for(&self, state: CycleState) -> Option<(u32, FaultKind)> {
        let (budget, kind) = match state {
            CycleState::Homing => (self.homing_timeout_ms, FaultKind::HomingTimeout),
            s if s.is_motion() => (self.motion_timeout_ms, FaultKind::MotionTimeout),
            _ => return None,
        };
        (budget > 0).then_some((budget, kind))
    }

    /// Check the current state against its budget
    pub fn check(&self, state: CycleState, now_ms: u64) -> SafetyStatus {
        match self.budget_for(state) {
            Some((budget, kind)) if self.elapsed_ms(now_ms) > budget as u64 => {
                SafetyStatus::Fault(kind)
            }
            _ => SafetyStatus::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_never_faults() {
        let monitor = SafetyMonitor::new(0, 0);
        assert_eq!(monitor.check(CycleState::Homing, u64::MAX), SafetyStatus::Ok);
        assert_eq!(monitor.check(CycleState::Cutting, u64::MAX), SafetyStatus::Ok);
    }

    #[test]
    fn test_homing_budget() {
        let mut monitor = SafetyMonitor::new(500, 0);
        monitor.state_entered(1000);

        assert_eq!(monitor.check(CycleState::Homing, 1500), SafetyStatus::Ok);
        assert_eq!(
            monitor.check(CycleState::Homing, 1501),
            SafetyStatus::Fault(FaultKind::HomingTimeout)
        );
    }

    #[test]
    fn test_motion_budget_applies_to_moves_only() {
        let mut monitor = SafetyMonitor::new(0, 200);
        monitor.state_entered(0);

        for state in [
            CycleState::Cutting,
            CycleState::ReturningBothAxes,
            CycleState::Positioning,
        ] {
            assert_eq!(
                monitor.check(state, 201),
                SafetyStatus::Fault(FaultKind::MotionTimeout)
            );
        }

        for state in [
            CycleState::Idle,
            CycleState::ClampingForCut,
            CycleState::ReloadWait,
            CycleState::CycleCompleteCheck,
            CycleState::Fault(FaultKind::MotionTimeout),
        ] {
            assert_eq!(monitor.check(state, 10_000), SafetyStatus::Ok);
        }
    }

    #[test]
    fn test_reentry_resets_clock() {
        let mut monitor = SafetyMonitor::from_config(&CycleConfig {
            motion_timeout_ms: 100,
            ..CycleConfig::default()
        });
        monitor.state_entered(0);
        assert!(matches!(
            monitor.check(CycleState::Cutting, 150),
            SafetyStatus::Fault(_)
        ));

        monitor.state_entered(150);
        assert_eq!(monitor.check(CycleState::ReturningBothAxes, 200), SafetyStatus::Ok);
        assert_eq!(monitor.elapsed_ms(200), 50);
    }
}
