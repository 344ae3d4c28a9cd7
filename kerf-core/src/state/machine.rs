//! State machine definition
//!
//! Every clamp and axis command is a function of the current state.
//! Transitions are pure: the sequencer derives an [`Event`] from switch
//! reads and axis queries, then asks the state for its successor.

use super::events::Event;

/// Cycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// Both axes seeking their home switches
    Homing,
    /// Referenced and waiting for the run switch (or a reload request)
    Idle,
    /// Engaging both clamps before the cut
    ClampingForCut,
    /// Cut axis travelling out along the working stroke
    Cutting,
    /// Releasing the position clamp so the position axis can return
    ReleasingPositionClamp,
    /// Both axes travelling back to home at return speed
    ReturningBothAxes,
    /// Swapping clamps so the position axis can feed material
    ReclampingForPosition,
    /// Position axis feeding material out by one stroke
    Positioning,
    /// Cycle finished, deciding what the run switch wants next
    CycleCompleteCheck,
    /// Both clamps released on operator request, waiting for them to settle
    ReloadWait,
    /// Motion budget exceeded; axes stopped, position untrusted
    Fault(FaultKind),
}

/// Types of faults raised by the motion watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// A home switch never asserted within the homing budget
    HomingTimeout,
    /// A cut, return or positioning move never finished within its budget
    MotionTimeout,
}

impl CycleState {
    /// Check if this state advances an axis on every poll
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            CycleState::Homing
                | CycleState::Cutting
                | CycleState::ReturningBothAxes
                | CycleState::Positioning
        )
    }

    /// Check if a reload rising edge is honoured in this state
    pub fn accepts_reload(&self) -> bool {
        matches!(self, CycleState::Idle | CycleState::Fault(_))
    }

    /// Check if this is a fault state
    pub fn is_fault(&self) -> bool {
        matches!(self, CycleState::Fault(_))
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use CycleState::*;
        use Event::*;

        match (self, event) {
            (Homing, HomingComplete) => Idle,

            (Idle, RunConfirmed) => ClampingForCut,
            (Idle, ReloadAccepted) => ReloadWait,
            (ReloadWait, ReloadComplete) => Idle,

            (ClampingForCut, ClampsEngaged) => Cutting,
            (Cutting, CutComplete) => ReleasingPositionClamp,
            (ReleasingPositionClamp, PositionClampReleased) => ReturningBothAxes,
            (ReturningBothAxes, AxesHome) => ReclampingForPosition,
            (ReclampingForPosition, PositionClampEngaged) => Positioning,
            (Positioning, PositionComplete) => CycleCompleteCheck,

            (CycleCompleteCheck, RunReleased) => Idle,
            (CycleCompleteCheck, RunStillHeld) => Idle,

            // A fault never overrides another fault
            (Fault(_), FaultCleared) => Homing,
            (Fault(_), FaultDetected(_)) => self,
            (_, FaultDetected(kind)) => Fault(kind),

            // Default: stay in current state
            _ => self,
        }
    }
}
