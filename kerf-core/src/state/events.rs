//! Events that trigger state transitions

use super::machine::FaultKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Referencing
    /// Both home switches asserted in the same poll
    HomingComplete,

    // Operator events
    /// Run switch active and still active after the confirmation wait
    RunConfirmed,
    /// Reload requested while the position axis was extended
    ReloadAccepted,

    // Cycle progress
    /// Both clamps engaged and settled
    ClampsEngaged,
    /// Cut axis reached the end of its stroke
    CutComplete,
    /// Position clamp released and settled
    PositionClampReleased,
    /// Both axes back at home
    AxesHome,
    /// Secure-wood clamp released, position clamp engaged and settled
    PositionClampEngaged,
    /// Position axis reached the end of its stroke
    PositionComplete,
    /// Run switch found inactive at the end of a cycle
    RunReleased,
    /// Run switch still active at the end of a cycle
    RunStillHeld,
    /// Clamps released by a reload request have settled
    ReloadComplete,

    // Safety events
    /// Motion watchdog budget exceeded
    FaultDetected(FaultKind),
    /// Operator acknowledged the fault with the reload switch
    FaultCleared,
}
