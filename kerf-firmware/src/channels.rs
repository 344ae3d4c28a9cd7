//! Inter-task communication channels
//!
//! The cycle task owns all hardware; other tasks only receive reports.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use kerf_core::state::CycleState;

/// Channel capacity for status reports
const STATUS_CHANNEL_SIZE: usize = 8;

/// Something worth telling the operator about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusReport {
    /// The sequencer entered a new state
    StateEntered {
        state: CycleState,
        cut_position: i32,
        position_position: i32,
        cycles: u32,
    },
    /// A reload press was dropped
    ReloadIgnored { position_position: i32 },
}

/// Status reports from the cycle task (for logging)
pub static STATUS_CHANNEL: Channel<CriticalSectionRawMutex, StatusReport, STATUS_CHANNEL_SIZE> =
    Channel::new();
