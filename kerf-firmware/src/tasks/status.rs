//! Status logging task
//!
//! Logs state changes reported by the cycle task. Never touches hardware.

use defmt::*;

use kerf_core::state::CycleState;

use crate::channels::{StatusReport, STATUS_CHANNEL};

/// Status task - logs reports from the cycle task
#[embassy_executor::task]
pub async fn status_task() {
    info!("Status task started");

    loop {
        match STATUS_CHANNEL.receive().await {
            StatusReport::StateEntered {
                state: CycleState::Fault(kind),
                cut_position,
                position_position,
                ..
            } => {
                warn!(
                    "Fault: {:?} (cut={}, position={}), press reload to re-home",
                    kind, cut_position, position_position
                );
            }
            StatusReport::StateEntered {
                state: CycleState::Idle,
                cycles,
                ..
            } => {
                info!("Idle, {} cycles completed", cycles);
            }
            StatusReport::StateEntered {
                state,
                cut_position,
                position_position,
                ..
            } => {
                info!(
                    "State: {:?} (cut={}, position={})",
                    state, cut_position, position_position
                );
            }
            StatusReport::ReloadIgnored { position_position } => {
                warn!("Reload ignored (position axis at {})", position_position);
            }
        }
    }
}
