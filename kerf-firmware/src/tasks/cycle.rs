//! Cycle task
//!
//! Polls the sequencer in a tight cooperative loop. Every poll emits at
//! most one step per axis, so the loop yields instead of sleeping.

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::Instant;

use crate::board::Sequencer;
use crate::channels::{StatusReport, STATUS_CHANNEL};

/// Cycle task - owns every actuator and switch
#[embassy_executor::task]
pub async fn cycle_task(mut sequencer: Sequencer) {
    info!("Cycle task started");

    let mut reported = None;
    let mut ignored_reloads = sequencer.ignored_reloads();

    loop {
        let now_us = Instant::now().as_micros();
        if let Some(event) = sequencer.poll(now_us) {
            debug!("Event: {:?}", event);
        }

        let state = sequencer.state();
        if reported != Some(state) {
            reported = Some(state);
            let (cut_position, position_position) = sequencer.axis_positions();
            let entered = StatusReport::StateEntered {
                state,
                cut_position,
                position_position,
                cycles: sequencer.cycles_completed(),
            };
            if state.is_fault() {
                // Fault reports are never dropped
                STATUS_CHANNEL.send(entered).await;
            } else {
                report(entered);
            }
        }

        if sequencer.ignored_reloads() != ignored_reloads {
            ignored_reloads = sequencer.ignored_reloads();
            report(StatusReport::ReloadIgnored {
                position_position: sequencer.axis_positions().1,
            });
        }

        yield_now().await;
    }
}

/// Queue a report; reports are dropped while the logger lags behind
fn report(status: StatusReport) {
    if STATUS_CHANNEL.try_send(status).is_err() {
        trace!("Status channel full, report dropped");
    }
}
