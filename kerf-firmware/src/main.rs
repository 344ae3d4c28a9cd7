//! Kerf - Cutting Machine Firmware
//!
//! Main firmware binary for RP2040-based cutting machines. Homes both
//! axes at boot, then runs the clamp-cut-return-feed cycle whenever the
//! run switch asks for it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output};
use {defmt_rtt as _, panic_probe as _};

use kerf_core::config::PinConfig;
use kerf_core::motion::{Axis, AxisRole};
use kerf_core::sequencer::{CycleSequencer, MachineIo};
use kerf_core::traits::DebouncedInput;
use kerf_drivers::clamp::GpioClamp;
use kerf_drivers::switch::DebouncedSwitch;

use crate::board::{pull, Sequencer};

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

mod board;
mod channels;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Kerf firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(EMBEDDED_CONFIG);
    board::check_wiring(&config.hardware);

    let hw = config.hardware;
    let cycle = config.cycle;

    // Pin numbers are fixed by the board; polarity and pulls come from config
    let cut_axis = Axis::new(
        AxisRole::Cut,
        board::stepper(p.PIN_11.into(), p.PIN_12.into(), &hw.cut_axis),
    );
    let position_axis = Axis::new(
        AxisRole::Position,
        board::stepper(p.PIN_5.into(), p.PIN_6.into(), &hw.position_axis),
    );
    info!("Steppers initialized");

    let switch = |input: Input<'static>, pin: &PinConfig, debounce_ms: u32| {
        DebouncedSwitch::new(input, pin.inverted, debounce_ms)
    };
    let cut_home = switch(
        Input::new(p.PIN_7, pull(&hw.cut_axis.home_pin)),
        &hw.cut_axis.home_pin,
        cycle.home_debounce_ms,
    );
    let position_home = switch(
        Input::new(p.PIN_8, pull(&hw.position_axis.home_pin)),
        &hw.position_axis.home_pin,
        cycle.home_debounce_ms,
    );
    let run_switch = switch(
        Input::new(p.PIN_9, pull(&hw.run_switch)),
        &hw.run_switch,
        cycle.switch_debounce_ms,
    );
    let reload_switch = switch(
        Input::new(p.PIN_10, pull(&hw.reload_switch)),
        &hw.reload_switch,
        cycle.switch_debounce_ms,
    );
    info!(
        "Switches initialized (cut home={}, position home={}, run={}, reload={})",
        cut_home.is_active(),
        position_home.is_active(),
        run_switch.is_active(),
        reload_switch.is_active()
    );

    // Clamps start released
    let position_clamp = GpioClamp::new(
        Output::new(p.PIN_3, Level::from(hw.position_clamp.level_for(false))),
        hw.position_clamp.inverted,
    );
    let secure_clamp = GpioClamp::new(
        Output::new(p.PIN_4, Level::from(hw.secure_clamp.level_for(false))),
        hw.secure_clamp.inverted,
    );
    info!("Clamps initialized");

    let io = MachineIo {
        cut_axis,
        position_axis,
        cut_home,
        position_home,
        run_switch,
        reload_switch,
        position_clamp,
        secure_clamp,
    };
    let sequencer: Sequencer = CycleSequencer::new(&config, io);

    // Spawn tasks
    spawner.spawn(tasks::status_task()).unwrap();
    spawner.spawn(tasks::cycle_task(sequencer)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
