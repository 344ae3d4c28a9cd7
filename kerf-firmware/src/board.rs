//! Board wiring
//!
//! GPIO numbers are fixed by the controller board. The configuration
//! still lists them so that a mismatch between file and board shows up
//! in the log.

use defmt::*;
use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;
use embassy_time::Delay;

use kerf_core::config::{AxisHwConfig, HardwareConfig, PinConfig};
use kerf_core::sequencer::CycleSequencer;
use kerf_drivers::clamp::GpioClamp;
use kerf_drivers::stepper::AccelStepper;
use kerf_drivers::switch::DebouncedSwitch;

pub type Stepper = AccelStepper<Output<'static>, Output<'static>, Delay>;
pub type Switch = DebouncedSwitch<Input<'static>>;
pub type ClampOutput = GpioClamp<Output<'static>>;
pub type Sequencer = CycleSequencer<Stepper, Switch, ClampOutput>;

/// GPIO wiring of the board, in `HardwareConfig::pins` order
const WIRED_PINS: [(&str, u8); 10] = [
    ("cut step", 11),
    ("cut dir", 12),
    ("cut home", 7),
    ("position step", 5),
    ("position dir", 6),
    ("position home", 8),
    ("run switch", 9),
    ("reload switch", 10),
    ("position clamp", 3),
    ("secure clamp", 4),
];

/// Warn about configured pins that differ from the board wiring
pub fn check_wiring(hw: &HardwareConfig) {
    let mut mismatches = 0;
    for ((name, wired), configured) in WIRED_PINS.iter().zip(hw.pins()) {
        if configured.pin != *wired {
            warn!(
                "{} configured on GPIO{} but wired to GPIO{}",
                name, configured.pin, wired
            );
            mismatches += 1;
        }
    }
    if mismatches == 0 {
        info!("Pin configuration matches board wiring");
    }
}

/// Build a stepper with the configured step and direction polarity
///
/// The step output starts at its idle level.
pub fn stepper(
    step: Peri<'static, AnyPin>,
    dir: Peri<'static, AnyPin>,
    pins: &AxisHwConfig,
) -> Stepper {
    let mut stepper = AccelStepper::new(
        Output::new(step, Level::from(pins.step_pin.level_for(false))),
        Output::new(dir, Level::Low),
        Delay,
    );
    stepper.set_polarity(pins);
    stepper
}

/// Input pull for a switch pin
pub fn pull(pin: &PinConfig) -> Pull {
    if pin.pull_up {
        Pull::Up
    } else {
        Pull::None
    }
}
