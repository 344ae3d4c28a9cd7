//! Configuration loading
//!
//! Parses the embedded `machine.toml`. Falls back to the compiled
//! reference configuration if it does not load.

use defmt::*;

use kerf_core::config::{load_config, LoadError, MachineConfig};

/// Load the machine configuration from TOML source
pub fn load(source: &str) -> MachineConfig {
    match load_config(source) {
        Ok(config) => {
            info!(
                "Configuration loaded: {} steps/unit, cut {} steps, position {} steps",
                config.cycle.steps_per_unit,
                config.cut.stroke(config.cycle.steps_per_unit).steps(),
                config.position.stroke(config.cycle.steps_per_unit).steps()
            );
            config
        }
        Err(LoadError::Parse(e)) => {
            error!("machine.toml line {}: {:?}, using defaults", e.line, e.kind);
            MachineConfig::default()
        }
        Err(LoadError::Invalid(e)) => {
            error!("machine.toml rejected: {:?}, using defaults", e);
            MachineConfig::default()
        }
    }
}
