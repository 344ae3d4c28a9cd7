//! Parse and validate a configuration in one step

use super::toml::{parse_config, ParseError};
use super::types::{ConfigError, MachineConfig};

/// Why a configuration could not be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// The file is not valid machine TOML
    Parse(ParseError),
    /// The file parsed but describes an unusable machine
    Invalid(ConfigError),
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Parse `source` and check that the sequencer can run with it
pub fn load_config(source: &str) -> Result<MachineConfig, LoadError> {
    let config = parse_config(source)?;
    config.validate()?;
    Ok(config)
}
