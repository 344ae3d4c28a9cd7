//! Configuration types
//!
//! Board-agnostic configuration structures and the reader for the
//! deployment file `machine.toml`.

pub mod hardware;
pub mod load;
pub mod toml;
pub mod types;

pub use hardware::*;
pub use load::{load_config, LoadError};
pub use toml::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
