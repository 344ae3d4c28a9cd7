//! Switch input drivers

pub mod debounce;

pub use debounce::{DebouncedSwitch, Debouncer};
