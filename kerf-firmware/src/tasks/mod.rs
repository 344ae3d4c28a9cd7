//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod cycle;
pub mod status;

pub use cycle::cycle_task;
pub use status::status_task;
