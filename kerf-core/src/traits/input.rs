//! Debounced switch input trait

/// A digital switch filtered against contact bounce
///
/// "Active" is the logical sense after pin polarity has been applied:
/// a home switch is active when its axis sits at home, the run switch is
/// active while a cycle is requested.
pub trait DebouncedInput {
    /// Sample the raw input and update debounce timing
    ///
    /// Must be called on every scheduler tick.
    fn poll(&mut self, now_ms: u64);

    /// Stable (debounced) level
    fn is_active(&self) -> bool;

    /// Returns `true` exactly once per inactive-to-active transition
    ///
    /// The edge is consumed by the read.
    fn rose(&mut self) -> bool;
}
