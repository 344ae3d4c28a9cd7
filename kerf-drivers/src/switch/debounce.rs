//! Debounced switch input
//!
//! A level change is accepted only after the raw reading has held the
//! new level for the whole debounce interval. Shorter glitches are
//! discarded without ever showing up in the stable level.

use embedded_hal::digital::InputPin;
use kerf_core::traits::DebouncedInput;

/// Stable-interval debouncer, independent of any pin
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    interval_ms: u32,
    stable: bool,
    last_raw: bool,
    last_change_ms: u64,
    /// Latched inactive-to-active transition, cleared on read
    rose: bool,
}

impl Debouncer {
    /// Create a debouncer already settled at `initial`
    pub fn new(interval_ms: u32, initial: bool) -> Self {
        Self {
            interval_ms,
            stable: initial,
            last_raw: initial,
            last_change_ms: 0,
            rose: false,
        }
    }

    /// Feed one raw sample; returns true if the stable level changed
    pub fn update(&mut self, raw: bool, now_ms: u64) -> bool {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
            return false;
        }

        let held_ms = now_ms.saturating_sub(self.last_change_ms);
        if raw != self.stable && held_ms >= self.interval_ms as u64 {
            self.stable = raw;
            if raw {
                self.rose = true;
            }
            return true;
        }
        false
    }

    pub fn level(&self) -> bool {
        self.stable
    }

    /// Take the latched rising edge
    pub fn take_rose(&mut self) -> bool {
        core::mem::take(&mut self.rose)
    }
}

/// Debounced switch on a GPIO input
pub struct DebouncedSwitch<P> {
    pin: P,
    /// If true, the switch is active when the pin reads LOW
    inverted: bool,
    debouncer: Debouncer,
}

impl<P: InputPin> DebouncedSwitch<P> {
    /// Create a switch, sampling the pin for the initial level
    ///
    /// The initial level never produces an edge.
    ///
    /// # Arguments
    /// - `pin`: The GPIO input
    /// - `inverted`: If true, the switch is active when the pin is LOW
    /// - `interval_ms`: Debounce interval
    pub fn new(mut pin: P, inverted: bool, interval_ms: u32) -> Self {
        let initial = match pin.is_high() {
            Ok(high) => high != inverted,
            Err(_) => false,
        };
        Self {
            pin,
            inverted,
            debouncer: Debouncer::new(interval_ms, initial),
        }
    }

    /// Read the raw, polarity-corrected level
    fn sample(&mut self) -> Option<bool> {
        self.pin.is_high().ok().map(|high| high != self.inverted)
    }
}

impl<P: InputPin> DebouncedInput for DebouncedSwitch<P> {
    fn poll(&mut self, now_ms: u64) {
        // A failed read keeps the previous sample
        if let Some(active) = self.sample() {
            self.debouncer.update(active, now_ms);
        }
    }

    fn is_active(&self) -> bool {
        self.debouncer.level()
    }

    fn rose(&mut self) -> bool {
        self.debouncer.take_rose()
    }
}
