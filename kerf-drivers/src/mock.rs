//! Mock GPIO pins for driver tests

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Output pin that counts rising edges
#[derive(Debug, Default)]
pub struct MockOutput {
    pub high: bool,
    pub rises: u32,
}

impl ErrorType for MockOutput {
    type Error = Infallible;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            self.rises += 1;
        }
        self.high = true;
        Ok(())
    }
}

/// Input pin driven by the test
#[derive(Debug, Default)]
pub struct MockInput {
    pub high: bool,
}

impl MockInput {
    pub fn new(high: bool) -> Self {
        Self { high }
    }
}

impl ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Delay that returns immediately
#[derive(Debug, Default)]
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
