//! Software step generator with a trapezoidal speed profile
//!
//! Steps are timed with the constant-acceleration recurrence from
//! D. Austin, "Generate stepper-motor speed profiles in real time"
//! (2005). The step interval starts at `c0` (derived from the
//! acceleration), shrinks by `2·cn / (4n + 1)` each step until it reaches
//! the interval for the maximum speed, and grows again once the
//! remaining distance is no longer than the distance needed to stop.
//!
//! `run` never blocks apart from the step pulse width and emits at most
//! one step per call, so it must be called far more often than the
//! shortest step interval.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use kerf_core::config::AxisHwConfig;
use kerf_core::traits::MotionAxis;

/// Step pulse active time (µs)
const PULSE_WIDTH_US: u32 = 1;

/// Direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Direction {
    /// Toward positive positions
    Positive,
    /// Toward negative positions
    Negative,
}

/// Stepper axis on a step/direction driver
pub struct AccelStepper<STEP, DIR, D> {
    step_pin: STEP,
    dir_pin: DIR,
    delay: D,

    /// Direction output is inverted
    dir_inverted: bool,
    /// Step output idles high and pulses low
    step_inverted: bool,

    current_pos: i32,
    target_pos: i32,
    /// Signed speed (steps/s)
    speed: f32,
    max_speed: f32,
    acceleration: f32,
    /// Current step interval (µs), 0 when stopped
    step_interval_us: u32,
    last_step_us: u64,
    direction: Direction,

    /// Step counter within the current ramp; negative while decelerating
    n: i32,
    /// Initial step interval (µs)
    c0: f32,
    /// Last step interval (µs)
    cn: f32,
    /// Step interval at maximum speed (µs)
    cmin: f32,
}

impl<STEP, DIR, D> AccelStepper<STEP, DIR, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    D: DelayNs,
{
    /// Create a stepper with non-inverted outputs
    ///
    /// Speed and acceleration start at 1 step/s and 1 step/s²; set both
    /// before the first move.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: D) -> Self {
        let mut stepper = Self {
            step_pin,
            dir_pin,
            delay,
            dir_inverted: false,
            step_inverted: false,
            current_pos: 0,
            target_pos: 0,
            speed: 0.0,
            max_speed: 0.0,
            acceleration: 0.0,
            step_interval_us: 0,
            last_step_us: 0,
            direction: Direction::Negative,
            n: 0,
            c0: 0.0,
            cn: 0.0,
            cmin: 1.0,
        };
        stepper.step_idle();
        stepper.set_max_speed_f32(1.0);
        stepper.set_acceleration_f32(1.0);
        stepper
    }

    /// Invert the direction and step outputs
    ///
    /// An inverted step output idles high and pulses low.
    pub fn set_pins_inverted(&mut self, dir_inverted: bool, step_inverted: bool) {
        self.dir_inverted = dir_inverted;
        self.step_inverted = step_inverted;
        self.step_idle();
    }

    /// Take the output polarity from the axis pin configuration
    pub fn set_polarity(&mut self, pins: &AxisHwConfig) {
        self.set_pins_inverted(pins.dir_pin.inverted, pins.step_pin.inverted);
    }

    /// Signed speed (steps/s)
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Interval until the next step (µs), 0 when stopped
    pub fn step_interval_us(&self) -> u32 {
        self.step_interval_us
    }

    /// Redefine the current position; stops immediately
    pub fn set_current_position(&mut self, position: i32) {
        self.current_pos = position;
        self.target_pos = position;
        self.n = 0;
        self.step_interval_us = 0;
        self.speed = 0.0;
    }

    fn set_max_speed_f32(&mut self, speed: f32) {
        let speed = if speed < 0.0 { -speed } else { speed };
        if speed == 0.0 || self.max_speed == speed {
            return;
        }
        self.max_speed = speed;
        self.cmin = 1_000_000.0 / speed;
        // Already ramping: recompute where in the ramp we are
        if self.n > 0 {
            self.n = self.steps_to_stop();
            self.compute_new_speed();
        }
    }

    fn set_acceleration_f32(&mut self, acceleration: f32) {
        let acceleration = if acceleration < 0.0 {
            -acceleration
        } else {
            acceleration
        };
        if acceleration == 0.0 || self.acceleration == acceleration {
            return;
        }
        // Rescale the ramp position to the new rate
        self.n = (self.n as f32 * (self.acceleration / acceleration)) as i32;
        self.c0 = 0.676 * libm::sqrtf(2.0 / acceleration) * 1_000_000.0;
        self.acceleration = acceleration;
        self.compute_new_speed();
    }

    /// Steps needed to stop from the current speed
    fn steps_to_stop(&self) -> i32 {
        ((self.speed * self.speed) / (2.0 * self.acceleration)) as i32
    }

    /// Recompute the step interval after a step or a target change
    fn compute_new_speed(&mut self) {
        let distance = self.distance_to_go();
        let steps_to_stop = self.steps_to_stop();

        if distance == 0 && steps_to_stop <= 1 {
            self.step_interval_us = 0;
            self.speed = 0.0;
            self.n = 0;
            return;
        }

        if distance > 0 {
            // Target ahead in the positive direction
            if self.n > 0 {
                if steps_to_stop >= distance || self.direction == Direction::Negative {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0
                && steps_to_stop < distance
                && self.direction == Direction::Positive
            {
                self.n = -self.n;
            }
        } else if distance < 0 {
            if self.n > 0 {
                if steps_to_stop >= -distance || self.direction == Direction::Positive {
                    self.n = -steps_to_stop;
                }
            } else if self.n < 0
                && steps_to_stop < -distance
                && self.direction == Direction::Negative
            {
                self.n = -self.n;
            }
        }

        if self.n == 0 {
            // First step from rest
            self.cn = self.c0;
            self.direction = if distance > 0 {
                Direction::Positive
            } else {
                Direction::Negative
            };
        } else {
            self.cn -= (2.0 * self.cn) / ((4.0 * self.n as f32) + 1.0);
            if self.cn < self.cmin {
                self.cn = self.cmin;
            }
        }
        self.n += 1;
        self.step_interval_us = self.cn as u32;
        self.speed = 1_000_000.0 / self.cn;
        if self.direction == Direction::Negative {
            self.speed = -self.speed;
        }
    }

    /// Emit a step if one is due; returns true if a step was taken
    fn run_speed(&mut self, now_us: u64) -> bool {
        if self.step_interval_us == 0 {
            return false;
        }
        if now_us.saturating_sub(self.last_step_us) < self.step_interval_us as u64 {
            return false;
        }

        match self.direction {
            Direction::Positive => self.current_pos += 1,
            Direction::Negative => self.current_pos -= 1,
        }
        self.pulse();
        self.last_step_us = now_us;
        true
    }

    fn pulse(&mut self) {
        let positive = self.direction == Direction::Positive;
        let _ = if positive != self.dir_inverted {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };
        let _ = if self.step_inverted {
            self.step_pin.set_low()
        } else {
            self.step_pin.set_high()
        };
        self.delay.delay_us(PULSE_WIDTH_US);
        self.step_idle();
    }

    fn step_idle(&mut self) {
        let _ = if self.step_inverted {
            self.step_pin.set_high()
        } else {
            self.step_pin.set_low()
        };
    }
}

impl<STEP, DIR, D> MotionAxis for AccelStepper<STEP, DIR, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    D: DelayNs,
{
    fn set_max_speed(&mut self, steps_per_s: u32) {
        self.set_max_speed_f32(steps_per_s as f32);
    }

    fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.set_acceleration_f32(steps_per_s2 as f32);
    }

    fn move_to(&mut self, target: i32) {
        if self.target_pos != target {
            self.target_pos = target;
            self.compute_new_speed();
        }
    }

    fn run(&mut self, now_us: u64) -> bool {
        if self.run_speed(now_us) {
            self.compute_new_speed();
        }
        self.speed != 0.0 || self.distance_to_go() != 0
    }

    fn distance_to_go(&self) -> i32 {
        self.target_pos - self.current_pos
    }

    fn current_position(&self) -> i32 {
        self.current_pos
    }

    fn target_position(&self) -> i32 {
        self.target_pos
    }

    fn stop_and_zero(&mut self) {
        self.set_current_position(0);
    }

    fn halt(&mut self) {
        self.set_current_position(self.current_pos);
    }
}
