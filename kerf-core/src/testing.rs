//! Simulated collaborators for host tests

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use crate::config::MachineConfig;
use crate::motion::{Axis, AxisRole};
use crate::sequencer::{CycleSequencer, MachineIo};
use crate::state::{CycleState, Event};
use crate::traits::{Clamp, DebouncedInput, MotionAxis};

/// Axis that moves one step toward its target on every `run`
///
/// `physical` tracks the carriage relative to its home switch and is not
/// affected by `stop_and_zero`, so tests can model a switch that asserts
/// at a fixed place on the rail.
#[derive(Debug, Clone)]
pub struct SimAxis {
    pub position: i32,
    pub target: i32,
    pub physical: Rc<Cell<i64>>,
    pub max_speed: u32,
    pub acceleration: u32,
    pub steps_emitted: u32,
}

impl SimAxis {
    pub fn new() -> Self {
        Self::at_physical(0)
    }

    pub fn at_physical(physical: i64) -> Self {
        Self {
            position: 0,
            target: 0,
            physical: Rc::new(Cell::new(physical)),
            max_speed: 0,
            acceleration: 0,
            steps_emitted: 0,
        }
    }
}

impl MotionAxis for SimAxis {
    fn set_max_speed(&mut self, steps_per_s: u32) {
        self.max_speed = steps_per_s;
    }

    fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.acceleration = steps_per_s2;
    }

    fn move_to(&mut self, target: i32) {
        self.target = target;
    }

    fn run(&mut self, _now_us: u64) -> bool {
        let delta = (self.target - self.position).signum();
        if delta != 0 {
            self.position += delta;
            self.physical.set(self.physical.get() + delta as i64);
            self.steps_emitted += 1;
        }
        self.target != self.position
    }

    fn distance_to_go(&self) -> i32 {
        self.target - self.position
    }

    fn current_position(&self) -> i32 {
        self.position
    }

    fn target_position(&self) -> i32 {
        self.target
    }

    fn stop_and_zero(&mut self) {
        self.position = 0;
        self.target = 0;
    }

    fn halt(&mut self) {
        self.target = self.position;
    }
}

/// Switch whose debounced level is set directly by the test
#[derive(Debug, Clone, Default)]
pub struct SimSwitch {
    active: bool,
    edge: bool,
    pub polls: u32,
}

impl SimSwitch {
    pub fn new(active: bool) -> Self {
        Self {
            active,
            edge: false,
            polls: 0,
        }
    }

    pub fn set(&mut self, active: bool) {
        if active && !self.active {
            self.edge = true;
        }
        self.active = active;
    }

    /// Press and release within one tick, leaving only the edge behind
    pub fn tap(&mut self) {
        self.set(true);
        self.active = false;
    }
}

impl DebouncedInput for SimSwitch {
    fn poll(&mut self, _now_ms: u64) {
        self.polls += 1;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn rose(&mut self) -> bool {
        core::mem::take(&mut self.edge)
    }
}

/// Clamp that records every commanded level
#[derive(Debug, Clone, Default)]
pub struct SimClamp {
    engaged: bool,
    pub history: Vec<bool>,
}

impl SimClamp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clamp for SimClamp {
    fn engage(&mut self) {
        self.engaged = true;
        self.history.push(true);
    }

    fn disengage(&mut self) {
        self.engaged = false;
        self.history.push(false);
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }
}

pub type SimSequencer = CycleSequencer<SimAxis, SimSwitch, SimClamp>;

/// A simulated machine: one poll per millisecond, home switches
/// following the carriage positions
pub struct Rig {
    pub seq: SimSequencer,
    pub now_us: u64,
    /// Force a home switch level regardless of the carriage
    pub cut_home_stuck: Option<bool>,
    pub position_home_stuck: Option<bool>,
}

impl Rig {
    pub fn new(config: MachineConfig) -> Self {
        Self::with_carriages(config, -30, -12)
    }

    pub fn with_carriages(config: MachineConfig, cut: i64, position: i64) -> Self {
        let io = MachineIo {
            cut_axis: Axis::new(AxisRole::Cut, SimAxis::at_physical(cut)),
            position_axis: Axis::new(AxisRole::Position, SimAxis::at_physical(position)),
            cut_home: SimSwitch::new(cut >= 0),
            position_home: SimSwitch::new(position >= 0),
            run_switch: SimSwitch::new(false),
            reload_switch: SimSwitch::new(false),
            position_clamp: SimClamp::new(),
            secure_clamp: SimClamp::new(),
        };
        Self {
            seq: CycleSequencer::new(&config, io),
            now_us: 0,
            cut_home_stuck: None,
            position_home_stuck: None,
        }
    }

    /// Build a rig and run it until homing has finished
    pub fn homed(config: MachineConfig) -> Self {
        let mut rig = Self::new(config);
        assert!(rig.run_until(|s| s == CycleState::Idle, 10_000));
        rig
    }

    pub fn tick(&mut self) -> Option<Event> {
        let io = self.seq.io_mut();
        let cut_home = self
            .cut_home_stuck
            .unwrap_or(io.cut_axis.driver().physical.get() >= 0);
        let position_home = self
            .position_home_stuck
            .unwrap_or(io.position_axis.driver().physical.get() >= 0);
        io.cut_home.set(cut_home);
        io.position_home.set(position_home);

        let event = self.seq.poll(self.now_us);
        self.now_us += 1000;
        event
    }

    /// Tick until `done` holds for the current state; false on budget
    pub fn run_until(&mut self, done: impl Fn(CycleState) -> bool, max_ticks: u32) -> bool {
        for _ in 0..max_ticks {
            if done(self.seq.state()) {
                return true;
            }
            self.tick();
        }
        done(self.seq.state())
    }

    /// Tick and collect every event until `done` holds
    pub fn events_until(&mut self, done: impl Fn(CycleState) -> bool, max_ticks: u32) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..max_ticks {
            if done(self.seq.state()) {
                break;
            }
            if let Some(event) = self.tick() {
                events.push(event);
            }
        }
        events
    }

    /// Tick a fixed number of times and collect every event
    pub fn events_for(&mut self, ticks: u32) -> Vec<Event> {
        (0..ticks).filter_map(|_| self.tick()).collect()
    }

    pub fn clamps(&self) -> (bool, bool) {
        let io = self.seq.io();
        (io.position_clamp.is_engaged(), io.secure_clamp.is_engaged())
    }

    pub fn clamp_writes(&self) -> usize {
        let io = self.seq.io();
        io.position_clamp.history.len() + io.secure_clamp.history.len()
    }
}
