//! Cycle sequencer state handling
//!
//! Each poll runs at most one state step. Clamp settle delays and the
//! second run-switch sample are deadlines rather than blocking waits:
//! while a deadline is pending the switches keep debouncing but no state
//! action runs. Multi-step states track their progress in `stage`, where
//! stage 0 is the entry action.

use super::io::MachineIo;
use crate::config::MachineConfig;
use crate::motion::{Homing, HomingStatus, SpeedMode, StrokeOffset};
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::state::{CycleState, Event};
use crate::traits::{Clamp, DebouncedInput, MotionAxis};

/// The machine's top-level state machine
pub struct CycleSequencer<A, S, K>
where
    A: MotionAxis,
    S: DebouncedInput,
    K: Clamp,
{
    io: MachineIo<A, S, K>,
    config: MachineConfig,
    state: CycleState,
    /// Progress within the current state
    stage: u8,
    /// No state action runs before this time (ms)
    wait_until_ms: Option<u64>,
    /// Run switch was active and is sampled again once the wait ends
    run_confirm_pending: bool,
    homing: Homing,
    watchdog: SafetyMonitor,
    cut_stroke: StrokeOffset,
    position_stroke: StrokeOffset,
    started: bool,
    ignored_reloads: u32,
    cycles_completed: u32,
}

impl<A, S, K> CycleSequencer<A, S, K>
where
    A: MotionAxis,
    S: DebouncedInput,
    K: Clamp,
{
    /// Create a sequencer; the first poll starts homing
    pub fn new(config: &MachineConfig, io: MachineIo<A, S, K>) -> Self {
        let spu = config.cycle.steps_per_unit;
        Self {
            io,
            config: config.clone(),
            state: CycleState::Homing,
            stage: 0,
            wait_until_ms: None,
            run_confirm_pending: false,
            homing: Homing::new(config.cycle.homing_seek_steps),
            watchdog: SafetyMonitor::from_config(&config.cycle),
            cut_stroke: config.cut.stroke(spu),
            position_stroke: config.position.stroke(spu),
            started: false,
            ignored_reloads: 0,
            cycles_completed: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn io(&self) -> &MachineIo<A, S, K> {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut MachineIo<A, S, K> {
        &mut self.io
    }

    /// Current (cut, position) axis positions in steps
    pub fn axis_positions(&self) -> (i32, i32) {
        (
            self.io.cut_axis.current_position(),
            self.io.position_axis.current_position(),
        )
    }

    pub fn is_homed(&self) -> bool {
        self.io.is_homed()
    }

    /// Reload presses dropped because the machine could not honour them
    pub fn ignored_reloads(&self) -> u32 {
        self.ignored_reloads
    }

    /// Completed production cycles since boot
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Check if a settle or confirmation wait is pending
    pub fn is_waiting(&self, now_ms: u64) -> bool {
        self.wait_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Advance the machine by one step
    ///
    /// Returns the event processed on this poll, if any.
    pub fn poll(&mut self, now_us: u64) -> Option<Event> {
        let now_ms = now_us / 1000;
        if !self.started {
            self.started = true;
            self.watchdog.state_entered(now_ms);
        }

        self.io.poll_switches(now_ms);

        // Reload edges outside Idle and Fault are dropped, not deferred
        if !self.state.accepts_reload() && self.io.reload_switch.rose() {
            self.ignored_reloads = self.ignored_reloads.saturating_add(1);
        }

        if self.is_waiting(now_ms) {
            return None;
        }
        self.wait_until_ms = None;

        if let SafetyStatus::Fault(kind) = self.watchdog.check(self.state, now_ms) {
            return Some(self.apply(Event::FaultDetected(kind), now_ms));
        }

        let event = self.step(now_us, now_ms)?;
        Some(self.apply(event, now_ms))
    }

    fn apply(&mut self, event: Event, now_ms: u64) -> Event {
        let next = self.state.transition(event);
        if next != self.state {
            self.state = next;
            self.stage = 0;
            self.run_confirm_pending = false;
            self.watchdog.state_entered(now_ms);
        }
        event
    }

    fn wait(&mut self, now_ms: u64, ms: u32) {
        self.wait_until_ms = Some(now_ms + ms as u64);
    }

    /// Start a clamp settle delay and move to the next stage
    fn settle(&mut self, now_ms: u64) {
        self.wait(now_ms, self.config.cycle.clamp_settle_ms);
        self.stage += 1;
    }

    fn apply_speeds(&mut self, mode: SpeedMode) {
        self.io.cut_axis.apply_speed(&self.config, mode);
        self.io.position_axis.apply_speed(&self.config, mode);
    }

    fn step(&mut self, now_us: u64, now_ms: u64) -> Option<Event> {
        match self.state {
            CycleState::Homing => self.step_homing(now_us, now_ms),
            CycleState::Idle => self.step_idle(now_ms),
            CycleState::ReloadWait => match self.stage {
                0 => {
                    self.io.set_clamps(false, false);
                    self.settle(now_ms);
                    None
                }
                _ => Some(Event::ReloadComplete),
            },
            CycleState::ClampingForCut => match self.stage {
                0 => {
                    self.io.set_clamps(true, true);
                    self.settle(now_ms);
                    None
                }
                _ => Some(Event::ClampsEngaged),
            },
            CycleState::Cutting => {
                if self.stage == 0 {
                    self.io.cut_axis.apply_speed(&self.config, SpeedMode::Normal);
                    self.io.cut_axis.move_to(self.cut_stroke.target());
                    self.stage = 1;
                }
                self.io.cut_axis.run(now_us);
                self.io.cut_axis.is_at_target().then_some(Event::CutComplete)
            }
            CycleState::ReleasingPositionClamp => match self.stage {
                0 => {
                    self.settle(now_ms);
                    None
                }
                1 => {
                    self.io.position_clamp.disengage();
                    self.settle(now_ms);
                    None
                }
                _ => Some(Event::PositionClampReleased),
            },
            CycleState::ReturningBothAxes => {
                if self.stage == 0 {
                    self.apply_speeds(SpeedMode::Return);
                    self.io.cut_axis.move_to(StrokeOffset::HOME.target());
                    self.io.position_axis.move_to(StrokeOffset::HOME.target());
                    self.stage = 1;
                }
                self.io.cut_axis.run(now_us);
                self.io.position_axis.run(now_us);
                let home =
                    self.io.cut_axis.is_at_target() && self.io.position_axis.is_at_target();
                home.then_some(Event::AxesHome)
            }
            CycleState::ReclampingForPosition => match self.stage {
                0 => {
                    self.apply_speeds(SpeedMode::Normal);
                    self.settle(now_ms);
                    None
                }
                1 => {
                    self.io.secure_clamp.disengage();
                    self.io.position_clamp.engage();
                    self.settle(now_ms);
                    None
                }
                _ => Some(Event::PositionClampEngaged),
            },
            CycleState::Positioning => {
                if self.stage == 0 {
                    self.io.position_axis.move_to(self.position_stroke.target());
                    self.stage = 1;
                }
                self.io.position_axis.run(now_us);
                if self.io.position_axis.is_at_target() {
                    self.cycles_completed = self.cycles_completed.saturating_add(1);
                    Some(Event::PositionComplete)
                } else {
                    None
                }
            }
            CycleState::CycleCompleteCheck => self.step_complete_check(now_ms),
            CycleState::Fault(_) => {
                if self.stage == 0 {
                    // Stop in place; the step count no longer matches the rail
                    self.io.cut_axis.invalidate();
                    self.io.position_axis.invalidate();
                    self.stage = 1;
                }
                self.io.reload_switch.rose().then_some(Event::FaultCleared)
            }
        }
    }

    fn step_homing(&mut self, now_us: u64, now_ms: u64) -> Option<Event> {
        if self.stage == 0 {
            self.io.set_clamps(false, false);
            self.apply_speeds(SpeedMode::Normal);
            self.settle(now_ms);
            return None;
        }

        let io = &mut self.io;
        let status = self.homing.poll(
            &mut io.cut_axis,
            &mut io.position_axis,
            &io.cut_home,
            &io.position_home,
            now_us,
        );
        (status == HomingStatus::Complete).then_some(Event::HomingComplete)
    }

    fn step_idle(&mut self, now_ms: u64) -> Option<Event> {
        if self.io.reload_switch.rose() {
            if StrokeOffset::is_extended(self.io.position_axis.current_position()) {
                return Some(Event::ReloadAccepted);
            }
            self.ignored_reloads = self.ignored_reloads.saturating_add(1);
        }

        if self.run_confirm_pending {
            self.run_confirm_pending = false;
            return self
                .io
                .run_switch
                .is_active()
                .then_some(Event::RunConfirmed);
        }

        if self.io.run_switch.is_active() {
            self.run_confirm_pending = true;
            self.wait(now_ms, self.config.cycle.switch_debounce_ms);
        }
        None
    }

    fn step_complete_check(&mut self, now_ms: u64) -> Option<Event> {
        if self.stage > 0 {
            return Some(Event::RunReleased);
        }

        if !self.io.run_switch.is_active() {
            self.settle(now_ms);
            None
        } else if self.config.cycle.repeat_while_held {
            Some(Event::RunStillHeld)
        } else {
            None
        }
    }
}
