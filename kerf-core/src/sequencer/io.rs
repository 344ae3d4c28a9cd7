//! Hardware context owned by the sequencer

use crate::motion::Axis;
use crate::traits::{Clamp, DebouncedInput, MotionAxis};

/// All machine I/O, generic over the collaborator traits
///
/// Nothing in here knows about the cycle; the sequencer issues every
/// command.
pub struct MachineIo<A, S, K>
where
    A: MotionAxis,
    S: DebouncedInput,
    K: Clamp,
{
    pub cut_axis: Axis<A>,
    pub position_axis: Axis<A>,
    /// Active while the cut carriage sits at home
    pub cut_home: S,
    /// Active while the position carriage sits at home
    pub position_home: S,
    pub run_switch: S,
    pub reload_switch: S,
    pub position_clamp: K,
    pub secure_clamp: K,
}

impl<A, S, K> MachineIo<A, S, K>
where
    A: MotionAxis,
    S: DebouncedInput,
    K: Clamp,
{
    /// Update debounce state of every switch
    pub fn poll_switches(&mut self, now_ms: u64) {
        self.cut_home.poll(now_ms);
        self.position_home.poll(now_ms);
        self.run_switch.poll(now_ms);
        self.reload_switch.poll(now_ms);
    }

    /// Command both clamps
    pub fn set_clamps(&mut self, position: bool, secure: bool) {
        self.position_clamp.set_engaged(position);
        self.secure_clamp.set_engaged(secure);
    }

    /// Check if both axes are homed
    pub fn is_homed(&self) -> bool {
        self.cut_axis.is_homed() && self.position_axis.is_homed()
    }
}
