//! Subsystem fault flags.
//!
//! Runtime faults never abort a tick. A subsystem latches them here, logs
//! them, and keeps writing safe outputs. Flags stay set until cleared by the
//! owner (`clear_faults`).

use bitflags::bitflags;

bitflags! {
    /// Latched runtime faults of a subsystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultFlags: u8 {
        /// Climb requested without both hooks engaged. Retried every tick.
        const HOOKS_MISSING = 0x01;
        /// Shift request arrived while a shift was in progress and was dropped.
        const SHIFT_DROPPED = 0x02;
        /// Fire requested while the flipper was already firing.
        const FIRE_REJECTED = 0x04;
    }
}

impl Default for FaultFlags {
    fn default() -> Self {
        Self::empty()
    }
}
