//! Two-speed gearbox shift machine.
//!
//! IN_LOW_GEAR → SHIFTING_HIGH → IN_HIGH_GEAR → SHIFTING_LOW → IN_LOW_GEAR.
//!
//! The dog clutch needs near-zero torque to engage, so every shift starts
//! by clamping the commanded powers to `SHIFTING_POWER` and keeps the clamp
//! for `SHIFTING_TIME`. Speed-triggered shifts are rate limited by
//! `SHIFT_MIN_BETWEEN`; driver-manual toggles are not.

use sparx_common::consts::{
    LOWER_SHIFTING_SPEED, SHIFT_MIN_BETWEEN, SHIFTING_POWER, SHIFTING_TIME, UPPER_SHIFTING_SPEED,
};

use super::TankPowers;

/// Gearbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    #[default]
    InLowGear,
    ShiftingLow,
    InHighGear,
    ShiftingHigh,
}

impl ShiftState {
    #[inline]
    pub const fn is_shifting(self) -> bool {
        matches!(self, Self::ShiftingLow | Self::ShiftingHigh)
    }

    /// Shifter solenoid level for this state (`true` = high gear).
    #[inline]
    pub const fn shifter_high(self) -> bool {
        matches!(self, Self::ShiftingHigh | Self::InHighGear)
    }
}

/// Inputs sampled once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftInputs {
    pub now: f64,
    pub avg_speed: f64,
    /// Driver-manual shifting enabled.
    pub driver_shift: bool,
    /// One-shot shift request consumed this tick.
    pub toggle: bool,
    /// Forbid upshifts, force a downshift.
    pub hold_first: bool,
    /// Scale-drive override active.
    pub scale: bool,
}

/// Result of one shift step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftTransition {
    /// No state change.
    None,
    /// Entered a shifting state.
    Started(ShiftState),
    /// Shift complete, new gear engaged.
    Engaged(ShiftState),
    /// A toggle arrived while a shift was in progress and was discarded.
    ToggleDropped,
}

/// Gearbox shift state machine.
#[derive(Debug, Clone)]
pub struct ShiftMachine {
    state: ShiftState,
    /// End of the current shift [s].
    shift_end: f64,
    /// Start of the last speed-triggered shift [s].
    last_auto_shift: f64,
}

impl Default for ShiftMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ShiftMachine {
    pub fn new() -> Self {
        Self {
            state: ShiftState::InLowGear,
            shift_end: 0.0,
            last_auto_shift: f64::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn state(&self) -> ShiftState {
        self.state
    }

    /// Drop back to low gear without a shift sequence (e-stop).
    pub fn force_low(&mut self) {
        self.state = ShiftState::InLowGear;
    }

    /// Advance one tick. May clamp `powers` for the shift.
    pub fn step(&mut self, inputs: &ShiftInputs, powers: &mut TankPowers) -> ShiftTransition {
        let now = inputs.now;
        let cooled_down = now > self.last_auto_shift + SHIFT_MIN_BETWEEN;

        match self.state {
            ShiftState::InLowGear => {
                if inputs.hold_first {
                    return ShiftTransition::None;
                }
                let wanted = if inputs.driver_shift {
                    inputs.toggle
                } else if inputs.avg_speed.abs() >= UPPER_SHIFTING_SPEED
                    && cooled_down
                    && !inputs.scale
                {
                    self.last_auto_shift = now;
                    true
                } else {
                    false
                };
                if wanted {
                    return self.begin(ShiftState::ShiftingHigh, inputs, powers);
                }
                ShiftTransition::None
            }
            ShiftState::InHighGear => {
                let wanted = if inputs.driver_shift {
                    inputs.toggle
                } else if (inputs.avg_speed.abs() <= LOWER_SHIFTING_SPEED && cooled_down)
                    || inputs.hold_first
                    || inputs.scale
                {
                    self.last_auto_shift = now;
                    true
                } else {
                    false
                };
                if wanted {
                    return self.begin(ShiftState::ShiftingLow, inputs, powers);
                }
                ShiftTransition::None
            }
            ShiftState::ShiftingHigh | ShiftState::ShiftingLow => {
                brake_clamp(inputs.avg_speed, powers);
                if now >= self.shift_end {
                    self.state = if self.state == ShiftState::ShiftingHigh {
                        ShiftState::InHighGear
                    } else {
                        ShiftState::InLowGear
                    };
                    return ShiftTransition::Engaged(self.state);
                }
                if inputs.toggle {
                    return ShiftTransition::ToggleDropped;
                }
                ShiftTransition::None
            }
        }
    }

    fn begin(
        &mut self,
        target: ShiftState,
        inputs: &ShiftInputs,
        powers: &mut TankPowers,
    ) -> ShiftTransition {
        self.state = target;
        self.shift_end = inputs.now + SHIFTING_TIME;
        brake_clamp(inputs.avg_speed, powers);
        ShiftTransition::Started(target)
    }
}

/// Clamp both sides to `±SHIFTING_POWER` when the mean command exceeds it.
///
/// The sign is negative while moving with positive speed, positive otherwise.
pub fn brake_clamp(avg_speed: f64, powers: &mut TankPowers) {
    if ((powers.left + powers.right) / 2.0).abs() > SHIFTING_POWER {
        let clamp = if avg_speed > 0.0 {
            -SHIFTING_POWER
        } else {
            SHIFTING_POWER
        };
        powers.left = clamp;
        powers.right = clamp;
    }
}
