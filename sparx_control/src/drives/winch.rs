//! Winch-based climb.
//!
//! The drive motors double as the winch once the hooks are set. Unlike the
//! distance drive, side balance is corrected from the measured speeds.

use sparx_common::consts::{
    FIX_SPEED_SCALE_RAMPING, MAX_SCALE_SPEED_OFF, MIN_SCALE_SPEED, SCALE_RAMPING,
};

use super::TankPowers;

/// Climb state owned by Drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WinchState {
    #[default]
    Standby,
    /// Armed, waiting for both hooks and the go-ahead.
    Hooks,
    /// Ramped winch toward the wanted distance.
    Scaling,
    /// Winch power supplied by the operator.
    ManualScaling,
}

/// Square-root ramp of the winch, clamped to `[MIN_SCALE_SPEED, 1]`.
pub fn winch_ramp(wanted: f64, current: f64) -> f64 {
    (SCALE_RAMPING * (wanted - current).abs().sqrt())
        .min(1.0)
        .max(MIN_SCALE_SPEED)
}

/// Split `power` between the sides, boosting the slower one.
pub fn winch_powers(power: f64, left_speed: f64, right_speed: f64) -> TankPowers {
    let boosted = (power * FIX_SPEED_SCALE_RAMPING).min(1.0);
    if (left_speed - right_speed).abs() < MAX_SCALE_SPEED_OFF {
        TankPowers::new(power, power)
    } else if left_speed < right_speed {
        TankPowers::new(boosted, power)
    } else {
        TankPowers::new(power, boosted)
    }
}

/// True once the winch has pulled in `wanted`.
#[inline]
pub fn winch_finished(current: f64, wanted: f64) -> bool {
    current.abs() >= wanted.abs()
}
