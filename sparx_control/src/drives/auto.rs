//! Autonomous motion: distance drive, gyro turn, defense crossing.
//!
//! The profiles are pure functions of the sampled sensors so the Drives
//! tick can stay a flat sequence of state updates.

use sparx_common::consts::{
    AUTO_DRIVE_RAMPING, AUTO_DRIVE_SLACK, COME_DOWN_SPEED, CROSS_SPEED, FAST_TURN_SPEED,
    FAST_TURN_THRESHOLD, FIX_SPEED_DRIVE_RAMPING, FLAT_TOL, LEADING_SIDE_SCALE,
    MAX_AUTO_DRIVE_SPEED, MAX_OFF_DISTANCE_AUTO, MAX_TURN_ERROR, MIN_AUTO_DRIVE_SPEED, RAMP_ANGLE,
    REACH_SPEED, SCALE_DRIVE_FULL_POWER, SCALE_DRIVE_KICK_POWER, SCALE_DRIVE_KICK_TIME,
    SLOW_TURN_SPEED,
};

use super::TankPowers;

/// Autonomous motion in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoState {
    #[default]
    Standby,
    Drive,
    Turn,
    Def,
}

/// Phase of a defense crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefState {
    #[default]
    ReachDef,
    CrossDef,
    ComeDown,
}

// ─── Drive ──────────────────────────────────────────────────────────

/// Mean absolute travel of both sides.
#[inline]
pub fn current_auto_distance(left_dist: f64, right_dist: f64) -> f64 {
    (left_dist.abs() + right_dist.abs()) / 2.0
}

/// Square-root ramp toward `wanted`, clamped to the auto drive range.
pub fn drive_ramp(wanted: f64, current: f64) -> f64 {
    (AUTO_DRIVE_RAMPING * (wanted - current).abs().sqrt())
        .min(MAX_AUTO_DRIVE_SPEED)
        .max(MIN_AUTO_DRIVE_SPEED)
}

/// Powers of a ramped distance drive, before the wiring negation.
///
/// The lagging side is boosted and the leading side slowed when the two
/// travels differ by `MAX_OFF_DISTANCE_AUTO` or more.
pub fn drive_powers(wanted: f64, left_dist: f64, right_dist: f64) -> TankPowers {
    let left = left_dist.abs();
    let right = right_dist.abs();
    let speed = drive_ramp(wanted, current_auto_distance(left_dist, right_dist));

    let boosted = (speed * FIX_SPEED_DRIVE_RAMPING).min(1.0);
    let slowed = (speed * LEADING_SIDE_SCALE).max(MIN_AUTO_DRIVE_SPEED);

    let powers = if (left - right).abs() < MAX_OFF_DISTANCE_AUTO {
        TankPowers::new(speed, speed)
    } else if left < right {
        TankPowers::new(boosted, slowed)
    } else {
        TankPowers::new(slowed, boosted)
    };

    if wanted < 0.0 { powers.negated() } else { powers }
}

/// Fixed profile of the scaling drive: a gentle kick, then full power.
pub fn scale_drive_power(now: f64, started: f64) -> f64 {
    if started + SCALE_DRIVE_KICK_TIME <= now {
        SCALE_DRIVE_FULL_POWER
    } else {
        SCALE_DRIVE_KICK_POWER
    }
}

/// True once the drive is within the stopping slack of its target.
#[inline]
pub fn drive_finished(current: f64, wanted: f64) -> bool {
    current.abs() >= wanted.abs() - AUTO_DRIVE_SLACK
}

// ─── Turn ───────────────────────────────────────────────────────────

/// Powers of an in-place turn toward `target`, or `None` once within
/// `MAX_TURN_ERROR`.
pub fn turn_powers(angle: f64, target: f64) -> Option<TankPowers> {
    if angle > target - MAX_TURN_ERROR && angle < target + MAX_TURN_ERROR {
        return None;
    }
    let speed = if (target - angle).abs() > FAST_TURN_THRESHOLD {
        FAST_TURN_SPEED
    } else {
        SLOW_TURN_SPEED
    };
    Some(if angle < target {
        TankPowers::new(-speed, speed)
    } else {
        TankPowers::new(speed, -speed)
    })
}

// ─── Defense crossing ───────────────────────────────────────────────

/// One step of the defense crossing.
///
/// Returns the commanded power for both sides and the next phase; `None`
/// means the crossing is over and the robot must stop.
pub fn def_step(state: DefState, tilt: f64) -> (f64, Option<DefState>) {
    match state {
        DefState::ReachDef => {
            let next = if tilt > -RAMP_ANGLE {
                DefState::CrossDef
            } else {
                DefState::ReachDef
            };
            (REACH_SPEED, Some(next))
        }
        DefState::CrossDef => {
            let next = if tilt < RAMP_ANGLE {
                DefState::ComeDown
            } else {
                DefState::CrossDef
            };
            (CROSS_SPEED, Some(next))
        }
        DefState::ComeDown => {
            if tilt > FLAT_TOL {
                (0.0, None)
            } else {
                (COME_DOWN_SPEED, Some(DefState::ComeDown))
            }
        }
    }
}
