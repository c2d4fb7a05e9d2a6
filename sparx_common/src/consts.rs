//! Robot-wide constants.
//!
//! Single source of truth for the calibrated tunables and wiring numbers.
//! The tunables are matched bit-for-bit against the on-robot calibration,
//! so they are compile-time constants rather than config fields.

use std::f64::consts::PI;
use std::time::Duration;

// ─── Task timing ────────────────────────────────────────────────────

/// Default delay between two ticks of a subsystem.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(20);

/// Default interval between two periodic log dumps of a subsystem.
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(1);

// ─── Encoders ───────────────────────────────────────────────────────

/// Arm encoder scale [degrees/tick].
pub const DISTANCE_PER_TICK_BALLACQ: f64 = 0.1690141 * 4.0;

/// Drive encoder scale [inches/tick].
pub const DISTANCE_PER_TICK_DRIVES: f64 = 0.00689;

/// Number of samples kept by an encoder tracker for windowed speed.
pub const SPEED_WINDOW: usize = 4;

// ─── BallAcq ────────────────────────────────────────────────────────

/// Arm position tolerance [degrees].
pub const DEADBAND: f64 = 0.5;
/// Lowest arm position (low bar / scale) [degrees].
pub const MAX_ANGLE: f64 = 125.0;
/// Arm angle for acquiring a ball [degrees].
pub const ACQUIRE_ANGLE: f64 = 100.0;
/// Arm angle for the sally port [degrees].
pub const SALLY_PORT_ANGLE: f64 = 85.0;
/// Arm angle with the gate raised [degrees].
pub const GATE_ANGLE: f64 = 0.0;
/// Bang-bang arm power.
pub const HIGH_ARM_POWER: f64 = 0.5;
/// Gravity hold power.
pub const HOLDING_POWER: f64 = 0.05;
/// Roller power while acquiring.
pub const HIGH_ROLLER_POWER: f64 = 1.0;
/// Flipper pulse length [s].
pub const WAIT_FIRE_TIME: f64 = 0.25;
/// PDP channel of the left roller motor.
pub const LEFT_ROLLER_PDP: u8 = 10;
/// PDP channel of the right roller motor.
pub const RIGHT_ROLLER_PDP: u8 = 11;

// ─── Drives: shifting ───────────────────────────────────────────────

/// Downshift below this average speed [in/s].
pub const LOWER_SHIFTING_SPEED: f64 = 20.0;
/// Upshift above this average speed [in/s].
pub const UPPER_SHIFTING_SPEED: f64 = 45.0;
/// Time the shifter needs to engage [s].
pub const SHIFTING_TIME: f64 = 0.125;
/// Brake clamp applied while shifting.
pub const SHIFTING_POWER: f64 = 0.4;
/// Minimum time between two speed-triggered shifts [s].
pub const SHIFT_MIN_BETWEEN: f64 = 0.5;

// ─── Drives: autonomous ─────────────────────────────────────────────

/// Turn tolerance [degrees].
pub const MAX_TURN_ERROR: f64 = 0.1;
/// Heading error above which the fast turn speed is used [degrees].
pub const FAST_TURN_THRESHOLD: f64 = 10.0;
/// Fast turn power.
pub const FAST_TURN_SPEED: f64 = 0.75;
/// Slow turn power.
pub const SLOW_TURN_SPEED: f64 = 0.25;
/// Allowed side-to-side distance difference before correcting [in].
pub const MAX_OFF_DISTANCE_AUTO: f64 = 0.5;
/// Floor of the auto drive ramp.
pub const MIN_AUTO_DRIVE_SPEED: f64 = 0.4;
/// Ceiling of the auto drive ramp.
pub const MAX_AUTO_DRIVE_SPEED: f64 = 0.7;
/// Auto drive ramp coefficient.
pub const AUTO_DRIVE_RAMPING: f64 = 31.0 / 500.0;
/// Boost applied to the lagging side while driving.
pub const FIX_SPEED_DRIVE_RAMPING: f64 = 24.0 / 20.0;
/// Reduction applied to the leading side while driving.
pub const LEADING_SIDE_SCALE: f64 = 0.8;
/// Auto drive stops this far short of the target [in].
pub const AUTO_DRIVE_SLACK: f64 = 6.0;
/// Delay between a heading gyro reset and the start of a turn [s].
pub const TURN_SETTLE_TIME: f64 = 0.25;
/// Heading error beyond which `return_to_zero` turns back [degrees].
pub const RETURN_TO_ZERO_THRESHOLD: f64 = 5.0;

// ─── Drives: drive-based scaling ────────────────────────────────────

/// Distance driven by the scaling-drive override [in].
pub const SCALE_DRIVE_DISTANCE: f64 = 36.0 * 6.0;
/// Gentle initial power of the scaling-drive override.
pub const SCALE_DRIVE_KICK_POWER: f64 = 0.25;
/// Duration of the gentle initial power [s].
pub const SCALE_DRIVE_KICK_TIME: f64 = 0.25;
/// Full power of the scaling-drive override.
pub const SCALE_DRIVE_FULL_POWER: f64 = 1.0;

// ─── Drives: winch ──────────────────────────────────────────────────

/// Allowed side-to-side speed difference while winching [in/s].
pub const MAX_SCALE_SPEED_OFF: f64 = 0.2;
/// Boost applied to the slower side while winching.
pub const FIX_SPEED_SCALE_RAMPING: f64 = 51.0 / 50.0;
/// Floor of the winch ramp.
pub const MIN_SCALE_SPEED: f64 = PI / 8.0;
/// Winch ramp coefficient.
pub const SCALE_RAMPING: f64 = 0.8 / 10.0;
/// Delay between hooks engaging and winching [s].
pub const HOOK_SETTLE_TIME: f64 = 0.15;

// ─── Drives: defense crossing ───────────────────────────────────────

/// Tilt of the ramp [degrees]; the sign marks the nose-down side.
pub const RAMP_ANGLE: f64 = -5.0;
/// Tilt treated as flat again [degrees].
pub const FLAT_TOL: f64 = 0.0;
/// Power while approaching a defense.
pub const REACH_SPEED: f64 = -0.5;
/// Power while on top of a defense.
pub const CROSS_SPEED: f64 = -0.75;
/// Power while coming off a defense.
pub const COME_DOWN_SPEED: f64 = -0.5;

// ─── Scaling ────────────────────────────────────────────────────────

/// Winch travel for a climb [in].
pub const WINCH_IN_DISTANCE: f64 = 16.0;

// ─── Controls ───────────────────────────────────────────────────────

/// Delay between the drawbridge home and the low-bar follow-up [s].
pub const DRAWBRIDGE_TIME: f64 = 0.5;
/// Trigger travel that fires the flipper.
pub const FIRE_TRIGGER_THRESHOLD: f64 = 0.5;
/// Arm power divisor for operator stick control.
pub const OP_ARM_POWER_DIVISOR: f64 = 3.0;
