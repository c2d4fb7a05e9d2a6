//! Kinematic robot plant.
//!
//! First-order model, no inertia: every step reads the commanded motor
//! powers and integrates them into wheel travel, heading and arm angle,
//! then publishes the result through the simulated sensors.
//!
//! Conventions:
//! - Forward travel of a side is `-power × top_speed(gear)`.
//! - The right drive encoder counts forward, the left one backward.
//! - Heading is positive clockwise.
//! - The arm angle grows away from home; the home magnet is present at
//!   angles ≤ 0 and pulls the raw line low.
//! - Tilt and hooks are not modelled; tests set them directly.

use sparx_common::config::SimulationConfig;
use sparx_common::consts::{
    DISTANCE_PER_TICK_BALLACQ, DISTANCE_PER_TICK_DRIVES, LEFT_ROLLER_PDP, RIGHT_ROLLER_PDP,
};
use sparx_common::hal::device::{MotorChannel, Solenoid};
use tracing::trace;

use super::rig::SimRig;

/// Arm angle at power-on [degrees].
pub const INITIAL_ARM_ANGLE: f64 = 20.0;
/// Hard stops of the arm [degrees].
const ARM_MIN_ANGLE: f64 = -2.0;
const ARM_MAX_ANGLE: f64 = 130.0;

/// Closed-loop model of the drive train and the manipulator arm.
#[derive(Debug)]
pub struct SimPlant {
    rig: SimRig,
    config: SimulationConfig,
    /// Forward travel of each side [in].
    left_travel: f64,
    right_travel: f64,
    /// Heading [degrees].
    heading: f64,
    /// Arm angle of each side [degrees].
    left_arm: f64,
    right_arm: f64,
    /// Simulated time [s].
    elapsed: f64,
}

impl SimPlant {
    pub fn new(rig: SimRig, config: SimulationConfig) -> Self {
        let plant = Self {
            rig,
            config,
            left_travel: 0.0,
            right_travel: 0.0,
            heading: 0.0,
            left_arm: INITIAL_ARM_ANGLE,
            right_arm: INITIAL_ARM_ANGLE,
            elapsed: 0.0,
        };
        plant.publish();
        plant
    }

    /// Advance the model by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        let drives = &self.rig.drives;
        let top_speed = if drives.shifter.get() {
            self.config.high_gear_top_speed
        } else {
            self.config.low_gear_top_speed
        };
        let v_left = -drives.left_front.get() * top_speed;
        let v_right = -drives.right_front.get() * top_speed;

        self.left_travel += v_left * dt;
        self.right_travel += v_right * dt;
        self.heading += ((v_left - v_right) / self.config.track_width).to_degrees() * dt;

        // The right arm motor is mounted mirrored.
        let ball_acq = &self.rig.ball_acq;
        let rate = self.config.arm_rate;
        self.left_arm = (self.left_arm - ball_acq.arm_left.get() * rate * dt)
            .clamp(ARM_MIN_ANGLE, ARM_MAX_ANGLE);
        self.right_arm = (self.right_arm + ball_acq.arm_right.get() * rate * dt)
            .clamp(ARM_MIN_ANGLE, ARM_MAX_ANGLE);

        self.elapsed += dt;
        self.publish();

        trace!(
            t = self.elapsed,
            left = self.left_travel,
            right = self.right_travel,
            heading = self.heading,
            arm = self.left_arm,
            "plant step"
        );
    }

    fn publish(&self) {
        let drives = &self.rig.drives;
        drives
            .left_encoder
            .set_count(to_ticks(-self.left_travel, DISTANCE_PER_TICK_DRIVES));
        drives
            .right_encoder
            .set_count(to_ticks(self.right_travel, DISTANCE_PER_TICK_DRIVES));
        drives.heading_gyro.set_absolute(self.heading);

        let ball_acq = &self.rig.ball_acq;
        ball_acq.arm_encoder_left.set_count(to_ticks(
            self.left_arm - INITIAL_ARM_ANGLE,
            DISTANCE_PER_TICK_BALLACQ,
        ));
        ball_acq.arm_encoder_right.set_count(to_ticks(
            INITIAL_ARM_ANGLE - self.right_arm,
            DISTANCE_PER_TICK_BALLACQ,
        ));
        ball_acq.home_switch.set(self.left_arm > 0.0);

        let stall = self.config.roller_stall_current;
        ball_acq
            .pdp
            .set_current(LEFT_ROLLER_PDP, ball_acq.roller_left.get().abs() * stall);
        ball_acq
            .pdp
            .set_current(RIGHT_ROLLER_PDP, ball_acq.roller_right.get().abs() * stall);
    }

    pub fn left_travel(&self) -> f64 {
        self.left_travel
    }

    pub fn right_travel(&self) -> f64 {
        self.right_travel
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn arm_angle(&self) -> f64 {
        self.left_arm
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

fn to_ticks(value: f64, per_tick: f64) -> i64 {
    (value / per_tick).round() as i64
}
