//! Per-subsystem I/O bundles.
//!
//! Each bundle carries the devices exactly one subsystem writes. Shared
//! read-only sources (clock, PDP, driver station) are reference counted.

use std::sync::Arc;

use super::device::{
    Clock, DigitalInput, Encoder, Gyro, MagnetSensor, MotorChannel, OperatorInput, PowerPanel,
    RobotState, Solenoid,
};

/// Devices owned by the Drives subsystem.
pub struct DrivesIo {
    pub left_front: Box<dyn MotorChannel>,
    pub left_back: Box<dyn MotorChannel>,
    pub right_front: Box<dyn MotorChannel>,
    pub right_back: Box<dyn MotorChannel>,
    /// Two-speed gearbox shifter (`true` = high gear).
    pub shifter: Box<dyn Solenoid>,
    pub left_encoder: Box<dyn Encoder>,
    pub right_encoder: Box<dyn Encoder>,
    pub heading_gyro: Box<dyn Gyro>,
    pub tilt_gyro: Box<dyn Gyro>,
}

/// Devices owned by the BallAcq subsystem.
pub struct BallAcqIo {
    pub arm_left: Box<dyn MotorChannel>,
    pub arm_right: Box<dyn MotorChannel>,
    pub roller_left: Box<dyn MotorChannel>,
    pub roller_right: Box<dyn MotorChannel>,
    pub flipper: Box<dyn Solenoid>,
    pub circ_pivot_long: Box<dyn Solenoid>,
    pub circ_pivot_short: Box<dyn Solenoid>,
    pub arm_encoder_left: Box<dyn Encoder>,
    pub arm_encoder_right: Box<dyn Encoder>,
    pub home_switch: MagnetSensor,
    /// Photo-electric sensor at the mouth of the manipulator.
    pub ball_entered: Box<dyn DigitalInput>,
    /// Limit switch behind the flipper.
    pub ball_fully_in: Box<dyn DigitalInput>,
    pub pdp: Arc<dyn PowerPanel>,
}

/// Devices owned by the Scaling subsystem.
pub struct ScalingIo {
    /// Climber arms (`true` = down).
    pub arms: Box<dyn Solenoid>,
    /// Winch ratchet (`true` = locked).
    pub ratchet: Box<dyn Solenoid>,
    pub left_hook: MagnetSensor,
    pub right_hook: MagnetSensor,
}

/// Inputs read by the Controls subsystem.
pub struct ControlsIo {
    pub operator: Box<dyn OperatorInput>,
    pub driver_left: Box<dyn OperatorInput>,
    pub driver_right: Box<dyn OperatorInput>,
    pub robot_state: Arc<dyn RobotState>,
}

/// Everything the composition root needs to build the robot.
pub struct RobotIo {
    pub clock: Arc<dyn Clock>,
    pub drives: DrivesIo,
    pub ball_acq: BallAcqIo,
    pub scaling: ScalingIo,
    pub controls: ControlsIo,
}
