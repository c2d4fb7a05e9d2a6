//! The robot's full simulated device set.

use std::sync::Arc;

use sparx_common::config::SimulationConfig;
use sparx_common::hal::device::{Clock, MagnetSensor};
use sparx_common::hal::io::{BallAcqIo, ControlsIo, DrivesIo, RobotIo, ScalingIo};

use super::devices::{
    SimDigitalInput, SimDriverStation, SimEncoder, SimGyro, SimJoystick, SimMotor, SimPdp,
    SimSolenoid,
};
use super::plant::SimPlant;

/// Drive train devices.
#[derive(Debug, Clone, Default)]
pub struct SimDrives {
    pub left_front: SimMotor,
    pub left_back: SimMotor,
    pub right_front: SimMotor,
    pub right_back: SimMotor,
    pub shifter: SimSolenoid,
    pub left_encoder: SimEncoder,
    pub right_encoder: SimEncoder,
    pub heading_gyro: SimGyro,
    pub tilt_gyro: SimGyro,
}

/// Manipulator devices.
#[derive(Debug, Clone)]
pub struct SimBallAcq {
    pub arm_left: SimMotor,
    pub arm_right: SimMotor,
    pub roller_left: SimMotor,
    pub roller_right: SimMotor,
    pub flipper: SimSolenoid,
    pub circ_pivot_long: SimSolenoid,
    pub circ_pivot_short: SimSolenoid,
    pub arm_encoder_left: SimEncoder,
    pub arm_encoder_right: SimEncoder,
    /// Raw line of the home magnet sensor; low when the magnet is present.
    pub home_switch: SimDigitalInput,
    pub ball_entered: SimDigitalInput,
    pub ball_fully_in: SimDigitalInput,
    pub pdp: SimPdp,
}

impl Default for SimBallAcq {
    fn default() -> Self {
        Self {
            arm_left: SimMotor::new(),
            arm_right: SimMotor::new(),
            roller_left: SimMotor::new(),
            roller_right: SimMotor::new(),
            flipper: SimSolenoid::new(),
            circ_pivot_long: SimSolenoid::new(),
            circ_pivot_short: SimSolenoid::new(),
            arm_encoder_left: SimEncoder::new(),
            arm_encoder_right: SimEncoder::new(),
            // Inverted wiring: high means "not home".
            home_switch: SimDigitalInput::new(true),
            ball_entered: SimDigitalInput::new(false),
            ball_fully_in: SimDigitalInput::new(false),
            pdp: SimPdp::new(),
        }
    }
}

/// Climber devices.
#[derive(Debug, Clone, Default)]
pub struct SimScaling {
    pub arms: SimSolenoid,
    pub ratchet: SimSolenoid,
    pub left_hook: SimDigitalInput,
    pub right_hook: SimDigitalInput,
}

impl SimScaling {
    /// Set both hook sensors at once.
    pub fn set_hooks(&self, engaged: bool) {
        self.left_hook.set(engaged);
        self.right_hook.set(engaged);
    }
}

/// Operator surface.
#[derive(Debug, Clone, Default)]
pub struct SimControls {
    pub operator: SimJoystick,
    pub driver_left: SimJoystick,
    pub driver_right: SimJoystick,
    pub station: SimDriverStation,
}

/// Every simulated device of the robot.
///
/// Cloning the rig clones handles, not hardware.
#[derive(Debug, Clone, Default)]
pub struct SimRig {
    pub drives: SimDrives,
    pub ball_acq: SimBallAcq,
    pub scaling: SimScaling,
    pub controls: SimControls,
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box device handles into the I/O bundles consumed by the control core.
    pub fn robot_io(&self, clock: Arc<dyn Clock>) -> RobotIo {
        let d = &self.drives;
        let b = &self.ball_acq;
        let s = &self.scaling;
        let c = &self.controls;

        RobotIo {
            clock,
            drives: DrivesIo {
                left_front: Box::new(d.left_front.clone()),
                left_back: Box::new(d.left_back.clone()),
                right_front: Box::new(d.right_front.clone()),
                right_back: Box::new(d.right_back.clone()),
                shifter: Box::new(d.shifter.clone()),
                left_encoder: Box::new(d.left_encoder.clone()),
                right_encoder: Box::new(d.right_encoder.clone()),
                heading_gyro: Box::new(d.heading_gyro.clone()),
                tilt_gyro: Box::new(d.tilt_gyro.clone()),
            },
            ball_acq: BallAcqIo {
                arm_left: Box::new(b.arm_left.clone()),
                arm_right: Box::new(b.arm_right.clone()),
                roller_left: Box::new(b.roller_left.clone()),
                roller_right: Box::new(b.roller_right.clone()),
                flipper: Box::new(b.flipper.clone()),
                circ_pivot_long: Box::new(b.circ_pivot_long.clone()),
                circ_pivot_short: Box::new(b.circ_pivot_short.clone()),
                arm_encoder_left: Box::new(b.arm_encoder_left.clone()),
                arm_encoder_right: Box::new(b.arm_encoder_right.clone()),
                home_switch: MagnetSensor::new(Box::new(b.home_switch.clone()), true),
                ball_entered: Box::new(b.ball_entered.clone()),
                ball_fully_in: Box::new(b.ball_fully_in.clone()),
                pdp: Arc::new(b.pdp.clone()),
            },
            scaling: ScalingIo {
                arms: Box::new(s.arms.clone()),
                ratchet: Box::new(s.ratchet.clone()),
                left_hook: MagnetSensor::new(Box::new(s.left_hook.clone()), false),
                right_hook: MagnetSensor::new(Box::new(s.right_hook.clone()), false),
            },
            controls: ControlsIo {
                operator: Box::new(c.operator.clone()),
                driver_left: Box::new(c.driver_left.clone()),
                driver_right: Box::new(c.driver_right.clone()),
                robot_state: Arc::new(c.station.clone()),
            },
        }
    }

    /// Build a plant driving this rig's sensors from its actuators.
    pub fn plant(&self, config: &SimulationConfig) -> SimPlant {
        SimPlant::new(self.clone(), config.clone())
    }
}
