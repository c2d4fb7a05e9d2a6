//! Simulation driver.
//!
//! - [`devices`] - shareable fake devices implementing the HAL traits
//! - [`clock`] - manual and wall-clock time sources
//! - [`rig`] - the full device set of the robot, wired into [`RobotIo`](sparx_common::hal::io::RobotIo)
//! - [`plant`] - kinematic model closing the loop between outputs and sensors

pub mod clock;
pub mod devices;
pub mod plant;
pub mod rig;

pub use clock::{MonotonicClock, SimClock};
pub use devices::{
    MatchMode, SimDigitalInput, SimDriverStation, SimEncoder, SimGyro, SimJoystick, SimMotor,
    SimPdp, SimSolenoid,
};
pub use plant::SimPlant;
pub use rig::{SimBallAcq, SimControls, SimDrives, SimRig, SimScaling};
