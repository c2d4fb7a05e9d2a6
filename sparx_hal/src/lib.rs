//! # SPARX Simulation HAL
//!
//! Software stand-ins for every device of the robot, so the control core can
//! run on a workstation and under test.
//!
//! Each simulated device is a cheap cloneable handle over shared state: one
//! clone is boxed into the I/O bundle handed to a subsystem, another stays
//! with the test or with the [`sim::SimPlant`], which closes the loop by
//! turning motor outputs into encoder, gyro, switch and current readings.
//!
//! ```rust
//! use sparx_common::config::SimulationConfig;
//! use sparx_hal::sim::{SimClock, SimRig};
//! use std::sync::Arc;
//!
//! let rig = SimRig::new();
//! let clock = SimClock::new();
//! let io = rig.robot_io(Arc::new(clock.clone()));
//! let mut plant = rig.plant(&SimulationConfig::default());
//! plant.step(0.02);
//! # drop(io);
//! ```

pub mod sim;
