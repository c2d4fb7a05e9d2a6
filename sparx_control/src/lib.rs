//! # SPARX Control Library
//!
//! Subsystem coordination core of the SPARX robot. Periodically ticked state
//! machines turn operator and autonomous intents into motor and solenoid
//! outputs, constrained by encoder, gyro, switch and current feedback.
//!
//! ## Subsystems
//!
//! 1. **Drives** — tank drive, two-speed auto-shift, autonomous drive / turn /
//!    defense crossing, winch climb
//! 2. **BallAcq** — arm, flipper and roller machines sharing one tick
//! 3. **Scaling** — climb sequencer handing the winch to Drives
//! 4. **Controls** — operator pads to intents
//!
//! ## Concurrency
//!
//! Every subsystem lives behind its own `parking_lot::Mutex` and is ticked by
//! its own [`runner::PeriodicTask`]. Intents are plain method calls under the
//! lock and are observed at the owner's next tick. Scaling and Drives never
//! lock each other; they talk through a [`sparx_common::mailbox::WinchLink`].

pub mod ball_acq;
pub mod controls;
pub mod drives;
pub mod encoder;
pub mod robot;
pub mod runner;
pub mod scaling;
