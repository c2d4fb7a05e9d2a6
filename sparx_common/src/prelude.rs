//! Prelude module for common re-exports.
//!
//! ```rust
//! use sparx_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, RobotConfig, SharedConfig};

// ─── Faults ─────────────────────────────────────────────────────────
pub use crate::error::FaultFlags;

// ─── HAL ────────────────────────────────────────────────────────────
pub use crate::hal::device::{
    Clock, DigitalInput, Encoder, Gyro, MagnetSensor, MotorChannel, OperatorInput, PowerPanel,
    RobotState, Solenoid,
};
pub use crate::hal::io::{BallAcqIo, ControlsIo, DrivesIo, RobotIo, ScalingIo};
pub use crate::hal::types::{Alliance, Pov};

// ─── Inter-task plumbing ────────────────────────────────────────────
pub use crate::mailbox::{Latch, Mailbox, WinchLink, WinchRequest};
pub use crate::telemetry::{Dashboard, DashboardValue};
