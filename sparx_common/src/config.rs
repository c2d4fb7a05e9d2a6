//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the robot workspace.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sparx_common::config::{ConfigError, ConfigLoader, RobotConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RobotConfig::load(Path::new("robot.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::consts::{DEFAULT_LOG_INTERVAL, DEFAULT_TICK_PERIOD};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across all robot binaries.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "sparx-sim-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: "sparx".to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Periodic task timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    pub drives_period_ms: u64,
    pub ball_acq_period_ms: u64,
    pub scaling_period_ms: u64,
    pub controls_period_ms: u64,
    /// Interval between two state dumps of each subsystem.
    pub log_interval_ms: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        let tick = DEFAULT_TICK_PERIOD.as_millis() as u64;
        Self {
            drives_period_ms: tick,
            ball_acq_period_ms: tick,
            scaling_period_ms: tick,
            controls_period_ms: tick,
            log_interval_ms: DEFAULT_LOG_INTERVAL.as_millis() as u64,
        }
    }
}

impl TaskConfig {
    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("drives_period_ms", self.drives_period_ms),
            ("ball_acq_period_ms", self.ball_acq_period_ms),
            ("scaling_period_ms", self.scaling_period_ms),
            ("controls_period_ms", self.controls_period_ms),
            ("log_interval_ms", self.log_interval_ms),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "tasks.{name} must be > 0"
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of the simulated plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Drive side speed at full power in low gear [in/s].
    pub low_gear_top_speed: f64,
    /// Drive side speed at full power in high gear [in/s].
    pub high_gear_top_speed: f64,
    /// Distance between the left and right wheels [in].
    pub track_width: f64,
    /// Arm angular rate at full power [deg/s].
    pub arm_rate: f64,
    /// Roller current draw at full power [A].
    pub roller_stall_current: f64,
    /// Plant integration step [ms].
    pub step_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            low_gear_top_speed: 70.0,
            high_gear_top_speed: 150.0,
            track_width: 24.0,
            arm_rate: 40.0,
            roller_stall_current: 30.0,
            step_ms: 5,
        }
    }
}

impl SimulationConfig {
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let gains = [
            ("low_gear_top_speed", self.low_gear_top_speed),
            ("high_gear_top_speed", self.high_gear_top_speed),
            ("track_width", self.track_width),
            ("arm_rate", self.arm_rate),
        ];
        for (name, value) in gains {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "simulation.{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.roller_stall_current < 0.0 {
            return Err(ConfigError::ValidationError(
                "simulation.roller_stall_current cannot be negative".to_string(),
            ));
        }
        if self.step_ms == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.step_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level robot configuration (`robot.toml`).
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    pub tasks: TaskConfig,
    pub simulation: SimulationConfig,
}

impl RobotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.tasks.validate()?;
        self.simulation.validate()
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
