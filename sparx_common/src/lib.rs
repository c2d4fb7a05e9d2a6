//! SPARX Common Library
//!
//! Shared building blocks for every crate of the robot workspace.
//!
//! # Module Structure
//!
//! - [`hal`] - Device traits, I/O bundles and HAL-facing types
//! - [`config`] - TOML configuration loading
//! - [`consts`] - Calibrated tunables and wiring constants
//! - [`error`] - Subsystem fault flags
//! - [`mailbox`] - One-slot mailboxes and one-shot latches between tasks
//! - [`telemetry`] - Dashboard value table
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! sparx_common = { workspace = true }
//! ```
//!
//! ```rust
//! use sparx_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod hal;
pub mod mailbox;
pub mod prelude;
pub mod telemetry;
