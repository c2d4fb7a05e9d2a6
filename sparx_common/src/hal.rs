//! Hardware abstraction layer contract.
//!
//! The control core never touches hardware directly. Each capability it
//! consumes is an object-safe trait in [`device`]; [`io`] groups boxed
//! devices per subsystem so every subsystem is built by explicit
//! construction with its own handles.

pub mod device;
pub mod io;
pub mod types;
