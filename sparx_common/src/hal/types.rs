//! HAL-facing value types.

use serde::{Deserialize, Serialize};

/// Alliance color reported by the driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
    #[default]
    Invalid,
}

/// Position of a gamepad POV hat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pov {
    /// Hat released.
    #[default]
    Centered,
    Up,
    Right,
    Down,
    Left,
    /// Diagonal positions; the core has no binding for them.
    Diagonal(u16),
}

impl Pov {
    /// Decode a raw hat reading in degrees (`-1` when released).
    pub const fn from_degrees(degrees: i32) -> Self {
        match degrees {
            0 => Self::Up,
            90 => Self::Right,
            180 => Self::Down,
            270 => Self::Left,
            d if d < 0 => Self::Centered,
            d => Self::Diagonal(d as u16),
        }
    }
}
