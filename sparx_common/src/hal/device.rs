//! Device traits consumed by the control core.
//!
//! One trait per hardware capability. Implementations are expected to fail
//! soft: a broken sensor returns its last value and a broken actuator keeps
//! its motor-safety behavior. None of these methods return errors.
//!
//! | Capability | Trait |
//! |------------|-------|
//! | Motor controller | [`MotorChannel`] |
//! | Pneumatic solenoid | [`Solenoid`] |
//! | Quadrature encoder | [`Encoder`] |
//! | Heading / tilt gyro | [`Gyro`] |
//! | Digital input | [`DigitalInput`], [`MagnetSensor`] |
//! | Power distribution panel | [`PowerPanel`] |
//! | Monotonic timestamp | [`Clock`] |
//! | Driver station | [`RobotState`] |
//! | Gamepad / joystick | [`OperatorInput`] |

use super::types::{Alliance, Pov};

/// A single motor controller output.
pub trait MotorChannel: Send {
    /// Command a power in `[-1, 1]`. Out-of-range values are clamped by the HAL.
    fn set(&mut self, power: f64);

    /// Last commanded power (before inversion).
    fn get(&self) -> f64;

    /// Invert the output direction at the HAL level.
    fn set_inverted(&mut self, inverted: bool);
}

/// A single-acting pneumatic solenoid.
pub trait Solenoid: Send {
    fn set(&mut self, on: bool);
    fn get(&self) -> bool;
}

/// A raw tick counter.
pub trait Encoder: Send {
    /// Ticks counted since the last reset.
    fn raw(&self) -> i64;
    fn reset(&mut self);
}

/// An angular-rate gyro integrated to an angle.
pub trait Gyro: Send {
    /// Integrated angle [degrees].
    fn angle(&self) -> f64;
    /// Zero the integrated angle.
    fn reset(&mut self);
    /// Re-measure the rest bias. Blocking on real hardware.
    fn calibrate(&mut self);
}

/// A digital input line.
pub trait DigitalInput: Send {
    fn get(&self) -> bool;
}

/// Per-channel current readings of the power distribution panel.
pub trait PowerPanel: Send + Sync {
    /// Current draw [A] of `channel`.
    fn current(&self, channel: u8) -> f64;
}

/// Monotonic timestamp source.
pub trait Clock: Send + Sync {
    /// Seconds since an arbitrary fixed origin.
    fn now(&self) -> f64;
}

/// Driver-station view of the match state.
pub trait RobotState: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn is_disabled(&self) -> bool {
        !self.is_enabled()
    }
    fn is_autonomous(&self) -> bool;
    fn is_operator_control(&self) -> bool;
    fn is_test(&self) -> bool;
    fn is_fms_attached(&self) -> bool;
    fn alliance(&self) -> Alliance;
}

/// A gamepad or joystick.
pub trait OperatorInput: Send {
    /// Axis value in `[-1, 1]` after the device deadband.
    fn axis(&self, id: usize) -> f64;
    /// Current level of a button (1-based id, as printed on the pad).
    fn button(&self, id: usize) -> bool;
    /// POV hat position.
    fn pov(&self) -> Pov;
}

/// Magnetic reed / hall switch on a digital input.
///
/// `is_tripped()` reports the magnet presence, applying the wiring inversion.
pub struct MagnetSensor {
    input: Box<dyn DigitalInput>,
    inverted: bool,
}

impl MagnetSensor {
    pub fn new(input: Box<dyn DigitalInput>, inverted: bool) -> Self {
        Self { input, inverted }
    }

    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.input.get() != self.inverted
    }
}

impl std::fmt::Debug for MagnetSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagnetSensor")
            .field("inverted", &self.inverted)
            .field("tripped", &self.is_tripped())
            .finish()
    }
}
