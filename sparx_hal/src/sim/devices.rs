//! Simulated devices.
//!
//! Every device is a handle over `Arc<Mutex<_>>` state. Cloning a device
//! yields another view of the same hardware: the control core writes through
//! one clone, tests and the plant observe or drive it through another.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use sparx_common::hal::device::{
    DigitalInput, Encoder, Gyro, MotorChannel, OperatorInput, PowerPanel, RobotState, Solenoid,
};
use sparx_common::hal::types::{Alliance, Pov};

// ─── Motor ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MotorCell {
    power: f64,
    inverted: bool,
    writes: u64,
}

/// Simulated motor controller.
#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    cell: Arc<Mutex<MotorCell>>,
}

impl SimMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Power actually applied to the motor, after the HAL inversion.
    pub fn applied(&self) -> f64 {
        let cell = self.cell.lock();
        if cell.inverted { -cell.power } else { cell.power }
    }

    pub fn is_inverted(&self) -> bool {
        self.cell.lock().inverted
    }

    /// Number of `set` calls since construction.
    pub fn writes(&self) -> u64 {
        self.cell.lock().writes
    }
}

impl MotorChannel for SimMotor {
    fn set(&mut self, power: f64) {
        let mut cell = self.cell.lock();
        cell.power = if power.is_nan() {
            0.0
        } else {
            power.clamp(-1.0, 1.0)
        };
        cell.writes += 1;
    }

    fn get(&self) -> f64 {
        self.cell.lock().power
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.cell.lock().inverted = inverted;
    }
}

// ─── Solenoid ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SolenoidCell {
    on: bool,
    writes: u64,
}

/// Simulated single-acting solenoid.
#[derive(Debug, Clone, Default)]
pub struct SimSolenoid {
    cell: Arc<Mutex<SolenoidCell>>,
}

impl SimSolenoid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls since construction.
    pub fn writes(&self) -> u64 {
        self.cell.lock().writes
    }
}

impl Solenoid for SimSolenoid {
    fn set(&mut self, on: bool) {
        let mut cell = self.cell.lock();
        cell.on = on;
        cell.writes += 1;
    }

    fn get(&self) -> bool {
        self.cell.lock().on
    }
}

// ─── Encoder ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct EncoderCell {
    /// Absolute count since power-on.
    count: i64,
    /// Count at the last reset.
    offset: i64,
    resets: u32,
}

/// Simulated quadrature encoder.
#[derive(Debug, Clone, Default)]
pub struct SimEncoder {
    cell: Arc<Mutex<EncoderCell>>,
}

impl SimEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive the absolute count (what the shaft did). Resets are preserved.
    pub fn set_count(&self, count: i64) {
        self.cell.lock().count = count;
    }

    /// Force the reading seen by the control core.
    pub fn set_raw(&self, raw: i64) {
        let mut cell = self.cell.lock();
        cell.count = cell.offset + raw;
    }

    pub fn resets(&self) -> u32 {
        self.cell.lock().resets
    }
}

impl Encoder for SimEncoder {
    fn raw(&self) -> i64 {
        let cell = self.cell.lock();
        cell.count - cell.offset
    }

    fn reset(&mut self) {
        let mut cell = self.cell.lock();
        cell.offset = cell.count;
        cell.resets += 1;
    }
}

// ─── Gyro ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct GyroCell {
    absolute: f64,
    offset: f64,
    calibrations: u32,
}

/// Simulated gyro.
#[derive(Debug, Clone, Default)]
pub struct SimGyro {
    cell: Arc<Mutex<GyroCell>>,
}

impl SimGyro {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive the physical angle since power-on. Resets are preserved.
    pub fn set_absolute(&self, degrees: f64) {
        self.cell.lock().absolute = degrees;
    }

    pub fn absolute(&self) -> f64 {
        self.cell.lock().absolute
    }

    /// Force the reading seen by the control core.
    pub fn set_angle(&self, degrees: f64) {
        let mut cell = self.cell.lock();
        cell.absolute = cell.offset + degrees;
    }

    pub fn calibrations(&self) -> u32 {
        self.cell.lock().calibrations
    }
}

impl Gyro for SimGyro {
    fn angle(&self) -> f64 {
        let cell = self.cell.lock();
        cell.absolute - cell.offset
    }

    fn reset(&mut self) {
        let mut cell = self.cell.lock();
        cell.offset = cell.absolute;
    }

    fn calibrate(&mut self) {
        self.cell.lock().calibrations += 1;
    }
}

// ─── Digital input ──────────────────────────────────────────────────

/// Simulated digital input line.
#[derive(Debug, Clone, Default)]
pub struct SimDigitalInput {
    level: Arc<Mutex<bool>>,
}

impl SimDigitalInput {
    pub fn new(level: bool) -> Self {
        Self {
            level: Arc::new(Mutex::new(level)),
        }
    }

    pub fn set(&self, level: bool) {
        *self.level.lock() = level;
    }
}

impl DigitalInput for SimDigitalInput {
    fn get(&self) -> bool {
        *self.level.lock()
    }
}

// ─── Power distribution panel ───────────────────────────────────────

/// Simulated PDP. Unknown channels read 0 A.
#[derive(Debug, Clone, Default)]
pub struct SimPdp {
    currents: Arc<Mutex<BTreeMap<u8, f64>>>,
}

impl SimPdp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current(&self, channel: u8, amps: f64) {
        self.currents.lock().insert(channel, amps);
    }
}

impl PowerPanel for SimPdp {
    fn current(&self, channel: u8) -> f64 {
        self.currents.lock().get(&channel).copied().unwrap_or(0.0)
    }
}

// ─── Joystick ───────────────────────────────────────────────────────

/// Axis count of an Xbox pad as reported by the driver station.
const AXIS_COUNT: usize = 6;
/// Button count of an Xbox pad (1-based ids `1..=BUTTON_COUNT`).
const BUTTON_COUNT: usize = 12;

#[derive(Debug, Default)]
struct JoystickCell {
    axes: [f64; AXIS_COUNT],
    buttons: [bool; BUTTON_COUNT],
    pov: Pov,
}

/// Simulated gamepad / joystick.
///
/// Out-of-range axis and button ids read as neutral.
#[derive(Debug, Clone, Default)]
pub struct SimJoystick {
    cell: Arc<Mutex<JoystickCell>>,
}

impl SimJoystick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_axis(&self, id: usize, value: f64) {
        if let Some(axis) = self.cell.lock().axes.get_mut(id) {
            *axis = value.clamp(-1.0, 1.0);
        }
    }

    pub fn set_button(&self, id: usize, pressed: bool) {
        let mut cell = self.cell.lock();
        if let Some(b) = id.checked_sub(1).and_then(|i| cell.buttons.get_mut(i)) {
            *b = pressed;
        }
    }

    pub fn set_pov(&self, pov: Pov) {
        self.cell.lock().pov = pov;
    }
}

impl OperatorInput for SimJoystick {
    fn axis(&self, id: usize) -> f64 {
        self.cell.lock().axes.get(id).copied().unwrap_or(0.0)
    }

    fn button(&self, id: usize) -> bool {
        let cell = self.cell.lock();
        id.checked_sub(1)
            .and_then(|i| cell.buttons.get(i).copied())
            .unwrap_or(false)
    }

    fn pov(&self) -> Pov {
        self.cell.lock().pov
    }
}

// ─── Driver station ─────────────────────────────────────────────────

/// Match period selected on the driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    Autonomous,
    #[default]
    OperatorControl,
    Test,
}

#[derive(Debug)]
struct StationCell {
    enabled: bool,
    mode: MatchMode,
    fms_attached: bool,
    alliance: Alliance,
}

/// Simulated driver station. Starts enabled in operator control.
#[derive(Debug, Clone)]
pub struct SimDriverStation {
    cell: Arc<Mutex<StationCell>>,
}

impl SimDriverStation {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Mutex::new(StationCell {
                enabled: true,
                mode: MatchMode::OperatorControl,
                fms_attached: false,
                alliance: Alliance::Invalid,
            })),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.cell.lock().enabled = enabled;
    }

    pub fn set_mode(&self, mode: MatchMode) {
        self.cell.lock().mode = mode;
    }

    pub fn set_fms_attached(&self, attached: bool) {
        self.cell.lock().fms_attached = attached;
    }

    pub fn set_alliance(&self, alliance: Alliance) {
        self.cell.lock().alliance = alliance;
    }
}

impl Default for SimDriverStation {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotState for SimDriverStation {
    fn is_enabled(&self) -> bool {
        self.cell.lock().enabled
    }

    fn is_autonomous(&self) -> bool {
        let cell = self.cell.lock();
        cell.enabled && cell.mode == MatchMode::Autonomous
    }

    fn is_operator_control(&self) -> bool {
        let cell = self.cell.lock();
        cell.enabled && cell.mode == MatchMode::OperatorControl
    }

    fn is_test(&self) -> bool {
        let cell = self.cell.lock();
        cell.enabled && cell.mode == MatchMode::Test
    }

    fn is_fms_attached(&self) -> bool {
        self.cell.lock().fms_attached
    }

    fn alliance(&self) -> Alliance {
        self.cell.lock().alliance
    }
}
