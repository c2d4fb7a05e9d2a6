//! Drives subsystem.
//!
//! Tank drive with a two-speed gearbox. Three machines share one tick and
//! one pair of side powers:
//!
//! - [`shift`] - gear selection with brake-into-shift
//! - [`auto`] - distance drive, gyro turn, defense crossing
//! - [`winch`] - climb winch, fed by the Scaling handshake
//!
//! # Tick order
//!
//! 1. Drain the Scaling requests, e-stop first.
//! 2. Latch the operator powers as the candidate outputs.
//! 3. Sample both encoder trackers.
//! 4. Shift, auto and winch machines, each free to override the candidates.
//! 5. Scaling-drive hold when no auto motion is running.
//! 6. Write all four motors and the shifter exactly once.

pub mod auto;
pub mod shift;
pub mod winch;

use std::sync::Arc;

use sparx_common::consts::{
    DISTANCE_PER_TICK_DRIVES, HOOK_SETTLE_TIME, RETURN_TO_ZERO_THRESHOLD, SCALE_DRIVE_DISTANCE,
    TURN_SETTLE_TIME,
};
use sparx_common::error::FaultFlags;
use sparx_common::hal::device::{Clock, Gyro, MotorChannel, Solenoid};
use sparx_common::hal::io::DrivesIo;
use sparx_common::mailbox::{Latch, WinchLink, WinchRequest};
use sparx_common::telemetry::Dashboard;
use tracing::{debug, info};

use crate::encoder::EncoderTracker;
use crate::runner::Subsystem;

use self::auto::{AutoState, DefState};
use self::shift::{ShiftInputs, ShiftMachine, ShiftState, ShiftTransition};
use self::winch::WinchState;

/// Left/right power pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TankPowers {
    pub left: f64,
    pub right: f64,
}

impl TankPowers {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    #[inline]
    pub fn negated(self) -> Self {
        Self::new(-self.left, -self.right)
    }
}

/// The drive train.
pub struct Drives {
    clock: Arc<dyn Clock>,
    left_front: Box<dyn MotorChannel>,
    left_back: Box<dyn MotorChannel>,
    right_front: Box<dyn MotorChannel>,
    right_back: Box<dyn MotorChannel>,
    shifter: Box<dyn Solenoid>,
    left: EncoderTracker,
    right: EncoderTracker,
    heading_gyro: Box<dyn Gyro>,
    tilt_gyro: Box<dyn Gyro>,
    link: WinchLink,
    dashboard: Dashboard,

    // ── State machines ──
    shift: ShiftMachine,
    auto: AutoState,
    def: DefState,
    winch: WinchState,

    // ── Setpoints ──
    wanted_auto_dist: f64,
    turn_target: f64,
    /// The heading gyro is trusted again after this time [s].
    turn_settle_until: f64,
    wanted_winch_dist: f64,
    winch_power: f64,
    /// Both hooks seen since this time plus the settle delay [s].
    hook_settle_until: Option<f64>,
    scaling_start: f64,

    // ── Mode flags ──
    driver_shift: bool,
    toggle_shift: Latch,
    hold_first: bool,
    scale: bool,
    want_to_scale: bool,
    engage_pto: bool,
    scale_op_control: bool,

    // ── Per-tick values ──
    controls: TankPowers,
    output: TankPowers,
    left_speed: f64,
    right_speed: f64,
    avg_speed: f64,
    current_auto_dist: f64,
    current_scale_dist: f64,

    faults: FaultFlags,
}

impl Drives {
    pub fn new(io: DrivesIo, clock: Arc<dyn Clock>, link: WinchLink, dashboard: Dashboard) -> Self {
        let DrivesIo {
            mut left_front,
            mut left_back,
            right_front,
            right_back,
            shifter,
            left_encoder,
            right_encoder,
            mut heading_gyro,
            mut tilt_gyro,
        } = io;

        left_front.set_inverted(true);
        left_back.set_inverted(true);
        heading_gyro.calibrate();
        tilt_gyro.calibrate();

        Self {
            clock,
            left_front,
            left_back,
            right_front,
            right_back,
            shifter,
            // The left encoder is mounted mirrored.
            left: EncoderTracker::new(left_encoder, -DISTANCE_PER_TICK_DRIVES),
            right: EncoderTracker::new(right_encoder, DISTANCE_PER_TICK_DRIVES),
            heading_gyro,
            tilt_gyro,
            link,
            dashboard,
            shift: ShiftMachine::new(),
            auto: AutoState::Standby,
            def: DefState::ReachDef,
            winch: WinchState::Standby,
            wanted_auto_dist: 0.0,
            turn_target: 0.0,
            turn_settle_until: 0.0,
            wanted_winch_dist: 0.0,
            winch_power: 0.0,
            hook_settle_until: None,
            scaling_start: 0.0,
            driver_shift: false,
            toggle_shift: Latch::new(),
            hold_first: false,
            scale: false,
            want_to_scale: false,
            engage_pto: false,
            scale_op_control: false,
            controls: TankPowers::ZERO,
            output: TankPowers::ZERO,
            left_speed: 0.0,
            right_speed: 0.0,
            avg_speed: 0.0,
            current_auto_dist: 0.0,
            current_scale_dist: 0.0,
            faults: FaultFlags::empty(),
        }
    }

    /// Run one tick.
    pub fn execute(&mut self) {
        let now = self.clock.now();

        while let Some(request) = self.link.next_request() {
            self.handle_request(request);
        }

        let mut out = self.controls;

        self.left.update(now);
        self.right.update(now);
        self.left_speed = self.left.speed();
        self.right_speed = self.right.speed();
        self.avg_speed = (self.left_speed + self.right_speed) / 2.0;

        self.step_shift(now, &mut out);
        self.step_auto(now, &mut out);
        self.step_winch(now, &mut out);

        if self.scale && self.auto == AutoState::Standby {
            out = TankPowers::new(self.winch_power, self.winch_power);
        }

        self.output = out;
        self.left_front.set(out.left);
        self.left_back.set(out.left);
        self.right_front.set(out.right);
        self.right_back.set(out.right);
        self.shifter.set(self.shift.state().shifter_high());

        self.dashboard.put_number("Left Drives Speed", self.left_speed);
        self.dashboard.put_number("Right Drives Speed", self.right_speed);
        self.dashboard
            .put_text("Drives Gear", format!("{:?}", self.shift.state()));
    }

    fn handle_request(&mut self, request: WinchRequest) {
        match request {
            WinchRequest::BeginWinch { distance } => {
                self.scale_winch(distance);
                self.want_to_scale = true;
            }
            WinchRequest::EStop => self.estop(),
        }
    }

    fn step_shift(&mut self, now: f64, out: &mut TankPowers) {
        let inputs = ShiftInputs {
            now,
            avg_speed: self.avg_speed,
            driver_shift: self.driver_shift,
            toggle: self.toggle_shift.take(),
            hold_first: self.hold_first,
            scale: self.scale,
        };
        match self.shift.step(&inputs, out) {
            ShiftTransition::None => {}
            ShiftTransition::Started(state) => {
                info!(avg_speed = self.avg_speed, "Shift started: {:?}", state);
            }
            ShiftTransition::Engaged(state) => debug!("Shift engaged: {:?}", state),
            ShiftTransition::ToggleDropped => {
                self.faults.insert(FaultFlags::SHIFT_DROPPED);
                debug!("Shift toggle dropped: shift already in progress");
            }
        }
    }

    fn step_auto(&mut self, now: f64, out: &mut TankPowers) {
        match self.auto {
            AutoState::Standby => {}
            AutoState::Drive => {
                let left = self.left.distance();
                let right = self.right.distance();
                self.current_auto_dist = auto::current_auto_distance(left, right);

                let mut powers = if self.scale {
                    let p = auto::scale_drive_power(now, self.scaling_start);
                    TankPowers::new(p, p)
                } else {
                    auto::drive_powers(self.wanted_auto_dist, left, right)
                };
                if auto::drive_finished(self.current_auto_dist, self.wanted_auto_dist) {
                    powers = TankPowers::ZERO;
                    self.auto = AutoState::Standby;
                    info!(
                        "Auto drive done: {:.2} of {:.2} in",
                        self.current_auto_dist, self.wanted_auto_dist
                    );
                }
                // Left side is inverted at the motor.
                *out = powers.negated();
            }
            AutoState::Turn => {
                if now < self.turn_settle_until {
                    *out = TankPowers::ZERO;
                    return;
                }
                let angle = self.heading_gyro.angle();
                match auto::turn_powers(angle, self.turn_target) {
                    Some(powers) => *out = powers,
                    None => {
                        *out = TankPowers::ZERO;
                        self.auto = AutoState::Standby;
                        info!("Auto turn done: {:.2}° (target {:.2}°)", angle, self.turn_target);
                    }
                }
            }
            AutoState::Def => {
                let (power, next) = auto::def_step(self.def, self.tilt_gyro.angle());
                *out = TankPowers::new(power, power);
                match next {
                    Some(next) => {
                        if next != self.def {
                            info!("Defense crossing: {:?} -> {:?}", self.def, next);
                        }
                        self.def = next;
                    }
                    None => {
                        self.def = DefState::ReachDef;
                        self.auto = AutoState::Standby;
                        info!("Defense crossed");
                    }
                }
            }
        }
    }

    fn step_winch(&mut self, now: f64, out: &mut TankPowers) {
        match self.winch {
            WinchState::Standby => {}
            WinchState::Hooks => {
                if !self.link.hooked() {
                    self.hook_settle_until = None;
                    return;
                }
                let settled = *self.hook_settle_until.get_or_insert(now + HOOK_SETTLE_TIME);
                if now >= settled && self.want_to_scale {
                    self.left.reset();
                    self.right.reset();
                    self.current_scale_dist = 0.0;
                    self.hook_settle_until = None;
                    self.winch = if self.scale_op_control {
                        WinchState::ManualScaling
                    } else {
                        WinchState::Scaling
                    };
                    info!(
                        "Hooks set, winching {:.1} in ({:?})",
                        self.wanted_winch_dist, self.winch
                    );
                }
            }
            WinchState::Scaling | WinchState::ManualScaling => {
                self.current_scale_dist =
                    auto::current_auto_distance(self.left.distance(), self.right.distance());
                if self.winch == WinchState::Scaling {
                    self.winch_power =
                        winch::winch_ramp(self.wanted_winch_dist, self.current_scale_dist);
                }
                *out = winch::winch_powers(self.winch_power, self.left_speed, self.right_speed);

                if winch::winch_finished(self.current_scale_dist, self.wanted_winch_dist) {
                    *out = TankPowers::ZERO;
                    self.winch_power = 0.0;
                    self.want_to_scale = false;
                    self.winch = WinchState::Standby;
                    self.link.complete();
                    info!("Winch done: {:.2} in", self.current_scale_dist);
                }
            }
        }
    }

    // ─── Operator / autonomous intents ──────────────────────────────

    /// Operator tank powers. Ignored while a shift is in progress.
    pub fn set_power(&mut self, left: f64, right: f64) -> bool {
        if self.shift.state().is_shifting() {
            return false;
        }
        self.controls = TankPowers::new(left, right);
        true
    }

    /// Drive `length` inches (signed) from here.
    pub fn drive_wanted_distance(&mut self, length: f64) {
        self.left.reset();
        self.right.reset();
        self.wanted_auto_dist =
            auto::current_auto_distance(self.left.distance(), self.right.distance()) + length;
        self.auto = AutoState::Drive;
        info!("Auto drive: {:.1} in", length);
    }

    /// Turn in place to `angle` degrees relative to the current heading.
    pub fn turn(&mut self, angle: f64) {
        self.heading_gyro.reset();
        self.turn_target = angle;
        self.turn_settle_until = self.clock.now() + TURN_SETTLE_TIME;
        self.auto = AutoState::Turn;
        info!("Auto turn: {:.1}°", angle);
    }

    /// Turn back to the heading of the last gyro reset if off by more than 5°.
    pub fn return_to_zero(&mut self) {
        let angle = self.heading_gyro.angle();
        if angle.abs() > RETURN_TO_ZERO_THRESHOLD {
            self.turn(-angle);
        }
    }

    pub fn start_auto_def(&mut self) {
        self.tilt_gyro.reset();
        self.def = DefState::ReachDef;
        self.auto = AutoState::Def;
        info!("Auto defense crossing started");
    }

    #[inline]
    pub fn auto_function_done(&self) -> bool {
        self.auto == AutoState::Standby
    }

    /// Abort autonomous motion and the climb, drop to low gear, zero outputs.
    pub fn auto_e_stop(&mut self) {
        self.auto = AutoState::Standby;
        self.winch = WinchState::Standby;
        self.shift.force_low();
        self.controls = TankPowers::ZERO;
        self.output = TankPowers::ZERO;
        info!("Drives auto e-stop");
    }

    /// Abort the climb.
    pub fn e_stop_scaling(&mut self) {
        self.winch_power = 0.0;
        self.winch = WinchState::Standby;
        self.hook_settle_until = None;
        self.want_to_scale = false;
        info!("Drives scaling e-stop");
    }

    /// Full stop of everything Drives does on its own.
    pub fn estop(&mut self) {
        self.auto_e_stop();
        self.e_stop_scaling();
        self.scale = false;
    }

    pub fn kill_auto_drive(&mut self) {
        self.auto = AutoState::Standby;
    }

    /// Request one gear change. Honoured only with driver shifting enabled.
    pub fn toggle_shifting(&self) {
        self.toggle_shift.set();
    }

    /// Toggle driver-manual shifting.
    pub fn driver_shifting(&mut self) {
        self.driver_shift = !self.driver_shift;
        info!("Driver shifting: {}", self.driver_shift);
    }

    pub fn hold_first(&mut self, hold: bool) {
        self.hold_first = hold;
    }

    /// Drive-based climb: fixed-profile drive over `SCALE_DRIVE_DISTANCE`.
    pub fn scale(&mut self) {
        self.left.reset();
        self.right.reset();
        self.wanted_auto_dist = SCALE_DRIVE_DISTANCE;
        self.scale = true;
        self.scaling_start = self.clock.now();
        self.auto = AutoState::Drive;
        info!("Scaling drive started");
    }

    /// Arm the winch for `distance` inches.
    pub fn scale_winch(&mut self, distance: f64) {
        self.winch = WinchState::Hooks;
        self.wanted_winch_dist = distance;
        self.hook_settle_until = None;
        self.engage_pto = true;
        info!("Winch armed: {:.1} in", distance);
    }

    /// True once per finished climb.
    pub fn is_scale_scaling_done(&self) -> bool {
        self.link.take_done()
    }

    /// Toggle manual winch mode.
    pub fn manual_pto_engage(&mut self) {
        self.engage_pto = !self.engage_pto;
        self.scale_op_control = !self.engage_pto;
        self.winch = if self.scale_op_control {
            WinchState::Hooks
        } else {
            WinchState::Standby
        };
        info!("Manual winch: {}", self.scale_op_control);
    }

    /// Winch power used by manual climbing and the scaling-drive hold.
    pub fn manual_scale(&mut self, power: f64) {
        self.winch_power = power;
    }

    /// Toggle the go-ahead for winching once the hooks are set.
    pub fn begin_scaling(&mut self) {
        self.want_to_scale = !self.want_to_scale;
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub fn shift_state(&self) -> ShiftState {
        self.shift.state()
    }

    #[inline]
    pub fn auto_state(&self) -> AutoState {
        self.auto
    }

    #[inline]
    pub fn def_state(&self) -> DefState {
        self.def
    }

    #[inline]
    pub fn winch_state(&self) -> WinchState {
        self.winch
    }

    /// Powers written by the last tick (before the HAL inversion).
    #[inline]
    pub fn output(&self) -> TankPowers {
        self.output
    }

    pub fn left_speed(&self) -> f64 {
        self.left_speed
    }

    pub fn right_speed(&self) -> f64 {
        self.right_speed
    }

    pub fn avg_speed(&self) -> f64 {
        self.avg_speed
    }

    pub fn left_distance(&self) -> f64 {
        self.left.distance()
    }

    pub fn right_distance(&self) -> f64 {
        self.right.distance()
    }

    pub fn wanted_auto_distance(&self) -> f64 {
        self.wanted_auto_dist
    }

    pub fn current_auto_distance(&self) -> f64 {
        self.current_auto_dist
    }

    pub fn wanted_winch_distance(&self) -> f64 {
        self.wanted_winch_dist
    }

    pub fn is_driver_shifting(&self) -> bool {
        self.driver_shift
    }

    pub fn is_scaling_drive(&self) -> bool {
        self.scale
    }

    pub fn wants_to_scale(&self) -> bool {
        self.want_to_scale
    }

    pub fn faults(&self) -> FaultFlags {
        self.faults
    }

    pub fn clear_faults(&mut self) {
        self.faults = FaultFlags::empty();
    }
}

impl Subsystem for Drives {
    fn name(&self) -> &'static str {
        "Drives"
    }

    fn execute(&mut self) {
        Drives::execute(self);
    }

    fn write_log(&self) {
        info!(
            "Wanted powers (left, right): {:.3}, {:.3}",
            self.output.left, self.output.right
        );
        info!(
            "Speeds (left, right): {:.2}, {:.2}",
            self.left_speed, self.right_speed
        );
        info!(
            "Distances (left, right): {:.2}, {:.2}",
            self.left.distance(),
            self.right.distance()
        );
        info!(
            "Gear: {:?}, auto: {:?}/{:?}, winch: {:?}, winch left: {:.2} in",
            self.shift.state(),
            self.auto,
            self.def,
            self.winch,
            self.wanted_winch_dist.abs() - self.current_scale_dist.abs()
        );
        if !self.faults.is_empty() {
            info!("Faults: {:?}", self.faults);
        }
    }
}

impl std::fmt::Debug for Drives {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drives")
            .field("shift", &self.shift.state())
            .field("auto", &self.auto)
            .field("def", &self.def)
            .field("winch", &self.winch)
            .field("output", &self.output)
            .finish()
    }
}
