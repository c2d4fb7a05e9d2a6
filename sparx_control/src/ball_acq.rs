//! Ball acquisition subsystem.
//!
//! Three orthogonal state machines advanced in turn by one tick:
//!
//! | Machine | States | Actuators |
//! |---------|--------|-----------|
//! | Arm | Standby, Rotate, RotateFindingHome, Holding, OpControl | arm motors |
//! | Flipper | Standby, Firing, HoldUp | flipper solenoid |
//! | Roller | Standby, RollerOn | roller motors |
//!
//! Every actuator is written exactly once, after all three machines ran.
//! The arm angle reference is only established by homing: the home switch
//! trips and both arm encoders are zeroed.

use std::sync::Arc;

use sparx_common::consts::{
    ACQUIRE_ANGLE, DEADBAND, DISTANCE_PER_TICK_BALLACQ, GATE_ANGLE, HIGH_ARM_POWER,
    HIGH_ROLLER_POWER, HOLDING_POWER, LEFT_ROLLER_PDP, MAX_ANGLE, RIGHT_ROLLER_PDP,
    SALLY_PORT_ANGLE, WAIT_FIRE_TIME,
};
use sparx_common::error::FaultFlags;
use sparx_common::hal::device::{
    Clock, DigitalInput, MagnetSensor, MotorChannel, PowerPanel, Solenoid,
};
use sparx_common::hal::io::BallAcqIo;
use sparx_common::telemetry::Dashboard;
use tracing::{debug, info};

use crate::encoder::EncoderTracker;
use crate::runner::Subsystem;

/// Flipper solenoid level that pushes the ball out.
const FLIPPER_EXTENDED: bool = true;
const FLIPPER_CONTRACTED: bool = !FLIPPER_EXTENDED;
/// Fixed circular pivot position: long contracted, short contracted.
const CIRC_PIVOT_LONG: bool = false;
const CIRC_PIVOT_SHORT: bool = true;

// ─── States ─────────────────────────────────────────────────────────

/// Arm positioning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmState {
    Standby,
    /// Bang-bang toward the wanted angle.
    Rotate,
    /// Drive toward the home switch, then zero the encoders.
    #[default]
    RotateFindingHome,
    /// Gravity hold at the wanted angle.
    Holding,
    /// Power supplied by the operator stick.
    OpControl,
}

/// Flipper pneumatic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipperState {
    #[default]
    Standby,
    /// Timed pulse of `WAIT_FIRE_TIME`.
    Firing,
    /// Extended until told otherwise.
    HoldUp,
}

/// Roller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollerState {
    #[default]
    Standby,
    RollerOn,
}

/// Left/right arm power pair, before the mounting negation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct ArmPowers {
    left: f64,
    right: f64,
}

impl ArmPowers {
    const ZERO: Self = Self::both(0.0);

    const fn both(power: f64) -> Self {
        Self {
            left: power,
            right: power,
        }
    }
}

/// Bang-bang power for one arm side, 0 inside the deadband.
fn rotate_power(wanted: f64, current: f64) -> f64 {
    if current > wanted - DEADBAND && current < wanted + DEADBAND {
        0.0
    } else if wanted > current {
        -HIGH_ARM_POWER
    } else {
        HIGH_ARM_POWER
    }
}

#[inline]
fn within_band(angle: f64, wanted: f64) -> bool {
    angle > wanted - DEADBAND && angle < wanted + DEADBAND
}

// ─── Subsystem ──────────────────────────────────────────────────────

/// The ball manipulator.
pub struct BallAcq {
    clock: Arc<dyn Clock>,
    arm_left: Box<dyn MotorChannel>,
    arm_right: Box<dyn MotorChannel>,
    roller_left: Box<dyn MotorChannel>,
    roller_right: Box<dyn MotorChannel>,
    flipper_sol: Box<dyn Solenoid>,
    circ_pivot_long: Box<dyn Solenoid>,
    circ_pivot_short: Box<dyn Solenoid>,
    left: EncoderTracker,
    right: EncoderTracker,
    home_switch: MagnetSensor,
    ball_entered: Box<dyn DigitalInput>,
    ball_fully_in: Box<dyn DigitalInput>,
    pdp: Arc<dyn PowerPanel>,
    dashboard: Dashboard,

    arm: ArmState,
    flipper: FlipperState,
    roller: RollerState,

    wanted_arm_angle: f64,
    op_arm_power: f64,
    arm_power: ArmPowers,
    /// End of the current fire pulse; `Some` iff firing.
    fire_deadline: Option<f64>,
    reverse_rollers: bool,

    left_angle: f64,
    right_angle: f64,
    /// Peak roller current seen while the rollers ran [A].
    peak_roller_current: f64,
    faults: FaultFlags,
}

impl BallAcq {
    pub fn new(io: BallAcqIo, clock: Arc<dyn Clock>, dashboard: Dashboard) -> Self {
        let BallAcqIo {
            arm_left,
            arm_right,
            roller_left,
            roller_right,
            flipper,
            circ_pivot_long,
            circ_pivot_short,
            arm_encoder_left,
            arm_encoder_right,
            home_switch,
            ball_entered,
            ball_fully_in,
            pdp,
        } = io;

        Self {
            clock,
            arm_left,
            arm_right,
            roller_left,
            roller_right,
            flipper_sol: flipper,
            circ_pivot_long,
            circ_pivot_short,
            left: EncoderTracker::new(arm_encoder_left, DISTANCE_PER_TICK_BALLACQ),
            // Mirrored mounting: the right encoder counts down as the arm lowers.
            right: EncoderTracker::new(arm_encoder_right, -DISTANCE_PER_TICK_BALLACQ),
            home_switch,
            ball_entered,
            ball_fully_in,
            pdp,
            dashboard,
            arm: ArmState::RotateFindingHome,
            flipper: FlipperState::Standby,
            roller: RollerState::Standby,
            wanted_arm_angle: 0.0,
            op_arm_power: 0.0,
            arm_power: ArmPowers::ZERO,
            fire_deadline: None,
            reverse_rollers: false,
            left_angle: 0.0,
            right_angle: 0.0,
            peak_roller_current: 0.0,
            faults: FaultFlags::empty(),
        }
    }

    /// Run one tick.
    pub fn execute(&mut self) {
        let now = self.clock.now();
        self.left_angle = self.left.distance();
        self.right_angle = self.right.distance();

        self.step_arm();
        let flipper_out = self.step_flipper(now);
        let roller_power = self.step_roller();

        let roller_power = if self.reverse_rollers {
            -roller_power
        } else {
            roller_power
        };
        self.roller_right.set(roller_power);
        self.roller_left.set(-roller_power);
        self.arm_right.set(-self.arm_power.right);
        self.arm_left.set(self.arm_power.left);
        self.flipper_sol.set(flipper_out);
        self.circ_pivot_long.set(CIRC_PIVOT_LONG);
        self.circ_pivot_short.set(CIRC_PIVOT_SHORT);

        self.dashboard
            .put_bool("Ball Entered?", self.ball_entered.get());
        self.dashboard
            .put_bool("Ball in Flipper?", self.ball_fully_in.get());
        self.dashboard.put_text("Arm", format!("{:?}", self.arm));
    }

    fn step_arm(&mut self) {
        self.arm_power = match self.arm {
            ArmState::Standby => ArmPowers::ZERO,
            ArmState::Rotate => {
                let powers = ArmPowers {
                    left: rotate_power(self.wanted_arm_angle, self.left_angle),
                    right: rotate_power(self.wanted_arm_angle, self.right_angle),
                };
                if powers == ArmPowers::ZERO {
                    self.arm = ArmState::Standby;
                    debug!("Arm reached {:.1}°", self.wanted_arm_angle);
                }
                powers
            }
            ArmState::RotateFindingHome => {
                if self.home_switch.is_tripped() {
                    self.left.reset();
                    self.right.reset();
                    self.left_angle = 0.0;
                    self.right_angle = 0.0;
                    self.arm = ArmState::Standby;
                    self.roller = RollerState::Standby;
                    info!("Arm home found, encoders zeroed");
                    ArmPowers::ZERO
                } else {
                    self.wanted_arm_angle = 0.0;
                    ArmPowers::both(HIGH_ARM_POWER)
                }
            }
            ArmState::Holding => {
                if self.left_angle < self.wanted_arm_angle {
                    ArmPowers::ZERO
                } else {
                    ArmPowers::both(HOLDING_POWER)
                }
            }
            ArmState::OpControl => ArmPowers::both(self.op_arm_power),
        };
    }

    /// Advance the flipper; returns the solenoid level for this tick.
    fn step_flipper(&mut self, now: f64) -> bool {
        match self.flipper {
            FlipperState::Standby => FLIPPER_CONTRACTED,
            FlipperState::HoldUp => FLIPPER_EXTENDED,
            FlipperState::Firing => match self.fire_deadline {
                None => {
                    self.fire_deadline = Some(now + WAIT_FIRE_TIME);
                    FLIPPER_EXTENDED
                }
                Some(deadline) if now >= deadline => {
                    self.fire_deadline = None;
                    self.flipper = FlipperState::Standby;
                    info!("Flipper fired");
                    FLIPPER_CONTRACTED
                }
                Some(_) => FLIPPER_EXTENDED,
            },
        }
    }

    /// Advance the rollers; returns the roller power before the reverse flag.
    fn step_roller(&mut self) -> f64 {
        match self.roller {
            RollerState::Standby => 0.0,
            RollerState::RollerOn => {
                let current = self
                    .pdp
                    .current(LEFT_ROLLER_PDP)
                    .max(self.pdp.current(RIGHT_ROLLER_PDP));
                if current > self.peak_roller_current {
                    self.peak_roller_current = current;
                    debug!("New peak roller current: {:.1} A", current);
                }
                HIGH_ROLLER_POWER
            }
        }
    }

    // ─── Intents ────────────────────────────────────────────────────

    /// Arm power used in OpControl. Ignored in any other arm state.
    pub fn set_arm_power(&mut self, power: f64) {
        if self.arm == ArmState::OpControl {
            self.op_arm_power = power;
        }
    }

    /// Enter (or leave to Standby) operator arm control.
    pub fn set_op_control(&mut self, op_control: bool) {
        self.op_arm_power = 0.0;
        self.arm = if op_control {
            ArmState::OpControl
        } else {
            ArmState::Standby
        };
    }

    /// Home the arm with the rollers off.
    pub fn set_home(&mut self) {
        self.arm = ArmState::RotateFindingHome;
        self.roller = RollerState::Standby;
        self.reverse_rollers = false;
        info!("Arm homing");
    }

    /// Home the arm with the rollers on.
    pub fn home_rollers(&mut self) {
        self.arm = ArmState::RotateFindingHome;
        self.roller = RollerState::RollerOn;
        self.reverse_rollers = false;
        info!("Arm homing, rollers on");
    }

    pub fn acquire_ball(&mut self) {
        self.rotate_to(ACQUIRE_ANGLE);
        self.roller = RollerState::RollerOn;
    }

    pub fn raise_gate(&mut self) {
        self.rotate_to(GATE_ANGLE);
        self.roller = RollerState::Standby;
    }

    /// Sally port position, flipper held up to clear the door.
    pub fn go_to_sally_port_position(&mut self) {
        self.rotate_to(SALLY_PORT_ANGLE);
        self.roller = RollerState::Standby;
        self.hold_flipper_up();
    }

    /// Low bar position, flipper held up to clear the bar.
    pub fn go_to_low_bar_position(&mut self) {
        self.rotate_to(MAX_ANGLE);
        self.roller = RollerState::Standby;
        self.hold_flipper_up();
    }

    /// Lower the arm for the climb. True once both sides average inside the band.
    pub fn move_to_scale(&mut self) -> bool {
        self.rotate_to(MAX_ANGLE);
        self.roller = RollerState::Standby;
        within_band(self.average_arm_angle(), self.wanted_arm_angle)
    }

    /// Hold the arm where it is against gravity.
    pub fn hold_position(&mut self) {
        self.wanted_arm_angle = self.left.distance();
        self.arm = ArmState::Holding;
    }

    /// Start a fire pulse. Rejected while already firing.
    pub fn fire(&mut self) -> bool {
        if self.flipper == FlipperState::Firing {
            self.faults.insert(FaultFlags::FIRE_REJECTED);
            debug!("Fire rejected: flipper already firing");
            return false;
        }
        self.flipper = FlipperState::Firing;
        self.fire_deadline = None;
        true
    }

    /// Toggle the rollers. Returns whether they are now on.
    pub fn toggle_roller(&mut self) -> bool {
        self.roller = match self.roller {
            RollerState::RollerOn => RollerState::Standby,
            RollerState::Standby => RollerState::RollerOn,
        };
        self.roller == RollerState::RollerOn
    }

    pub fn reverse_roller(&mut self) {
        self.reverse_rollers = !self.reverse_rollers;
    }

    pub fn set_reverse_roller(&mut self, reverse: bool) {
        self.reverse_rollers = reverse;
    }

    /// Stop every machine. Outputs are zeroed and the flipper contracted
    /// by the next tick.
    pub fn stop_all(&mut self) {
        self.arm = ArmState::Standby;
        self.flipper = FlipperState::Standby;
        self.fire_deadline = None;
        self.roller = RollerState::Standby;
        self.reverse_rollers = false;
    }

    fn rotate_to(&mut self, angle: f64) {
        self.wanted_arm_angle = angle;
        self.arm = ArmState::Rotate;
        self.reverse_rollers = false;
        info!("Arm rotating to {:.1}°", angle);
    }

    fn hold_flipper_up(&mut self) {
        if self.flipper != FlipperState::Firing {
            self.flipper = FlipperState::HoldUp;
        }
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub fn arm_state(&self) -> ArmState {
        self.arm
    }

    #[inline]
    pub fn flipper_state(&self) -> FlipperState {
        self.flipper
    }

    #[inline]
    pub fn roller_state(&self) -> RollerState {
        self.roller
    }

    #[inline]
    pub fn is_firing(&self) -> bool {
        self.fire_deadline.is_some()
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse_rollers
    }

    pub fn wanted_arm_angle(&self) -> f64 {
        self.wanted_arm_angle
    }

    /// Left arm angle sampled by the last tick [degrees].
    pub fn left_arm_angle(&self) -> f64 {
        self.left_angle
    }

    /// Right arm angle sampled by the last tick [degrees].
    pub fn right_arm_angle(&self) -> f64 {
        self.right_angle
    }

    pub fn average_arm_angle(&self) -> f64 {
        (self.left_angle + self.right_angle) / 2.0
    }

    pub fn peak_roller_current(&self) -> f64 {
        self.peak_roller_current
    }

    pub fn faults(&self) -> FaultFlags {
        self.faults
    }

    pub fn clear_faults(&mut self) {
        self.faults = FaultFlags::empty();
    }
}

impl Subsystem for BallAcq {
    fn name(&self) -> &'static str {
        "BallAcq"
    }

    fn execute(&mut self) {
        BallAcq::execute(self);
    }

    fn write_log(&self) {
        info!(
            "Arm: {:?}, roller: {:?}, flipper: {:?}",
            self.arm, self.roller, self.flipper
        );
        info!(
            "Roller powers (left, right): {:.2}, {:.2}",
            self.roller_left.get(),
            self.roller_right.get()
        );
        info!(
            "Arm powers (left, right): {:.2}, {:.2}",
            self.arm_left.get(),
            self.arm_right.get()
        );
        info!(
            "Arm degrees (left, right): {:.2}, {:.2}, home: {}",
            self.left_angle,
            self.right_angle,
            self.home_switch.is_tripped()
        );
        info!(
            "Ball entered: {}, fully in: {}",
            self.ball_entered.get(),
            self.ball_fully_in.get()
        );
    }
}

impl std::fmt::Debug for BallAcq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BallAcq")
            .field("arm", &self.arm)
            .field("flipper", &self.flipper)
            .field("roller", &self.roller)
            .field("wanted_arm_angle", &self.wanted_arm_angle)
            .finish()
    }
}
