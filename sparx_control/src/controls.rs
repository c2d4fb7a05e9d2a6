//! Operator surface.
//!
//! Polls the three pads every tick and forwards edges and levels as intent
//! calls. Controls owns no actuator; it locks one peer subsystem at a time
//! and never holds two locks at once.
//!
//! | Input | Intent |
//! |-------|--------|
//! | Operator POV up / down / left / right | home with rollers / low bar / home / acquire |
//! | Operator A / B / Y | toggle roller / reverse roller / stop all |
//! | Operator X | drawbridge: home, then low bar after `DRAWBRIDGE_TIME` |
//! | Operator right trigger | fire |
//! | Operator right stick Y | arm power in OpControl |
//! | Driver sticks Y | tank powers |
//! | Driver right trigger / thumb | toggle shift / toggle driver shifting |
//! | Driver left trigger (held) | hold first gear |

use std::sync::Arc;

use parking_lot::Mutex;
use sparx_common::consts::{DRAWBRIDGE_TIME, FIRE_TRIGGER_THRESHOLD, OP_ARM_POWER_DIVISOR};
use sparx_common::hal::device::{Clock, OperatorInput, RobotState};
use sparx_common::hal::io::ControlsIo;
use sparx_common::hal::types::Pov;
use tracing::info;

use crate::ball_acq::{BallAcq, FlipperState};
use crate::drives::Drives;
use crate::runner::Subsystem;

// ─── Pad mapping ────────────────────────────────────────────────────

const XBOX_A: usize = 1;
const XBOX_B: usize = 2;
const XBOX_X: usize = 3;
const XBOX_Y: usize = 4;
const XBOX_R2: usize = 3;
const XBOX_RIGHT_Y: usize = 5;

const DRIVER_Y: usize = 1;
const DRIVER_TRIGGER: usize = 1;
const DRIVER_THUMB: usize = 2;

/// Rising-edge detector for a polled button.
#[derive(Debug, Clone, Copy, Default)]
struct Edge {
    prev: bool,
}

impl Edge {
    #[inline]
    fn rising(&mut self, level: bool) -> bool {
        let rose = level && !self.prev;
        self.prev = level;
        rose
    }
}

pub struct Controls {
    operator: Box<dyn OperatorInput>,
    driver_left: Box<dyn OperatorInput>,
    driver_right: Box<dyn OperatorInput>,
    robot_state: Arc<dyn RobotState>,
    clock: Arc<dyn Clock>,
    ball_acq: Arc<Mutex<BallAcq>>,
    drives: Arc<Mutex<Drives>>,

    last_pov: Pov,
    op_control: bool,
    toggle_roller: Edge,
    reverse_roller: Edge,
    stop_all: Edge,
    drawbridge: Edge,
    toggle_shift: Edge,
    driver_shifting: Edge,
    hold_first: bool,
    /// Low-bar follow-up of the drawbridge fires after this time [s].
    drawbridge_deadline: Option<f64>,
}

impl Controls {
    pub fn new(
        io: ControlsIo,
        clock: Arc<dyn Clock>,
        ball_acq: Arc<Mutex<BallAcq>>,
        drives: Arc<Mutex<Drives>>,
    ) -> Self {
        Self {
            operator: io.operator,
            driver_left: io.driver_left,
            driver_right: io.driver_right,
            robot_state: io.robot_state,
            clock,
            ball_acq,
            drives,
            last_pov: Pov::Centered,
            op_control: false,
            toggle_roller: Edge::default(),
            reverse_roller: Edge::default(),
            stop_all: Edge::default(),
            drawbridge: Edge::default(),
            toggle_shift: Edge::default(),
            driver_shifting: Edge::default(),
            hold_first: false,
            drawbridge_deadline: None,
        }
    }

    /// Run one tick. Does nothing outside operator control.
    pub fn execute(&mut self) {
        if !self.robot_state.is_operator_control() {
            return;
        }
        let now = self.clock.now();
        self.operator_tick(now);
        self.driver_tick();
    }

    fn operator_tick(&mut self, now: f64) {
        let mut acq = self.ball_acq.lock();

        let pov = self.operator.pov();
        if pov != self.last_pov {
            match pov {
                Pov::Up => {
                    info!("OP Button: Home with rollers");
                    acq.home_rollers();
                }
                Pov::Down => {
                    info!("OP Button: Go to floor");
                    acq.go_to_low_bar_position();
                }
                Pov::Left => {
                    info!("OP Button: Home without rollers");
                    acq.set_home();
                }
                Pov::Right => {
                    info!("OP Button: Acquire ball position");
                    acq.acquire_ball();
                }
                Pov::Centered | Pov::Diagonal(_) => {}
            }
        }
        self.last_pov = pov;

        if self.toggle_roller.rising(self.operator.button(XBOX_A)) {
            info!("OP Button: Toggle roller");
            acq.toggle_roller();
        }
        if self.reverse_roller.rising(self.operator.button(XBOX_B)) {
            info!("OP Button: Reverse rollers");
            acq.reverse_roller();
        }
        if self.stop_all.rising(self.operator.button(XBOX_Y)) {
            info!("OP Button: E-stop BallAcq");
            acq.stop_all();
        }
        if self.drawbridge.rising(self.operator.button(XBOX_X)) {
            info!("OP Button: Drawbridge");
            self.drawbridge_deadline = Some(now + DRAWBRIDGE_TIME);
            acq.set_home();
        }

        if self.operator.axis(XBOX_R2) > FIRE_TRIGGER_THRESHOLD
            && acq.flipper_state() != FlipperState::Firing
        {
            acq.fire();
        }

        let stick = self.operator.axis(XBOX_RIGHT_Y);
        let op_control = stick != 0.0;
        if op_control != self.op_control {
            acq.set_op_control(op_control);
        }
        if op_control {
            acq.set_arm_power(-stick / OP_ARM_POWER_DIVISOR);
        }
        self.op_control = op_control;

        if self.drawbridge_deadline.is_some_and(|deadline| now > deadline) {
            acq.go_to_low_bar_position();
            self.drawbridge_deadline = None;
        }
    }

    fn driver_tick(&mut self) {
        let mut drives = self.drives.lock();

        drives.set_power(self.driver_left.axis(DRIVER_Y), self.driver_right.axis(DRIVER_Y));

        if self.toggle_shift.rising(self.driver_right.button(DRIVER_TRIGGER)) {
            drives.toggle_shifting();
        }
        if self
            .driver_shifting
            .rising(self.driver_right.button(DRIVER_THUMB))
        {
            drives.driver_shifting();
        }
        let hold_first = self.driver_left.button(DRIVER_TRIGGER);
        if hold_first != self.hold_first {
            drives.hold_first(hold_first);
            self.hold_first = hold_first;
        }
    }

    /// Low-bar follow-up still pending.
    pub fn drawbridge_pending(&self) -> bool {
        self.drawbridge_deadline.is_some()
    }
}

impl Subsystem for Controls {
    fn name(&self) -> &'static str {
        "Controls"
    }

    fn execute(&mut self) {
        Controls::execute(self);
    }

    fn write_log(&self) {
        info!(
            "Operator arm control: {}, drawbridge pending: {}",
            self.op_control,
            self.drawbridge_pending()
        );
    }
}
