//! Scaling subsystem.
//!
//! Short sequencer for the tower climb. It owns the climber arm and winch
//! ratchet solenoids, watches the two hook sensors, and hands the actual
//! winching to Drives through the [`WinchLink`].

use sparx_common::consts::WINCH_IN_DISTANCE;
use sparx_common::error::FaultFlags;
use sparx_common::hal::device::{MagnetSensor, Solenoid};
use sparx_common::hal::io::ScalingIo;
use sparx_common::mailbox::{WinchLink, WinchRequest};
use sparx_common::telemetry::Dashboard;
use tracing::{error, info};

use crate::runner::Subsystem;

const ARMS_UP: bool = false;
const ARMS_DOWN: bool = !ARMS_UP;
const RATCHET_LOCK: bool = true;

/// Climb sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingState {
    #[default]
    Standby,
    /// Raise the arms, then back to Standby.
    Extending,
    /// Hooks checked every tick; waiting for the winch to finish.
    Scaling,
}

pub struct Scaling {
    arms: Box<dyn Solenoid>,
    ratchet: Box<dyn Solenoid>,
    left_hook: MagnetSensor,
    right_hook: MagnetSensor,
    link: WinchLink,
    dashboard: Dashboard,

    state: ScalingState,
    arms_out: bool,
    ratchet_out: bool,
    /// Hooks were missing on the previous Scaling tick.
    hooks_missing: bool,
    faults: FaultFlags,
}

impl Scaling {
    pub fn new(io: ScalingIo, link: WinchLink, dashboard: Dashboard) -> Self {
        let ScalingIo {
            mut arms,
            mut ratchet,
            left_hook,
            right_hook,
        } = io;

        arms.set(ARMS_DOWN);
        ratchet.set(RATCHET_LOCK);

        Self {
            arms,
            ratchet,
            left_hook,
            right_hook,
            link,
            dashboard,
            state: ScalingState::Standby,
            arms_out: ARMS_DOWN,
            ratchet_out: RATCHET_LOCK,
            hooks_missing: false,
            faults: FaultFlags::empty(),
        }
    }

    /// Run one tick.
    pub fn execute(&mut self) {
        let hooked = self.hooks_engaged();
        self.link.publish_hooked(hooked);

        match self.state {
            ScalingState::Standby => {}
            ScalingState::Extending => {
                self.arms_out = ARMS_UP;
                self.state = ScalingState::Standby;
                info!("Climber arms extended");
            }
            ScalingState::Scaling => {
                if hooked {
                    self.hooks_missing = false;
                    self.arms_out = ARMS_DOWN;
                    if self.link.take_done() {
                        self.state = ScalingState::Standby;
                        info!("Scaling complete");
                    }
                } else {
                    self.faults.insert(FaultFlags::HOOKS_MISSING);
                    if !self.hooks_missing {
                        error!(
                            left = self.left_hook.is_tripped(),
                            right = self.right_hook.is_tripped(),
                            "Hooks not found"
                        );
                    }
                    self.hooks_missing = true;
                }
            }
        }

        self.arms.set(self.arms_out);
        self.ratchet.set(self.ratchet_out);

        self.dashboard.put_bool("Hooks Engaged?", hooked);
        self.dashboard
            .put_text("Scaling", format!("{:?}", self.state));
    }

    #[inline]
    fn hooks_engaged(&self) -> bool {
        self.left_hook.is_tripped() && self.right_hook.is_tripped()
    }

    // ─── Intents ────────────────────────────────────────────────────

    pub fn extend_arms(&mut self) {
        self.state = ScalingState::Extending;
    }

    /// Start the climb: arm the Drives winch and wait for the hooks.
    pub fn scale(&mut self) {
        self.state = ScalingState::Scaling;
        self.hooks_missing = false;
        self.link.request(WinchRequest::BeginWinch {
            distance: WINCH_IN_DISTANCE,
        });
        info!("Scaling started: {:.1} in", WINCH_IN_DISTANCE);
    }

    /// Abort the climb and everything Drives does on its own.
    pub fn estop(&mut self) {
        self.link.request(WinchRequest::EStop);
        self.state = ScalingState::Standby;
        info!("Scaling e-stop");
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> ScalingState {
        self.state
    }

    pub fn arms_down(&self) -> bool {
        self.arms_out == ARMS_DOWN
    }

    pub fn ratchet_locked(&self) -> bool {
        self.ratchet_out == RATCHET_LOCK
    }

    pub fn faults(&self) -> FaultFlags {
        self.faults
    }

    pub fn clear_faults(&mut self) {
        self.faults = FaultFlags::empty();
    }
}

impl Subsystem for Scaling {
    fn name(&self) -> &'static str {
        "Scaling"
    }

    fn execute(&mut self) {
        Scaling::execute(self);
    }

    fn write_log(&self) {
        info!(
            "Scaling: {:?}, hooks (left, right): {}, {}",
            self.state,
            self.left_hook.is_tripped(),
            self.right_hook.is_tripped()
        );
    }
}

impl std::fmt::Debug for Scaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scaling")
            .field("state", &self.state)
            .field("arms_down", &self.arms_down())
            .field("faults", &self.faults)
            .finish()
    }
}
