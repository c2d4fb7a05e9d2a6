mod auto_drive;
mod ball_handling;
mod defense;
mod operator;
mod scale_handshake;

use std::sync::Arc;

use sparx_common::config::SimulationConfig;
use sparx_control::robot::Robot;
use sparx_hal::sim::{SimClock, SimPlant, SimRig};

/// Robot tick period used by the harness [s].
pub const TICK: f64 = 0.02;

/// Robot, devices and plant sharing one manual clock.
pub struct Harness {
    pub rig: SimRig,
    pub clock: SimClock,
    pub robot: Robot,
    pub plant: SimPlant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&SimulationConfig::default())
    }

    pub fn with_config(config: &SimulationConfig) -> Self {
        let rig = SimRig::new();
        let clock = SimClock::starting_at(10.0);
        let robot = Robot::new(rig.robot_io(Arc::new(clock.clone())));
        let plant = rig.plant(config);
        Self {
            rig,
            clock,
            robot,
            plant,
        }
    }

    /// Advance time, tick every subsystem, then step the plant.
    pub fn tick(&mut self) {
        self.clock.advance(TICK);
        self.robot.tick();
        self.plant.step(TICK);
    }

    /// Tick with the plant frozen; sensors are driven by the test.
    pub fn tick_open_loop(&mut self) {
        self.clock.advance(TICK);
        self.robot.tick();
    }

    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until `done` holds. Returns the number of ticks taken.
    pub fn tick_until(&mut self, limit: usize, mut done: impl FnMut(&Robot) -> bool) -> Option<usize> {
        for n in 1..=limit {
            self.tick();
            if done(&self.robot) {
                return Some(n);
            }
        }
        None
    }

    pub fn now(&self) -> f64 {
        use sparx_common::hal::device::Clock;
        self.clock.now()
    }
}
