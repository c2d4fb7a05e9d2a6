//! Composition root.
//!
//! Builds every subsystem from one [`RobotIo`] with its peers injected, and
//! starts one periodic task per subsystem. The Scaling ↔ Drives handshake is
//! a [`WinchLink`] shared by the two; Controls holds the BallAcq and Drives
//! handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use sparx_common::config::TaskConfig;
use sparx_common::hal::io::RobotIo;
use sparx_common::mailbox::WinchLink;
use sparx_common::telemetry::Dashboard;
use tracing::{info, warn};

use crate::ball_acq::BallAcq;
use crate::controls::Controls;
use crate::drives::Drives;
use crate::runner::{PeriodicTask, RunnerError, Subsystem, TaskStats};
use crate::scaling::Scaling;

/// All subsystems of the robot.
pub struct Robot {
    pub drives: Arc<Mutex<Drives>>,
    pub ball_acq: Arc<Mutex<BallAcq>>,
    pub scaling: Arc<Mutex<Scaling>>,
    pub controls: Arc<Mutex<Controls>>,
    pub dashboard: Dashboard,
}

impl Robot {
    pub fn new(io: RobotIo) -> Self {
        let RobotIo {
            clock,
            drives,
            ball_acq,
            scaling,
            controls,
        } = io;

        let dashboard = Dashboard::new();
        let link = WinchLink::new();

        let drives = Arc::new(Mutex::new(Drives::new(
            drives,
            Arc::clone(&clock),
            link.clone(),
            dashboard.clone(),
        )));
        let ball_acq = Arc::new(Mutex::new(BallAcq::new(
            ball_acq,
            Arc::clone(&clock),
            dashboard.clone(),
        )));
        let scaling = Arc::new(Mutex::new(Scaling::new(scaling, link, dashboard.clone())));
        let controls = Arc::new(Mutex::new(Controls::new(
            controls,
            clock,
            Arc::clone(&ball_acq),
            Arc::clone(&drives),
        )));

        info!("Robot subsystems constructed");
        Self {
            drives,
            ball_acq,
            scaling,
            controls,
            dashboard,
        }
    }

    /// Run one tick of every subsystem on the calling thread.
    ///
    /// Priority order: Controls, BallAcq, Drives, Scaling.
    pub fn tick(&self) {
        self.controls.lock().execute();
        self.ball_acq.lock().execute();
        self.drives.lock().execute();
        self.scaling.lock().execute();
    }

    /// Start one periodic task per subsystem, highest priority first.
    pub fn spawn(
        &self,
        config: &TaskConfig,
        running: &Arc<AtomicBool>,
    ) -> Result<RobotTasks, RunnerError> {
        let log_interval = config.log_interval();
        let spawners: Vec<Spawner<'_>> = vec![
            Box::new(|| spawn_one(&self.controls, config.controls_period_ms, log_interval, running)),
            Box::new(|| spawn_one(&self.ball_acq, config.ball_acq_period_ms, log_interval, running)),
            Box::new(|| spawn_one(&self.drives, config.drives_period_ms, log_interval, running)),
            Box::new(|| spawn_one(&self.scaling, config.scaling_period_ms, log_interval, running)),
        ];
        start_all(spawners, running)
    }
}

type Spawner<'a> = Box<dyn FnOnce() -> Result<PeriodicTask, RunnerError> + 'a>;

/// Run the spawners in order. On the first failure the tasks already
/// started are stopped and joined before the error is returned.
fn start_all(spawners: Vec<Spawner<'_>>, running: &AtomicBool) -> Result<RobotTasks, RunnerError> {
    let mut tasks = RobotTasks {
        tasks: Vec::with_capacity(spawners.len()),
    };
    for spawn in spawners {
        match spawn() {
            Ok(task) => tasks.push(task),
            Err(e) => {
                running.store(false, Ordering::SeqCst);
                let started = tasks.len();
                if let Err(join_err) = tasks.join() {
                    warn!("Joining started tasks after spawn failure: {join_err}");
                }
                warn!("Stopped {started} started task(s) after spawn failure");
                return Err(e);
            }
        }
    }
    Ok(tasks)
}

fn spawn_one<S: Subsystem + 'static>(
    subsystem: &Arc<Mutex<S>>,
    period_ms: u64,
    log_interval: Duration,
    running: &Arc<AtomicBool>,
) -> Result<PeriodicTask, RunnerError> {
    PeriodicTask::spawn(
        Arc::clone(subsystem),
        Duration::from_millis(period_ms),
        log_interval,
        Arc::clone(running),
    )
}

/// The running subsystem tasks.
#[derive(Debug)]
pub struct RobotTasks {
    tasks: Vec<PeriodicTask>,
}

impl RobotTasks {
    pub fn push(&mut self, task: PeriodicTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Join every task. Stops at the first task that panicked.
    pub fn join(self) -> Result<Vec<(&'static str, TaskStats)>, RunnerError> {
        self.tasks
            .into_iter()
            .map(|task| {
                let name = task.name();
                task.join().map(|stats| (name, stats))
            })
            .collect()
    }
}
