//! # SPARX Robot
//!
//! Runs the coordination core on a workstation against the simulation HAL.
//!
//! Every subsystem gets its own periodic task, plus one task stepping the
//! kinematic plant so encoders, gyros and the arm home switch follow the
//! motor outputs. Stops on Ctrl-C or after `--duration` seconds.

use clap::Parser;
use parking_lot::Mutex;
use sparx_common::config::{ConfigLoader, LogLevel, RobotConfig};
use sparx_common::hal::device::Clock;
use sparx_control::robot::Robot;
use sparx_control::runner::{PeriodicTask, Subsystem};
use sparx_hal::sim::{MonotonicClock, SimPlant, SimRig};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

/// Poll interval of the supervising main thread.
const SUPERVISOR_POLL: Duration = Duration::from_millis(50);

/// SPARX Robot — subsystem coordination core on the simulation HAL
#[derive(Parser, Debug)]
#[command(name = "sparx_robot")]
#[command(author = "Team 1126 SPARX")]
#[command(version)]
#[command(about = "Drives, ball acquisition and scaling control loops on a simulated robot")]
struct Args {
    /// Path to robot configuration TOML. Defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many seconds (default: run until Ctrl-C).
    #[arg(long, value_name = "SECONDS")]
    duration: Option<f64>,

    /// Start an autonomous drive of this many inches (negative = backwards).
    #[arg(long, value_name = "INCHES", allow_hyphen_values = true)]
    drive: Option<f64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RobotConfig::load(path),
        None => Ok(RobotConfig::default()),
    };
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("SPARX robot v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("SPARX robot shutdown complete");
}

fn run(args: &Args, config: RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let duration = args
        .duration
        .map(Duration::try_from_secs_f64)
        .transpose()?;
    info!(
        "Config OK: service={}, drives period={}ms, plant step={}ms",
        config.shared.service_name, config.tasks.drives_period_ms, config.simulation.step_ms
    );

    let rig = SimRig::new();
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let robot = Robot::new(rig.robot_io(Arc::clone(&clock)));

    if let Some(distance) = args.drive {
        robot.drives.lock().drive_wanted_distance(distance);
    }

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let plant = PlantTask {
        last: clock.now(),
        plant: rig.plant(&config.simulation),
        clock,
    };
    let mut tasks = robot.spawn(&config.tasks, &running)?;
    tasks.push(PeriodicTask::spawn(
        Arc::new(Mutex::new(plant)),
        config.simulation.step(),
        config.tasks.log_interval(),
        Arc::clone(&running),
    )?);
    info!("{} tasks running", tasks.len());

    let start = Instant::now();
    let mut last_status = Instant::now();
    while running.load(Ordering::SeqCst) {
        if duration.is_some_and(|d| start.elapsed() >= d) {
            info!("Run duration elapsed");
            running.store(false, Ordering::SeqCst);
            break;
        }
        if last_status.elapsed() >= config.tasks.log_interval() {
            info!("Dashboard: {}", robot.dashboard.snapshot_json()?);
            last_status = Instant::now();
        }
        thread::sleep(SUPERVISOR_POLL);
    }

    for (name, stats) in tasks.join()? {
        info!(
            "{}: {} ticks, avg={}us, max={}us, violations={}",
            name,
            stats.cycle_count,
            stats.avg_tick_time_us(),
            stats.max_tick_time_us,
            stats.timing_violations
        );
    }
    info!("Final dashboard: {}", robot.dashboard.snapshot_json()?);
    Ok(())
}

/// Steps the plant by the wall-clock time elapsed since its last tick.
struct PlantTask {
    plant: SimPlant,
    clock: Arc<dyn Clock>,
    last: f64,
}

impl Subsystem for PlantTask {
    fn name(&self) -> &'static str {
        "Plant"
    }

    fn execute(&mut self) {
        let now = self.clock.now();
        self.plant.step(now - self.last);
        self.last = now;
    }

    fn write_log(&self) {
        debug!(
            "Plant: travel (left, right) = {:.1}, {:.1} in, heading = {:.1}°, arm = {:.1}°",
            self.plant.left_travel(),
            self.plant.right_travel(),
            self.plant.heading(),
            self.plant.arm_angle()
        );
    }
}

fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match log_level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
