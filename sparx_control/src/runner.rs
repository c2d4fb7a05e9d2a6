//! Periodic task runner.
//!
//! One worker thread per subsystem. Each iteration locks the subsystem,
//! runs one tick, releases the lock, dumps the subsystem log when the log
//! interval elapsed, then sleeps the fixed delay. The loop is intent
//! following: there is no drift correction and a late tick is only counted.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A periodically ticked subsystem.
pub trait Subsystem: Send {
    /// Task name used for the worker thread and the logs.
    fn name(&self) -> &'static str;

    /// One tick. Must not block.
    fn execute(&mut self);

    /// Periodic state dump.
    fn write_log(&self);
}

/// Errors raised by the task runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to spawn task {name}: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Task {name} panicked")]
    Panicked { name: &'static str },
}

/// Tick timing statistics of one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of ticks executed
    pub cycle_count: u64,
    /// Ticks that took longer than the period
    pub timing_violations: u64,
    /// Longest observed tick
    pub max_tick_time_us: u64,
    /// Sum of tick times for the average
    pub total_tick_time_us: u64,
}

impl TaskStats {
    /// Record one tick. Returns true on a timing violation.
    pub fn record(&mut self, tick: Duration, period: Duration) -> bool {
        let tick_us = tick.as_micros() as u64;
        self.cycle_count += 1;
        self.total_tick_time_us += tick_us;
        self.max_tick_time_us = self.max_tick_time_us.max(tick_us);
        if tick > period {
            self.timing_violations += 1;
            return true;
        }
        false
    }

    pub fn avg_tick_time_us(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.total_tick_time_us / self.cycle_count
        }
    }
}

/// Handle of a running periodic task.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    handle: JoinHandle<TaskStats>,
}

impl PeriodicTask {
    /// Spawn a worker ticking `subsystem` every `period` until `running` clears.
    pub fn spawn<S>(
        subsystem: Arc<Mutex<S>>,
        period: Duration,
        log_interval: Duration,
        running: Arc<AtomicBool>,
    ) -> Result<Self, RunnerError>
    where
        S: Subsystem + 'static,
    {
        let name = subsystem.lock().name();
        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run_loop(name, &subsystem, period, log_interval, &running))
            .map_err(|source| RunnerError::Spawn { name, source })?;

        info!("Task {} started (period={}ms)", name, period.as_millis());
        Ok(Self { name, handle })
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait for the worker to stop and return its statistics.
    pub fn join(self) -> Result<TaskStats, RunnerError> {
        let name = self.name;
        self.handle
            .join()
            .map_err(|_| RunnerError::Panicked { name })
    }
}

fn run_loop<S: Subsystem>(
    name: &'static str,
    subsystem: &Mutex<S>,
    period: Duration,
    log_interval: Duration,
    running: &AtomicBool,
) -> TaskStats {
    let mut stats = TaskStats::default();
    let mut last_log = Instant::now();

    while running.load(Ordering::SeqCst) {
        let tick_start = Instant::now();
        subsystem.lock().execute();
        let tick = tick_start.elapsed();

        if stats.record(tick, period)
            && (stats.timing_violations <= 10 || stats.timing_violations % 1000 == 0)
        {
            warn!(
                "{}: timing violation #{}: tick took {}us (period {}us)",
                name,
                stats.timing_violations,
                tick.as_micros(),
                period.as_micros()
            );
        }

        if last_log.elapsed() >= log_interval {
            subsystem.lock().write_log();
            last_log = Instant::now();
        }

        if stats.cycle_count % 1000 == 0 {
            debug!(
                "{}: {} ticks, avg={}us, max={}us",
                name,
                stats.cycle_count,
                stats.avg_tick_time_us(),
                stats.max_tick_time_us
            );
        }

        thread::sleep(period);
    }

    info!(
        "Task {} stopped after {} ticks (violations: {})",
        name, stats.cycle_count, stats.timing_violations
    );
    stats
}
