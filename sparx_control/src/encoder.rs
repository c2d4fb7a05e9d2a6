//! Encoder tracking.
//!
//! Wraps a raw tick source: distance is read straight from the counter,
//! speed is the slope over a short window of samples taken by [`EncoderTracker::update`].

use sparx_common::consts::SPEED_WINDOW;
use sparx_common::hal::device::Encoder;

#[derive(Debug, Clone, Copy)]
struct Sample {
    ticks: i64,
    time: f64,
}

/// Distance and windowed speed of one encoder.
pub struct EncoderTracker {
    source: Box<dyn Encoder>,
    /// Scale [units/tick]; negative to flip the counting direction.
    distance_per_tick: f64,
    /// Ring of the last `SPEED_WINDOW` samples.
    window: [Option<Sample>; SPEED_WINDOW],
    /// Next slot of `window` to overwrite.
    head: usize,
    speed: f64,
}

impl EncoderTracker {
    pub fn new(source: Box<dyn Encoder>, distance_per_tick: f64) -> Self {
        Self {
            source,
            distance_per_tick,
            window: [None; SPEED_WINDOW],
            head: 0,
            speed: 0.0,
        }
    }

    /// Sample the counter at `now` and recompute the speed.
    ///
    /// Must be called once per tick; [`speed`](Self::speed) only changes here.
    pub fn update(&mut self, now: f64) {
        let newest = Sample {
            ticks: self.source.raw(),
            time: now,
        };
        // The slot about to be overwritten holds the oldest sample once the
        // ring is full; before that the first slot does.
        let oldest = self.window[self.head].or(self.window[0]);
        self.window[self.head] = Some(newest);
        self.head = (self.head + 1) % SPEED_WINDOW;

        self.speed = match oldest {
            Some(old) if newest.time > old.time => {
                (newest.ticks - old.ticks) as f64 * self.distance_per_tick
                    / (newest.time - old.time)
            }
            Some(_) => self.speed,
            None => 0.0,
        };
    }

    /// Travel since the last reset.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.source.raw() as f64 * self.distance_per_tick
    }

    /// Speed computed by the last [`update`](Self::update).
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Zero the counter. The speed history is rebased onto the new zero so
    /// the speed stays continuous across the reset.
    pub fn reset(&mut self) {
        let before = self.source.raw();
        self.source.reset();
        for sample in self.window.iter_mut().flatten() {
            sample.ticks -= before;
        }
    }
}

impl std::fmt::Debug for EncoderTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderTracker")
            .field("distance", &self.distance())
            .field("speed", &self.speed)
            .finish()
    }
}
