//! Fixed-rate frame pacing with late-frame detection.
//!
//! Wake times are absolute (`next_tick += period`) so the loop does not
//! drift. A frame that starts more than the late tolerance after its
//! deadline is late; if it is more than a whole period late the schedule
//! is rebased instead of bursting to catch up.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{EngineError, EngineResult};

pub const DEFAULT_RATE_HZ: f64 = 60.0;
const STATS_SAMPLES: usize = 600;
/// Default late tolerance as a fraction of the period.
const LATE_TOLERANCE_DIVISOR: u32 = 10;

/// Timing of one frame as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub index: u64,
    pub now: Instant,
    pub late: bool,
    /// Distance from the scheduled wake time.
    pub jitter: Duration,
}

/// Jitter statistics over a bounded window of recent frames.
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub total_frames: u64,
    pub late_frames: u64,
    pub max_jitter_ns: u64,
    pub last_jitter_ns: u64,
    samples: VecDeque<u64>,
    capacity: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::with_capacity(STATS_SAMPLES)
    }
}

impl FrameStats {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            total_frames: 0,
            late_frames: 0,
            max_jitter_ns: 0,
            last_jitter_ns: 0,
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, jitter_ns: u64, late: bool) {
        self.total_frames = self.total_frames.saturating_add(1);
        if late {
            self.late_frames = self.late_frames.saturating_add(1);
        }
        self.max_jitter_ns = self.max_jitter_ns.max(jitter_ns);
        self.last_jitter_ns = jitter_ns;
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(jitter_ns);
    }

    /// Jitter at `percentile` (0..=1) of the recent window, 0 when empty.
    pub fn percentile_jitter_ns(&self, percentile: f64) -> u64 {
        let mut scratch: Vec<u64> = self.samples.iter().copied().collect();
        if scratch.is_empty() {
            return 0;
        }
        let len = scratch.len();
        let p = if percentile.is_finite() {
            percentile.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let index = ((len as f64 * p) as usize).min(len.saturating_sub(1));
        let (_, value, _) = scratch.select_nth_unstable(index);
        *value
    }

    pub fn p50_jitter_ns(&self) -> u64 {
        self.percentile_jitter_ns(0.50)
    }

    pub fn p99_jitter_ns(&self) -> u64 {
        self.percentile_jitter_ns(0.99)
    }

    pub fn late_rate(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.late_frames as f64 / self.total_frames as f64
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn reset(&mut self) {
        *self = Self::with_capacity(self.capacity);
    }
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    period: Duration,
    late_tolerance: Duration,
    next_tick: Instant,
    tick_count: u64,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn new(rate_hz: f64) -> EngineResult<Self> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 || rate_hz > 10_000.0 {
            return Err(EngineError::InvalidRate(rate_hz));
        }
        Ok(Self::with_period(Duration::from_secs_f64(1.0 / rate_hz)))
    }

    pub fn with_period(period: Duration) -> Self {
        let period = period.max(Duration::from_micros(100));
        Self {
            period,
            late_tolerance: period / LATE_TOLERANCE_DIVISOR,
            next_tick: Instant::now(),
            tick_count: 0,
            stats: FrameStats::default(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Oversleeping by up to this much is ordinary OS jitter, not a late
    /// frame.
    pub fn late_tolerance(&self) -> Duration {
        self.late_tolerance
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Sleep until the next frame is due.
    pub fn wait_for_tick(&mut self) -> FrameTick {
        let start = Instant::now();
        if self.tick_count == 0 {
            self.next_tick = start;
        }
        let behind = start > self.next_tick;
        let jitter = if behind {
            start.saturating_duration_since(self.next_tick)
        } else {
            self.next_tick.saturating_duration_since(start)
        };
        let late = behind && jitter > self.late_tolerance;
        let jitter_ns = u64::try_from(jitter.as_nanos()).unwrap_or(u64::MAX);
        self.stats.record(jitter_ns, late);

        if late {
            warn!(
                frame = self.tick_count,
                late_ms = jitter.as_secs_f64() * 1000.0,
                "frame overran its period"
            );
            if jitter > self.period {
                self.next_tick = start;
            }
        } else if behind {
            debug!(
                frame = self.tick_count,
                behind_us = jitter.as_micros(),
                "frame slightly behind schedule"
            );
        } else {
            sleep_until(self.next_tick);
        }

        let index = self.tick_count;
        self.tick_count = self.tick_count.saturating_add(1);
        self.next_tick += self.period;
        FrameTick {
            index,
            now: Instant::now(),
            late,
            jitter,
        }
    }
}

fn sleep_until(deadline: Instant) {
    if let Some(d) = deadline.checked_duration_since(Instant::now()) {
        thread::sleep(d);
    }
}
