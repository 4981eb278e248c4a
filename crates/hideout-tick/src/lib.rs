//! Fixed-cadence tick scheduler for Hideout rooms.
//!
//! Every room runs one scheduler. The room loop waits on
//! [`TickScheduler::wait_for_tick`] inside its `tokio::select!` alongside the
//! command channel, runs its simulation step, then reports back with
//! [`TickScheduler::record_tick_end`]:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* join, leave, hit... */ }
//!         _ = scheduler.wait_for_tick() => {
//!             room.update();
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! The interval is the only clock the simulation has. Modes that want
//! one-second granularity count ticks instead of starting their own timers,
//! so drift only comes from scheduling delay.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`TickScheduler`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between two ticks. Default: 100 ms.
    pub interval: Duration,
    /// Fraction of the interval (0.0–1.0) a tick may use before a warning
    /// is logged. Default: 0.80.
    pub budget_warn_threshold: f64,
    /// Upper bound of the random delay added to the first tick so rooms
    /// created in the same instant don't tick in lockstep.
    pub initial_jitter: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            budget_warn_threshold: 0.80,
            initial_jitter: Duration::from_millis(2),
        }
    }
}

impl TickConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Config for a specific interval with default thresholds.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = self.interval.as_micros() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info and stats
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// `true` if the tick fired more than 10% of an interval late.
    pub overrun: bool,
    /// Whole intervals dropped because the loop fell behind.
    pub ticks_skipped: u64,
}

/// Running counters kept by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Longest simulation step reported through `record_tick_end`.
    pub max_tick_time: Duration,
    /// Most recent simulation step.
    pub last_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-cadence scheduler. A late tick never triggers a burst of catch-up
/// ticks: the next deadline is always measured from when the tick actually
/// fired.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    next_tick: TokioInstant,
    /// Wall-clock start of the current simulation step.
    tick_start: Option<Instant>,
    stats: TickStats,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();

        let jitter_us = config.initial_jitter.as_micros() as u64;
        let jitter = if jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..jitter_us))
        } else {
            Duration::ZERO
        };

        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            "tick scheduler created"
        );

        Self {
            next_tick: TokioInstant::now() + config.interval + jitter,
            config,
            tick_count: 0,
            tick_start: None,
            stats: TickStats::default(),
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self::new(TickConfig::with_interval(interval))
    }

    /// Waits until the next tick is due. Cancel-safe, so it can sit in a
    /// `select!` next to a command channel.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let interval = self.config.interval;
        let deadline = self.next_tick;
        time::sleep_until(deadline).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(deadline);
        let overrun = late_by > interval / 10;
        let ticks_skipped = if overrun {
            (late_by.as_nanos() / interval.as_nanos()) as u64
        } else {
            0
        };
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun, skipping ahead"
            );
        }
        self.next_tick = now + interval;

        self.stats.total_ticks += 1;
        self.stats.total_skipped += ticks_skipped;
        if overrun {
            self.stats.total_overruns += 1;
        }

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    /// Reports that the simulation step for the current tick finished.
    /// Returns how long the step took; a no-op returning zero when no tick
    /// is in progress.
    pub fn record_tick_end(&mut self) -> Duration {
        let Some(start) = self.tick_start.take() else {
            return Duration::ZERO;
        };
        let elapsed = start.elapsed();

        let utilization = elapsed.as_secs_f64() / self.config.interval.as_secs_f64();
        if utilization >= 1.0 {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "tick exceeded its interval"
            );
        } else if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick approaching budget limit"
            );
        }

        self.stats.last_tick_time = elapsed;
        if elapsed > self.stats.max_tick_time {
            self.stats.max_tick_time = elapsed;
        }
        elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}
