//! Run loop metrics
//!
//! Thin wrappers over the `metrics` facade so metric names live in one place.
//! Without an installed recorder every call is a no-op.

use contracts::EventKind;
use metrics::{counter, gauge, histogram};

/// One scheduler iteration completed
pub fn record_tick() {
    counter!("wm_node_ticks_total").increment(1);
}

/// Frame pulled from a source
pub fn record_frame(source: &str, num_points: usize) {
    counter!("wm_node_frames_total", "source" => source.to_string()).increment(1);
    histogram!("wm_node_frame_points").record(num_points as f64);
    gauge!("wm_node_last_frame_points").set(num_points as f64);
}

/// Event written to the event log
pub fn record_event(kind: EventKind) {
    counter!("wm_node_events_total", "type" => kind.as_str()).increment(1);
}

/// Tick deadline missed
pub fn record_tick_overrun() {
    counter!("wm_node_tick_overruns_total").increment(1);
}

/// Delay between a tick deadline and the start of its work
pub fn record_tick_lag_ms(lag_ms: f64) {
    histogram!("wm_node_tick_lag_ms").record(lag_ms);
}

/// Replay rewound to its first frame
pub fn record_replay_reset() {
    counter!("wm_node_replay_resets_total").increment(1);
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Number of samples
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
