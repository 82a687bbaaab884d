//! Run statistics

use std::time::Duration;

use contracts::RunInfo;
use observability::{RunningStats, StatsSummary};

use crate::state::StopReason;

/// Live counters of a run
#[derive(Debug, Clone, Default)]
pub struct RunCounters {
    /// Completed loop iterations
    pub ticks: u64,
    /// Frames pulled from the source
    pub frames: u64,
    /// Points across all frames
    pub points: u64,
    pub heartbeats: u64,
    /// `frame_stats` events written
    pub frame_events: u64,
    /// Replay rewinds observed
    pub resets: u64,
    /// Ticks that missed their deadline
    pub overruns: u64,
    /// Points per frame
    pub frame_points: RunningStats,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub run: RunInfo,
    pub counters: RunCounters,
    /// Monotonic time from start to stop
    pub duration: Duration,
}

impl RunSummary {
    /// Frames per second over the whole run
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.counters.frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn frame_points(&self) -> StatsSummary {
        StatsSummary::from(&self.counters.frame_points)
    }
}
