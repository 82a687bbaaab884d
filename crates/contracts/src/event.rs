//! Event / RunInfo - Event Log input
//!
//! Time contract:
//! - `t_ns`      relative to run start (run starts at 0)
//! - `t_wall_ns` absolute epoch nanoseconds

use std::fmt;

use serde::{Deserialize, Serialize};

/// Event type
///
/// Serialized as the `type` field of every log line. New stages add variants;
/// existing names never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Run header (written by the sink at open)
    RunStarted,
    /// Periodic liveness record
    Heartbeat,
    /// Per-frame summary (frame id + point count)
    FrameStats,
    /// Replay rewound to its first frame
    ReplayReset,
    /// Input source exhausted
    InputEof,
    /// Run loop terminating
    Shutdown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStarted => "run_started",
            Self::Heartbeat => "heartbeat",
            Self::FrameStats => "frame_stats",
            Self::ReplayReset => "replay_reset",
            Self::InputEof => "input_eof",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured run event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type
    pub kind: EventKind,

    /// Logical time relative to run start (ns)
    pub t_ns: i64,

    /// Absolute wall-clock time (epoch ns)
    pub t_wall_ns: i64,

    /// Optional human-readable hint
    pub message: Option<String>,
}

impl Event {
    /// Create an event without message
    pub fn new(kind: EventKind, t_ns: i64, t_wall_ns: i64) -> Self {
        Self {
            kind,
            t_ns,
            t_wall_ns,
            message: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Run-scoped metadata, created once at start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Node identifier
    pub node_id: String,

    /// Path of the configuration file the run was started from
    pub config_path: String,

    /// Output directory for event logs
    pub out_dir: String,

    /// Fingerprint of the whole configuration
    pub config_hash: String,

    /// Fingerprint of the calibration payload
    pub calibration_hash: String,

    /// Logical start time (always 0)
    pub start_time_ns: i64,

    /// Absolute wall-clock start time (epoch ns)
    pub wall_start_time_ns: i64,
}
