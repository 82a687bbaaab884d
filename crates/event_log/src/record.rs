//! On-disk line formats
//!
//! Header: `{type:"run_started", t_ns, t_s, t_wall_ns, t_wall_s, node_id,
//! config_path, config_hash, calibration_hash}`.
//! Record: `{type, t_ns, t_s, t_wall_ns, t_wall_s, message?}`.

use contracts::{ns_to_seconds, Event, EventKind, NodeError, Result, RunInfo};
use serde::Serialize;

/// Run header line
#[derive(Debug, Serialize)]
pub struct HeaderLine<'a> {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub t_ns: i64,
    pub t_s: f64,
    pub t_wall_ns: i64,
    pub t_wall_s: f64,
    pub node_id: &'a str,
    pub config_path: &'a str,
    pub config_hash: &'a str,
    pub calibration_hash: &'a str,
}

impl<'a> HeaderLine<'a> {
    pub fn new(run: &'a RunInfo) -> Self {
        Self {
            kind: EventKind::RunStarted,
            t_ns: run.start_time_ns,
            t_s: ns_to_seconds(run.start_time_ns),
            t_wall_ns: run.wall_start_time_ns,
            t_wall_s: ns_to_seconds(run.wall_start_time_ns),
            node_id: &run.node_id,
            config_path: &run.config_path,
            config_hash: &run.config_hash,
            calibration_hash: &run.calibration_hash,
        }
    }
}

/// Event record line
#[derive(Debug, Serialize)]
pub struct EventLine<'a> {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub t_ns: i64,
    pub t_s: f64,
    pub t_wall_ns: i64,
    pub t_wall_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
}

impl<'a> EventLine<'a> {
    pub fn new(event: &'a Event) -> Self {
        Self {
            kind: event.kind,
            t_ns: event.t_ns,
            t_s: ns_to_seconds(event.t_ns),
            t_wall_ns: event.t_wall_ns,
            t_wall_s: ns_to_seconds(event.t_wall_ns),
            message: event.message.as_deref(),
        }
    }
}

/// Serialize one record as a newline-terminated JSON line
pub fn to_line<T: Serialize>(record: &T) -> Result<String> {
    let mut line = serde_json::to_string(record)
        .map_err(|e| NodeError::internal(format!("event serialization failed: {e}")))?;
    line.push('\n');
    Ok(line)
}
