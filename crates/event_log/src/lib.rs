//! # Event Log
//!
//! Append-only JSONL event output for a run.
//!
//! Responsibilities:
//! - Write every event to a per-run file and to `events_latest.jsonl` in lockstep
//! - Mirror events into the tracing log on request
//! - Prune old per-run files
//!
//! Every record is serialized once, written whole to each target, and never
//! buffered beyond that one record.

pub mod record;
pub mod retention;
pub mod sinks;

pub use contracts::{Event, EventKind, EventSink, RunInfo};
pub use record::{EventLine, HeaderLine};
pub use retention::{parse_run_file_name, prune_event_logs};
pub use sinks::{run_file_name, FanoutSink, JsonlEventSink, LogEventSink, LATEST_FILE_NAME};
