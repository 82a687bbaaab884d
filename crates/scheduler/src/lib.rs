//! # Scheduler
//!
//! Run lifecycle for the monitoring node.
//!
//! Responsibilities:
//! - Anchor run clocks and compute reproducibility fingerprints
//! - Drive the fixed-rate tick loop: limits, heartbeats, frame pulls
//! - Decide termination (limits, end of input, shutdown signal) and looping
//! - Guarantee the event log and frame source are closed on every exit path
//!
//! ## Example
//!
//! ```ignore
//! use scheduler::Scheduler;
//!
//! let source = frame_source::build_source(&config)?;
//! let sink = Box::new(event_log::JsonlEventSink::new());
//! let summary = Scheduler::new(config, "node.toml", source, sink).run()?;
//! println!("stopped: {}", summary.stop_reason);
//! ```

mod clock;
mod runner;
mod state;
mod summary;

pub use clock::{Clock, ManualClock, SystemClock};
pub use runner::Scheduler;
pub use state::{RunState, StopReason};
pub use summary::{RunCounters, RunSummary};
