//! # Contracts
//!
//! Shared interface contracts for the monitoring node: configuration model,
//! frames, events, and the source/sink traits. Business crates depend on this
//! crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - All timestamps are integer nanoseconds (`i64`)
//! - `t_ns` is logical run time (run starts at 0), `t_wall_ns` is epoch time

mod config;
mod error;
mod event;
mod frame;
mod frame_source;
mod sink;
mod time;

pub use config::*;
pub use error::*;
pub use event::*;
pub use frame::*;
pub use frame_source::FrameSource;
pub use sink::EventSink;
pub use time::*;
