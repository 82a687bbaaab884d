//! Sink implementations
//!
//! Contains JsonlEventSink, LogEventSink, and FanoutSink.

mod fanout;
mod jsonl;
mod log;

pub use self::fanout::FanoutSink;
pub use self::jsonl::{run_file_name, JsonlEventSink, LATEST_FILE_NAME};
pub use self::log::LogEventSink;
