//! Run orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{spawn_shutdown_listener, Pipeline, PipelineConfig};
pub use stats::{print_summary, run_log_path};
