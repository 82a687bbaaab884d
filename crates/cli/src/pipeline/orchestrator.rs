//! Run orchestrator - wires source, sink and scheduler together.
//!
//! The scheduler is a blocking loop; it runs on a `spawn_blocking` worker and
//! observes shutdown through a shared flag.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{EventSink, FrameSource, NodeConfig};
use event_log::{prune_event_logs, FanoutSink, JsonlEventSink, LogEventSink};
use scheduler::{RunSummary, Scheduler};
use tracing::{info, warn};

use crate::error::CliError;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated node configuration (CLI overrides applied)
    pub node: NodeConfig,

    /// Path the configuration was loaded from
    pub config_path: PathBuf,

    /// Mirror events into the tracing log
    pub mirror_events: bool,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// One run of the node
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run to completion or until `shutdown` is set
    pub async fn run(self, shutdown: Arc<AtomicBool>) -> Result<RunSummary> {
        let PipelineConfig {
            node,
            config_path,
            mirror_events,
            metrics_port,
        } = self.config;

        if let Some(port) = metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let pruned = prune_event_logs(Path::new(&node.output.out_dir), node.output.keep_last_runs);
        if pruned > 0 {
            info!(pruned, out_dir = %node.output.out_dir, "Old event logs removed");
        }

        let source = frame_source::build_source(&node).context("Failed to build frame source")?;
        let sink = build_sink(mirror_events);
        info!(
            source = source.name(),
            sink = sink.name(),
            input = node.input.input_type.as_str(),
            tick_hz = node.input.tick_hz,
            "Components ready"
        );

        let config_path = config_path.display().to_string();
        let worker = tokio::task::spawn_blocking(move || {
            let mut scheduler =
                Scheduler::new(node, config_path, source, sink).with_shutdown_flag(shutdown);
            scheduler.run()
        });

        let summary = worker
            .await
            .map_err(|e| CliError::worker(e.to_string()))?
            .map_err(CliError::run)?;
        Ok(summary)
    }
}

fn build_sink(mirror_events: bool) -> Box<dyn EventSink> {
    let jsonl = Box::new(JsonlEventSink::new());
    if mirror_events {
        Box::new(FanoutSink::new(vec![
            jsonl,
            Box::new(LogEventSink::new("log")),
        ]))
    } else {
        jsonl
    }
}

/// Set `flag` on Ctrl+C or SIGTERM
///
/// The scheduler notices the flag at its next iteration boundary and writes
/// a `shutdown` event before stopping.
pub fn spawn_shutdown_listener(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        warn!("Received shutdown signal, stopping at next tick");
        flag.store(true, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::InputType;

    fn synth_config(out_dir: &Path, max_ticks: i64) -> NodeConfig {
        let mut node = NodeConfig::default();
        node.output.out_dir = out_dir.display().to_string();
        node.input.input_type = InputType::Synth;
        node.input.tick_hz = 1000.0;
        node.input.max_ticks = max_ticks;
        node.input.synth.num_points = 32;
        node
    }

    #[tokio::test]
    async fn test_pipeline_runs_synth_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(PipelineConfig {
            node: synth_config(dir.path(), 3),
            config_path: PathBuf::from("node.toml"),
            mirror_events: true,
            metrics_port: None,
        });

        let summary = pipeline.run(Arc::new(AtomicBool::new(false))).await.unwrap();
        assert_eq!(summary.counters.ticks, 3);
        assert_eq!(summary.counters.points, 96);
        assert!(dir.path().join(event_log::LATEST_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_preset_shutdown_flag_stops_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(PipelineConfig {
            node: synth_config(dir.path(), 0),
            config_path: PathBuf::from("node.toml"),
            mirror_events: false,
            metrics_port: None,
        });

        let summary = pipeline.run(Arc::new(AtomicBool::new(true))).await.unwrap();
        assert_eq!(summary.stop_reason, scheduler::StopReason::Signal);
        assert_eq!(summary.counters.ticks, 0);
    }

    #[tokio::test]
    async fn test_missing_frame_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut node = synth_config(dir.path(), 1);
        node.input.input_type = InputType::FrameDir;
        node.input.frame_dir.path = dir.path().join("absent").display().to_string();

        let pipeline = Pipeline::new(PipelineConfig {
            node,
            config_path: PathBuf::from("node.toml"),
            mirror_events: false,
            metrics_port: None,
        });
        let err = pipeline.run(Arc::new(AtomicBool::new(false))).await.unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert!(matches!(
            cli_err,
            CliError::Run {
                kind: contracts::ErrorKind::NotFound,
                ..
            }
        ));
    }
}
