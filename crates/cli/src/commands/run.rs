//! `run` command implementation.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::NodeConfig;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{print_summary, spawn_shutdown_listener, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_node(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut node = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut node, args);
    ConfigLoader::validate(&node).map_err(CliError::InvalidConfig)?;

    info!(
        node_id = %node.node_id,
        input = node.input.input_type.as_str(),
        tick_hz = node.input.tick_hz,
        max_ticks = node.input.max_ticks,
        max_run_s = node.input.max_run_s,
        out_dir = %node.output.out_dir,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&node);
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    spawn_shutdown_listener(shutdown.clone());

    let pipeline = Pipeline::new(PipelineConfig {
        node,
        config_path: args.config.clone(),
        mirror_events: args.mirror_events,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    info!("Starting run...");
    let summary = pipeline.run(shutdown).await.context("Run failed")?;

    info!(
        reason = %summary.stop_reason,
        ticks = summary.counters.ticks,
        frames = summary.counters.frames,
        duration_secs = summary.duration.as_secs_f64(),
        fps = format!("{:.2}", summary.fps()),
        "Run completed"
    );
    print_summary(&summary);

    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(node: &mut NodeConfig, args: &RunArgs) {
    if let Some(ref out_dir) = args.out_dir {
        info!(out_dir = %out_dir.display(), "Overriding output.out_dir from CLI");
        node.output.out_dir = out_dir.display().to_string();
    }
    if let Some(max_ticks) = args.max_ticks {
        info!(max_ticks, "Overriding input.max_ticks from CLI");
        node.input.max_ticks = max_ticks;
    }
    if let Some(max_run_s) = args.max_run_s {
        info!(max_run_s, "Overriding input.max_run_s from CLI");
        node.input.max_run_s = max_run_s;
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(node: &NodeConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Node: {} ({})", node.node_id, node.mode.as_str());
    println!("\nInput:");
    println!("  Type: {}", node.input.input_type.as_str());
    println!("  Tick rate: {} Hz", node.input.tick_hz);
    println!("  Heartbeat every: {} s", node.input.heartbeat_every_s);
    println!(
        "  Limits: max_ticks={} max_run_s={}",
        node.input.max_ticks, node.input.max_run_s
    );
    println!("\nOutput:");
    println!("  Directory: {}", node.output.out_dir);
    println!("  Keep last runs: {}", node.output.keep_last_runs);
    println!("\nFingerprints:");
    println!("  Config: {}", fingerprint::compute_config_hash(node));
    println!(
        "  Calibration: {}",
        fingerprint::compute_calibration_hash(&node.calibration)
    );
    println!();
}
