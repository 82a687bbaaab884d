//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{InputType, NodeConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    node_id: String,
    mode: String,
    fingerprints: FingerprintInfo,
    calibration_version: String,
    input: InputInfo,
    output: OutputInfo,
}

#[derive(Serialize)]
struct FingerprintInfo {
    config_hash: String,
    calibration_hash: String,
}

#[derive(Serialize)]
struct InputInfo {
    #[serde(rename = "type")]
    input_type: String,
    tick_hz: f64,
    heartbeat_every_s: i32,
    max_ticks: i64,
    max_run_s: f64,
    frame_stats_every: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    synth: Option<SynthInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_dir: Option<FrameDirInfo>,
}

#[derive(Serialize)]
struct SynthInfo {
    seed: u32,
    num_points: i32,
    enable_obstacle: bool,
    obstacle_start_s: f64,
    moving_obstacle: bool,
}

#[derive(Serialize)]
struct FrameDirInfo {
    path: String,
    #[serde(rename = "loop")]
    loop_playback: bool,
    fps: f64,
    point_layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_files: Option<usize>,
}

#[derive(Serialize)]
struct OutputInfo {
    out_dir: String,
    keep_last_runs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_log: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let node = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&node);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(node: &NodeConfig) -> ConfigInfo {
    let input = &node.input;

    let synth = (input.input_type == InputType::Synth).then(|| SynthInfo {
        seed: input.synth.seed,
        num_points: input.synth.num_points,
        enable_obstacle: input.synth.enable_obstacle,
        obstacle_start_s: input.synth.obstacle_start_s,
        moving_obstacle: input.synth.moving_obstacle,
    });

    let frame_dir = (input.input_type == InputType::FrameDir).then(|| FrameDirInfo {
        path: input.frame_dir.path.clone(),
        loop_playback: input.frame_dir.loop_playback,
        fps: input.frame_dir.fps,
        point_layout: input.frame_dir.point_layout.as_str().to_string(),
        frame_files: frame_source::count_frame_files(std::path::Path::new(&input.frame_dir.path))
            .ok(),
    });

    let latest = std::path::Path::new(&node.output.out_dir).join(event_log::LATEST_FILE_NAME);

    ConfigInfo {
        node_id: node.node_id.clone(),
        mode: node.mode.as_str().to_string(),
        fingerprints: FingerprintInfo {
            config_hash: fingerprint::compute_config_hash(node),
            calibration_hash: fingerprint::compute_calibration_hash(&node.calibration),
        },
        calibration_version: node.calibration.calibration_version.clone(),
        input: InputInfo {
            input_type: input.input_type.as_str().to_string(),
            tick_hz: input.tick_hz,
            heartbeat_every_s: input.heartbeat_every_s,
            max_ticks: input.max_ticks,
            max_run_s: input.max_run_s,
            frame_stats_every: input.frame_stats_every,
            synth,
            frame_dir,
        },
        output: OutputInfo {
            out_dir: node.output.out_dir.clone(),
            keep_last_runs: node.output.keep_last_runs,
            latest_log: latest.is_file().then(|| latest.display().to_string()),
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Node Information ===\n");

    println!("Node: {} ({})", info.node_id, info.mode);
    println!("Calibration version: {}", info.calibration_version);

    println!("\nFingerprints:");
    println!("  Config:      {}", info.fingerprints.config_hash);
    println!("  Calibration: {}", info.fingerprints.calibration_hash);

    let input = &info.input;
    println!("\nInput ({}):", input.input_type);
    println!("  Tick rate: {} Hz", input.tick_hz);
    println!("  Heartbeat every: {} s", input.heartbeat_every_s);
    println!("  Frame stats every: {} ticks", input.frame_stats_every);
    println!(
        "  Limits: max_ticks={} max_run_s={}",
        input.max_ticks, input.max_run_s
    );

    if let Some(ref synth) = input.synth {
        println!(
            "  Synth: seed={} points={} obstacle={} (start {} s, moving={})",
            synth.seed,
            synth.num_points,
            synth.enable_obstacle,
            synth.obstacle_start_s,
            synth.moving_obstacle
        );
    }
    if let Some(ref dir) = input.frame_dir {
        println!(
            "  Frame dir: {} (layout={}, loop={}, fps={})",
            dir.path, dir.point_layout, dir.loop_playback, dir.fps
        );
        match dir.frame_files {
            Some(n) => println!("  Frame files: {}", n),
            None => println!("  Frame files: directory not readable"),
        }
    }

    println!("\nOutput:");
    println!("  Directory: {}", info.output.out_dir);
    println!("  Keep last runs: {}", info.output.keep_last_runs);
    if let Some(ref latest) = info.output.latest_log {
        println!("  Latest log: {}", latest);
    }

    println!();
}
