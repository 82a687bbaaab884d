//! Configuration and calibration digests
//!
//! Field order is fixed. Appending a new field changes every existing
//! fingerprint, so new fields only ever go at the end of their section.

use contracts::{CalibrationConfig, NodeConfig, RoiConfig, RunMode, TransformSE3, Vec3};

use crate::fnv::{to_hex, Fnv1a64};

/// Fingerprint of the calibration payload
pub fn compute_calibration_hash(calibration: &CalibrationConfig) -> String {
    let mut h = Fnv1a64::new();
    write_calibration(&mut h, calibration);
    to_hex(h.finish())
}

/// Fingerprint of the complete configuration
pub fn compute_config_hash(cfg: &NodeConfig) -> String {
    let mut h = Fnv1a64::new();

    write_mode(&mut h, cfg.mode);
    h.write_str(&cfg.node_id);

    h.write_str(&cfg.frames.lidar_frame);
    h.write_str(&cfg.frames.node_frame);
    h.write_str(&cfg.frames.site_frame);

    write_calibration(&mut h, &cfg.calibration);

    h.write_i64(cfg.baseline.capture_duration_ns);
    h.write_i64(cfg.baseline.warmup_duration_ns);

    let mapping = &cfg.mapping;
    h.write_f32(mapping.voxel_size_m);
    h.write_i32(mapping.block_size_vox);
    write_roi(&mut h, &mapping.roi);
    h.write_f32(mapping.min_range_m);
    h.write_f32(mapping.max_range_m);
    h.write_bool(mapping.use_intensity);
    h.write_i32(mapping.integrate_hz);

    h.write_i64(cfg.budgets.max_points_per_sec);
    h.write_i32(cfg.budgets.target_fps);
    h.write_f32(cfg.budgets.downsample_voxel_m);

    let change = &cfg.change;
    h.write_i64(change.persistence_ns);
    h.write_f32(change.min_cluster_volume_m3);
    h.write_f32(change.min_aabb_edge_m);
    h.write_f32(change.min_confidence);
    h.write_bool(change.prefer_site_frame);

    let replay = &cfg.replay;
    h.write_str(&replay.dataset_path);
    h.write_f64(replay.time_scale);
    h.write_i64(replay.start_offset_ns);
    h.write_i64(replay.end_offset_ns);
    h.write_bool(replay.loop_playback);

    let input = &cfg.input;
    h.write_str(input.input_type.as_str());
    h.write_f64(input.tick_hz);
    h.write_i32(input.heartbeat_every_s);
    h.write_i64(input.max_ticks);
    h.write_f64(input.max_run_s);
    h.write_u32(input.frame_stats_every);

    let synth = &input.synth;
    h.write_u32(synth.seed);
    h.write_i32(synth.num_points);
    h.write_bool(synth.enable_obstacle);
    h.write_f64(synth.obstacle_start_s);
    h.write_bool(synth.moving_obstacle);
    h.write_f32(synth.obstacle_speed_mps);

    let frame_dir = &input.frame_dir;
    h.write_str(&frame_dir.path);
    h.write_bool(frame_dir.loop_playback);
    h.write_f64(frame_dir.fps);
    h.write_str(frame_dir.point_layout.as_str());
    h.write_str(frame_dir.timestamps_file.as_deref().unwrap_or(""));

    h.write_str(&cfg.output.out_dir);
    h.write_i32(cfg.output.heartbeat_period_s);
    h.write_u64(cfg.output.keep_last_runs as u64);

    to_hex(h.finish())
}

fn write_calibration(h: &mut Fnv1a64, calibration: &CalibrationConfig) {
    h.write_str(&calibration.calibration_path);
    h.write_str(&calibration.calibration_version);
    write_transform(h, &calibration.t_node_lidar);
    write_transform(h, &calibration.t_site_node);
}

fn write_mode(h: &mut Fnv1a64, mode: RunMode) {
    let code: i32 = match mode {
        RunMode::Replay => 1,
        RunMode::Live => 2,
    };
    h.write_i32(code);
}

fn write_vec3(h: &mut Fnv1a64, v: &Vec3) {
    h.write_f32(v.x);
    h.write_f32(v.y);
    h.write_f32(v.z);
}

// Invalid boxes are hashed as-is; bad configs still fingerprint.
fn write_roi(h: &mut Fnv1a64, roi: &RoiConfig) {
    write_vec3(h, &roi.min);
    write_vec3(h, &roi.max);
}

fn write_transform(h: &mut Fnv1a64, t: &TransformSE3) {
    for v in t.elements() {
        h.write_f32(v);
    }
}
