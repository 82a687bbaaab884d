//! Configuration validation
//!
//! Rules:
//! - identity and output directory non-empty
//! - mapping geometry positive, ROI min <= max
//! - budgets positive, durations non-negative
//! - run loop: tick_hz > 0 with a period of at least 1 ns, limits >= 0,
//!   frame_stats_every > 0
//! - source specific requirements (synth scene size, frame_dir path)

use contracts::{hz_to_period_ns, InputType, NodeConfig, NodeError};

/// Validate a NodeConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(cfg: &NodeConfig) -> Result<(), NodeError> {
    validate_identity(cfg)?;
    validate_mapping(cfg)?;
    validate_budgets(cfg)?;
    validate_change(cfg)?;
    validate_output(cfg)?;
    validate_input(cfg)?;
    Ok(())
}

fn validate_identity(cfg: &NodeConfig) -> Result<(), NodeError> {
    if cfg.node_id.is_empty() {
        return Err(NodeError::config_validation("node_id", "node_id cannot be empty"));
    }
    Ok(())
}

fn validate_mapping(cfg: &NodeConfig) -> Result<(), NodeError> {
    let mapping = &cfg.mapping;
    if mapping.voxel_size_m <= 0.0 {
        return Err(NodeError::config_validation(
            "mapping.voxel_size_m",
            format!("voxel_size_m must be > 0, got {}", mapping.voxel_size_m),
        ));
    }
    if mapping.block_size_vox <= 0 {
        return Err(NodeError::config_validation(
            "mapping.block_size_vox",
            format!("block_size_vox must be > 0, got {}", mapping.block_size_vox),
        ));
    }
    if !mapping.roi.is_valid() {
        return Err(NodeError::config_validation(
            "mapping.roi",
            "roi min must be <= max on every axis",
        ));
    }
    Ok(())
}

fn validate_budgets(cfg: &NodeConfig) -> Result<(), NodeError> {
    if cfg.budgets.max_points_per_sec <= 0 {
        return Err(NodeError::config_validation(
            "budgets.max_points_per_sec",
            "max_points_per_sec must be > 0",
        ));
    }
    if cfg.budgets.target_fps <= 0 {
        return Err(NodeError::config_validation(
            "budgets.target_fps",
            "target_fps must be > 0",
        ));
    }
    Ok(())
}

fn validate_change(cfg: &NodeConfig) -> Result<(), NodeError> {
    if cfg.change.persistence_ns < 0 {
        return Err(NodeError::config_validation(
            "change.persistence_s",
            "persistence_s must be >= 0",
        ));
    }
    Ok(())
}

fn validate_output(cfg: &NodeConfig) -> Result<(), NodeError> {
    if cfg.output.out_dir.is_empty() {
        return Err(NodeError::config_validation(
            "output.out_dir",
            "out_dir cannot be empty",
        ));
    }
    Ok(())
}

fn validate_input(cfg: &NodeConfig) -> Result<(), NodeError> {
    let input = &cfg.input;

    if input.tick_hz <= 0.0 || !input.tick_hz.is_finite() {
        return Err(NodeError::config_validation(
            "input.tick_hz",
            format!("tick_hz must be > 0, got {}", input.tick_hz),
        ));
    }
    if hz_to_period_ns(input.tick_hz) < 1 {
        return Err(NodeError::config_validation(
            "input.tick_hz",
            format!("tick_hz {} gives a period below 1 ns", input.tick_hz),
        ));
    }
    if input.heartbeat_every_s < 0 {
        return Err(NodeError::config_validation(
            "input.heartbeat_every_s",
            "heartbeat_every_s must be >= 0",
        ));
    }
    if input.max_ticks < 0 {
        return Err(NodeError::config_validation(
            "input.max_ticks",
            "max_ticks must be >= 0",
        ));
    }
    if input.max_run_s < 0.0 {
        return Err(NodeError::config_validation(
            "input.max_run_s",
            "max_run_s must be >= 0",
        ));
    }
    if input.frame_stats_every == 0 {
        return Err(NodeError::config_validation(
            "input.frame_stats_every",
            "frame_stats_every must be > 0",
        ));
    }

    match input.input_type {
        InputType::Synth => {
            if input.synth.num_points <= 0 {
                return Err(NodeError::config_validation(
                    "input.synth.num_points",
                    "num_points must be > 0",
                ));
            }
        }
        InputType::FrameDir => {
            if input.frame_dir.path.is_empty() {
                return Err(NodeError::config_validation(
                    "input.frame_dir.path",
                    "path is required for frame_dir input",
                ));
            }
            if input.frame_dir.fps < 0.0 {
                return Err(NodeError::config_validation(
                    "input.frame_dir.fps",
                    "fps must be >= 0",
                ));
            }
            if input.frame_dir.fps > 0.0 && hz_to_period_ns(input.frame_dir.fps) < 1 {
                return Err(NodeError::config_validation(
                    "input.frame_dir.fps",
                    format!("fps {} gives a period below 1 ns", input.frame_dir.fps),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vec3;

    fn expect_err(cfg: &NodeConfig, needle: &str) {
        let err = validate(cfg).unwrap_err().to_string();
        assert!(err.contains(needle), "got: {err}");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&NodeConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_node_id() {
        let mut cfg = NodeConfig::default();
        cfg.node_id.clear();
        expect_err(&cfg, "node_id cannot be empty");
    }

    #[test]
    fn test_invalid_voxel_size() {
        let mut cfg = NodeConfig::default();
        cfg.mapping.voxel_size_m = 0.0;
        expect_err(&cfg, "voxel_size_m must be > 0");
    }

    #[test]
    fn test_inverted_roi() {
        let mut cfg = NodeConfig::default();
        cfg.mapping.roi.min = Vec3::new(1.0, 0.0, 0.0);
        cfg.mapping.roi.max = Vec3::new(0.0, 1.0, 1.0);
        expect_err(&cfg, "roi min");
    }

    #[test]
    fn test_zero_tick_hz() {
        let mut cfg = NodeConfig::default();
        cfg.input.tick_hz = 0.0;
        expect_err(&cfg, "tick_hz must be > 0");
    }

    #[test]
    fn test_rate_with_zero_period_rejected() {
        let mut cfg = NodeConfig::default();
        cfg.input.tick_hz = 3e9;
        expect_err(&cfg, "period below 1 ns");

        // 2e9 Hz still rounds to a 1 ns period
        cfg.input.tick_hz = 2e9;
        assert!(validate(&cfg).is_ok());

        cfg.input.tick_hz = 10.0;
        cfg.input.input_type = InputType::FrameDir;
        cfg.input.frame_dir.path = "frames".to_string();
        cfg.input.frame_dir.fps = 5e9;
        expect_err(&cfg, "fps 5000000000 gives a period below 1 ns");
    }

    #[test]
    fn test_empty_out_dir() {
        let mut cfg = NodeConfig::default();
        cfg.output.out_dir.clear();
        expect_err(&cfg, "out_dir cannot be empty");
    }

    #[test]
    fn test_negative_limits() {
        let mut cfg = NodeConfig::default();
        cfg.input.max_ticks = -1;
        expect_err(&cfg, "max_ticks must be >= 0");

        let mut cfg = NodeConfig::default();
        cfg.input.max_run_s = -0.5;
        expect_err(&cfg, "max_run_s must be >= 0");
    }

    #[test]
    fn test_frame_dir_requires_path() {
        let mut cfg = NodeConfig::default();
        cfg.input.input_type = InputType::FrameDir;
        expect_err(&cfg, "path is required");

        cfg.input.frame_dir.path = "/data".into();
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_synth_num_points_ignored_for_frame_dir() {
        let mut cfg = NodeConfig::default();
        cfg.input.input_type = InputType::FrameDir;
        cfg.input.frame_dir.path = "/data".into();
        cfg.input.synth.num_points = 0;
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_frame_stats_every_zero() {
        let mut cfg = NodeConfig::default();
        cfg.input.frame_stats_every = 0;
        expect_err(&cfg, "frame_stats_every must be > 0");
    }
}
