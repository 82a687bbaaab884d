//! # Integration Tests
//!
//! End-to-end runs of the node front end.
//!
//! Covers:
//! - Config text -> frame source -> scheduler -> JSONL files on disk
//! - Directory replay with sidecar timestamps, EOF and looping
//! - Fingerprint stability across config formats
//! - Log retention and latest-file truncation across runs

#[cfg(test)]
mod support {
    use std::path::Path;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::NodeConfig;
    use event_log::{run_file_name, JsonlEventSink, LATEST_FILE_NAME};
    use scheduler::{ManualClock, RunSummary, Scheduler};
    use serde_json::Value;

    pub const WALL_BASE_NS: i64 = 1_700_000_000_000_000_000;

    /// Load a TOML config and point its output at `out_dir`
    pub fn load_toml(text: &str, out_dir: &Path) -> NodeConfig {
        let mut cfg = ConfigLoader::load_from_str(text, ConfigFormat::Toml).unwrap();
        cfg.output.out_dir = out_dir.display().to_string();
        cfg
    }

    /// Run to completion on a manual clock with a JSONL sink
    pub fn run_jsonl(cfg: NodeConfig, wall_base_ns: i64) -> contracts::Result<RunSummary> {
        let source = frame_source::build_source(&cfg)?;
        let mut scheduler = Scheduler::with_clock(
            cfg,
            "node.toml",
            source,
            Box::new(JsonlEventSink::new()),
            ManualClock::new(wall_base_ns),
        );
        scheduler.run()
    }

    pub fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    pub fn latest(out_dir: &Path) -> Vec<Value> {
        read_lines(&out_dir.join(LATEST_FILE_NAME))
    }

    pub fn run_file(out_dir: &Path, wall_base_ns: i64) -> Vec<Value> {
        read_lines(&out_dir.join(run_file_name(wall_base_ns)))
    }

    pub fn of_type<'a>(lines: &'a [Value], kind: &str) -> Vec<&'a Value> {
        lines.iter().filter(|l| l["type"] == kind).collect()
    }

    /// Write `.bin` frame with xyz records
    pub fn write_xyz_frame(dir: &Path, name: &str, points: &[[f32; 3]]) {
        let mut bytes = Vec::with_capacity(points.len() * 12);
        for p in points {
            for v in p {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
        std::fs::write(dir.join(name), bytes).unwrap();
    }
}

#[cfg(test)]
mod synth_e2e {
    use super::support::*;

    const SYNTH_TOML: &str = r#"
node_id = "node_e2e"

[input]
type = "synth"
tick_hz = 10.0
max_ticks = 5

[input.synth]
seed = 7
num_points = 200
"#;

    #[test]
    fn test_max_ticks_run_writes_complete_log() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_toml(SYNTH_TOML, dir.path());
        let expected_hash = fingerprint::compute_config_hash(&cfg);

        let summary = run_jsonl(cfg, WALL_BASE_NS).unwrap();
        assert_eq!(summary.counters.ticks, 5);
        assert_eq!(summary.counters.frames, 5);
        assert_eq!(summary.counters.points, 1000);

        let lines = latest(dir.path());
        assert_eq!(lines[0]["type"], "run_started");
        assert_eq!(lines[0]["node_id"], "node_e2e");
        assert_eq!(lines[0]["config_hash"], expected_hash.as_str());
        assert_eq!(lines[0]["t_ns"], 0);
        assert_eq!(lines[0]["t_wall_ns"], WALL_BASE_NS);

        assert_eq!(of_type(&lines, "frame_stats").len(), 5);
        assert_eq!(of_type(&lines, "shutdown").len(), 1);
        let last = lines.last().unwrap();
        assert_eq!(last["type"], "shutdown");
        assert_eq!(last["message"], "max_ticks reached");

        for line in &lines {
            for key in ["type", "t_ns", "t_s", "t_wall_ns", "t_wall_s"] {
                assert!(line.get(key).is_some(), "missing {key} in {line}");
            }
        }

        assert_eq!(run_file(dir.path(), WALL_BASE_NS), lines);
    }

    #[test]
    fn test_obstacle_appears_at_tick_80() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = load_toml(SYNTH_TOML, dir.path());
        cfg.input.max_ticks = 81;
        cfg.input.synth.num_points = 1600;

        run_jsonl(cfg, WALL_BASE_NS).unwrap();

        let lines = latest(dir.path());
        let stats = of_type(&lines, "frame_stats");
        assert_eq!(stats.len(), 81);
        assert_eq!(stats[79]["message"], "frame_id=synth_79 num_points=1600");
        assert_eq!(stats[80]["message"], "frame_id=synth_80 num_points=2200");
        assert_eq!(stats[80]["t_ns"], 8_000_000_000i64);
    }

    #[test]
    fn test_same_seed_same_log_content() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        run_jsonl(load_toml(SYNTH_TOML, a.path()), WALL_BASE_NS).unwrap();
        run_jsonl(load_toml(SYNTH_TOML, b.path()), WALL_BASE_NS).unwrap();

        let messages = |dir: &std::path::Path| -> Vec<String> {
            latest(dir)
                .iter()
                .skip(1)
                .map(|l| l["message"].as_str().unwrap_or_default().to_string())
                .collect()
        };
        assert_eq!(messages(a.path()), messages(b.path()));
    }

    #[test]
    fn test_heartbeat_period_in_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = load_toml(SYNTH_TOML, dir.path());
        cfg.input.max_ticks = 0;
        cfg.input.max_run_s = 12.0;
        cfg.input.heartbeat_every_s = 5;

        let summary = run_jsonl(cfg, WALL_BASE_NS).unwrap();
        assert_eq!(summary.stop_reason, scheduler::StopReason::MaxRuntime);
        assert_eq!(summary.counters.ticks, 120);

        let lines = latest(dir.path());
        let beats: Vec<i64> = of_type(&lines, "heartbeat")
            .iter()
            .map(|l| l["t_ns"].as_i64().unwrap())
            .collect();
        assert_eq!(beats, vec![0, 5_000_000_000, 10_000_000_000]);
        assert_eq!(lines.last().unwrap()["message"], "max_runtime reached");
    }
}

#[cfg(test)]
mod replay_e2e {
    use super::support::*;
    use contracts::ErrorKind;

    fn replay_toml(path: &std::path::Path, looping: bool) -> String {
        format!(
            r#"
node_id = "node_replay"

[input]
type = "frame_dir"
tick_hz = 10.0

[input.frame_dir]
path = "{}"
loop = {looping}
point_layout = "xyz"
"#,
            path.display()
        )
    }

    fn dataset() -> tempfile::TempDir {
        let data = tempfile::tempdir().unwrap();
        write_xyz_frame(data.path(), "002.bin", &[[1.0, 2.0, 3.0]]);
        write_xyz_frame(data.path(), "000.bin", &[[0.0; 3], [1.0; 3]]);
        write_xyz_frame(data.path(), "001.bin", &[[5.0; 3], [6.0; 3], [7.0; 3]]);
        data
    }

    #[test]
    fn test_replay_to_eof_with_sidecar() {
        let data = dataset();
        std::fs::write(data.path().join("timestamps.txt"), "1000\n2000\n3500\n").unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = load_toml(&replay_toml(data.path(), false), out.path());

        let summary = run_jsonl(cfg, WALL_BASE_NS).unwrap();
        assert_eq!(summary.stop_reason, scheduler::StopReason::InputEof);
        assert_eq!(summary.counters.frames, 3);

        let lines = latest(out.path());
        let stats = of_type(&lines, "frame_stats");
        let messages: Vec<&str> = stats.iter().map(|l| l["message"].as_str().unwrap()).collect();
        assert_eq!(
            messages,
            vec![
                "frame_id=000.bin num_points=2",
                "frame_id=001.bin num_points=3",
                "frame_id=002.bin num_points=1",
            ]
        );
        let times: Vec<i64> = stats.iter().map(|l| l["t_ns"].as_i64().unwrap()).collect();
        assert_eq!(times, vec![1000, 2000, 3500]);

        let last = lines.last().unwrap();
        assert_eq!(last["type"], "input_eof");
        assert!(of_type(&lines, "shutdown").is_empty());
    }

    #[test]
    fn test_replay_without_sidecar_uses_tick_period() {
        let data = dataset();
        let out = tempfile::tempdir().unwrap();
        let cfg = load_toml(&replay_toml(data.path(), false), out.path());
        run_jsonl(cfg, WALL_BASE_NS).unwrap();

        let lines = latest(out.path());
        let times: Vec<i64> = of_type(&lines, "frame_stats")
            .iter()
            .map(|l| l["t_ns"].as_i64().unwrap())
            .collect();
        assert_eq!(times, vec![0, 100_000_000, 200_000_000]);
    }

    #[test]
    fn test_looping_replay_emits_resets() {
        let data = tempfile::tempdir().unwrap();
        write_xyz_frame(data.path(), "a.bin", &[[0.0; 3]]);
        write_xyz_frame(data.path(), "b.bin", &[[0.0; 3]]);
        let out = tempfile::tempdir().unwrap();
        let mut cfg = load_toml(&replay_toml(data.path(), true), out.path());
        cfg.input.max_ticks = 5;

        let summary = run_jsonl(cfg, WALL_BASE_NS).unwrap();
        assert_eq!(summary.stop_reason, scheduler::StopReason::MaxTicks);
        assert_eq!(summary.counters.frames, 5);
        assert_eq!(summary.counters.resets, 2);

        let lines = latest(out.path());
        assert_eq!(of_type(&lines, "replay_reset").len(), 2);
        let ids: Vec<&str> = of_type(&lines, "frame_stats")
            .iter()
            .map(|l| l["message"].as_str().unwrap())
            .collect();
        assert!(ids[2].starts_with("frame_id=a.bin"));
        assert!(ids[4].starts_with("frame_id=a.bin"));
    }

    #[test]
    fn test_corrupt_frame_fails_run_and_keeps_log() {
        let data = tempfile::tempdir().unwrap();
        write_xyz_frame(data.path(), "000.bin", &[[0.0; 3]]);
        std::fs::write(data.path().join("001.bin"), [0u8; 13]).unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = load_toml(&replay_toml(data.path(), false), out.path());

        let err = run_jsonl(cfg, WALL_BASE_NS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);

        let lines = latest(out.path());
        assert_eq!(lines[0]["type"], "run_started");
        assert_eq!(of_type(&lines, "frame_stats").len(), 1);
        assert!(of_type(&lines, "shutdown").is_empty());
    }

    #[test]
    fn test_missing_dataset_fails_before_any_tick() {
        let out = tempfile::tempdir().unwrap();
        let cfg = load_toml(&replay_toml(&out.path().join("absent"), false), out.path());
        let err = run_jsonl(cfg, WALL_BASE_NS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let lines = latest(out.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "run_started");
    }
}

#[cfg(test)]
mod log_e2e {
    use super::support::*;
    use event_log::prune_event_logs;

    const TOML: &str = r#"
[input]
max_ticks = 2
[input.synth]
num_points = 10
"#;

    #[test]
    fn test_latest_holds_only_newest_run() {
        let dir = tempfile::tempdir().unwrap();
        run_jsonl(load_toml(TOML, dir.path()), WALL_BASE_NS).unwrap();
        run_jsonl(load_toml(TOML, dir.path()), WALL_BASE_NS + 1).unwrap();

        assert_eq!(run_file(dir.path(), WALL_BASE_NS)[0]["t_wall_ns"], WALL_BASE_NS);
        let lines = latest(dir.path());
        assert_eq!(of_type(&lines, "run_started").len(), 1);
        assert_eq!(lines[0]["t_wall_ns"], WALL_BASE_NS + 1);
    }

    #[test]
    fn test_retention_before_run() {
        let dir = tempfile::tempdir().unwrap();
        for stamp in 1..=4 {
            run_jsonl(load_toml(TOML, dir.path()), stamp).unwrap();
        }
        assert_eq!(prune_event_logs(dir.path(), 2), 2);
        run_jsonl(load_toml(TOML, dir.path()), 5).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "events_3.jsonl",
                "events_4.jsonl",
                "events_5.jsonl",
                "events_latest.jsonl"
            ]
        );
    }
}

#[cfg(test)]
mod config_e2e {
    use config_loader::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_fingerprint_independent_of_format() {
        let toml_cfg = ConfigLoader::load_from_str(
            r#"
node_id = "node_fmt"
[input]
tick_hz = 20.0
[input.synth]
seed = 3
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        let json_cfg = ConfigLoader::load_from_str(
            r#"{"node_id": "node_fmt", "input": {"tick_hz": 20.0, "synth": {"seed": 3}}}"#,
            ConfigFormat::Json,
        )
        .unwrap();

        assert_eq!(toml_cfg, json_cfg);
        assert_eq!(
            fingerprint::compute_config_hash(&toml_cfg),
            fingerprint::compute_config_hash(&json_cfg)
        );
    }

    #[test]
    fn test_serialized_config_reloads_to_same_hash() {
        let cfg = ConfigLoader::load_from_str("node_id = \"node_rt\"\n", ConfigFormat::Toml).unwrap();
        let text = ConfigLoader::to_toml(&cfg).unwrap();
        let reloaded = ConfigLoader::load_from_str(&text, ConfigFormat::Toml).unwrap();
        assert_eq!(
            fingerprint::compute_config_hash(&cfg),
            fingerprint::compute_config_hash(&reloaded)
        );
    }
}

#[cfg(test)]
mod signal_e2e {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use event_log::JsonlEventSink;
    use scheduler::{Scheduler, StopReason};

    use super::support::*;

    /// Real clock, blocking worker, flag set from the async side
    #[tokio::test]
    async fn test_shutdown_flag_stops_blocking_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = load_toml("[input.synth]\nnum_points = 10\n", dir.path());
        cfg.input.tick_hz = 200.0;
        let source = frame_source::build_source(&cfg).unwrap();

        let flag = Arc::new(AtomicBool::new(false));
        let worker_flag = flag.clone();
        let worker = tokio::task::spawn_blocking(move || {
            Scheduler::new(cfg, "node.toml", source, Box::new(JsonlEventSink::new()))
                .with_shutdown_flag(worker_flag)
                .run()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        flag.store(true, Ordering::SeqCst);

        let summary = tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("scheduler did not stop")
            .unwrap()
            .unwrap();
        assert_eq!(summary.stop_reason, StopReason::Signal);

        let lines = latest(dir.path());
        let last = lines.last().unwrap();
        assert_eq!(last["type"], "shutdown");
        assert_eq!(last["message"], "signal received");
    }
}
