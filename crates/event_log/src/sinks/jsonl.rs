//! JsonlEventSink - per-run and latest JSONL files

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::{Event, EventSink, NodeError, Result, RunInfo};
use tracing::{debug, error, info, instrument, warn};

use crate::record::{to_line, EventLine, HeaderLine};

/// Name of the file that always holds the most recent run
pub const LATEST_FILE_NAME: &str = "events_latest.jsonl";

/// Per-run file name for a wall-clock start time
pub fn run_file_name(wall_start_time_ns: i64) -> String {
    format!("events_{wall_start_time_ns}.jsonl")
}

struct Target {
    path: PathBuf,
    file: File,
}

impl Target {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.file.write_all(line.as_bytes()).map_err(|e| {
            NodeError::io_with(format!("event log write failed: {}", self.path.display()), e)
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(|e| {
            NodeError::io_with(format!("event log flush failed: {}", self.path.display()), e)
        })
    }
}

struct OpenRun {
    run: Target,
    latest: Target,
    records: u64,
}

/// Sink that appends JSON lines to `events_<wall_start_ns>.jsonl` and
/// `events_latest.jsonl`
///
/// The per-run file is opened for append, the latest file is truncated at
/// every open.
pub struct JsonlEventSink {
    name: String,
    current: Option<OpenRun>,
}

impl JsonlEventSink {
    /// Sink named `jsonl`
    pub fn new() -> Self {
        Self::with_name("jsonl")
    }

    /// Sink with a custom name, as reported in logs and `run_start`
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: None,
        }
    }

    /// Per-run file of the open run
    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.run.path.as_path())
    }

    /// Latest file of the open run
    pub fn latest_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.latest.path.as_path())
    }

    /// Whether `open` succeeded and `close` has not run since
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    fn write_both(&mut self, line: &str) -> Result<()> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| NodeError::internal("event log: emit called before open"))?;
        current.run.write_line(line)?;
        current.latest.write_line(line)?;
        current.records += 1;
        Ok(())
    }
}

impl Default for JsonlEventSink {
    fn default() -> Self {
        Self::new()
    }
}

fn open_target(path: PathBuf, truncate: bool) -> Result<Target> {
    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    let file = options
        .open(&path)
        .map_err(|e| NodeError::io_with(format!("failed to open {}", path.display()), e))?;
    Ok(Target { path, file })
}

impl EventSink for JsonlEventSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "jsonl_sink_open",
        skip(self, run),
        fields(sink = %self.name, out_dir = %run.out_dir)
    )]
    fn open(&mut self, run: &RunInfo) -> Result<()> {
        self.close();

        let out_dir = Path::new(&run.out_dir);
        fs::create_dir_all(out_dir).map_err(|e| {
            NodeError::io_with(format!("failed to create out_dir {}", out_dir.display()), e)
        })?;

        let run_target = open_target(out_dir.join(run_file_name(run.wall_start_time_ns)), false)?;
        let latest_target = open_target(out_dir.join(LATEST_FILE_NAME), true)?;
        self.current = Some(OpenRun {
            run: run_target,
            latest: latest_target,
            records: 0,
        });

        let header = to_line(&HeaderLine::new(run))?;
        let result = self.write_both(&header).and_then(|()| self.flush());
        if let Err(e) = result {
            error!(sink = %self.name, error = %e, "failed to write run header");
            self.close();
            return Err(e);
        }

        info!(
            sink = %self.name,
            path = ?self.path(),
            config_hash = %run.config_hash,
            "event log opened"
        );
        Ok(())
    }

    fn emit(&mut self, event: &Event) -> Result<()> {
        let line = to_line(&EventLine::new(event))?;
        self.write_both(&line)?;
        observability::record_event(event.kind);
        debug!(sink = %self.name, kind = %event.kind, t_ns = event.t_ns, "event written");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.current.as_mut() {
            Some(current) => {
                current.run.flush()?;
                current.latest.flush()
            }
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        if let Some(mut current) = self.current.take() {
            if let Err(e) = current.run.flush().and_then(|()| current.latest.flush()) {
                warn!(sink = %self.name, error = %e, "flush on close failed");
            }
            debug!(
                sink = %self.name,
                records = current.records,
                path = %current.run.path.display(),
                "event log closed"
            );
        }
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ErrorKind, EventKind};
    use serde_json::Value;

    fn run_info(out_dir: &Path, wall_start: i64) -> RunInfo {
        RunInfo {
            node_id: "node_001".into(),
            config_path: "cfg/node.toml".into(),
            out_dir: out_dir.display().to_string(),
            config_hash: "0123456789abcdef".into(),
            calibration_hash: "fedcba9876543210".into(),
            start_time_ns: 0,
            wall_start_time_ns: wall_start,
        }
    }

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_header_first_in_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlEventSink::new();
        sink.open(&run_info(dir.path(), 1_000)).unwrap();
        sink.emit(&Event::new(EventKind::Heartbeat, 0, 1_001).with_message("alive tick=0"))
            .unwrap();
        sink.flush().unwrap();

        let run_path = dir.path().join("events_1000.jsonl");
        assert_eq!(sink.path(), Some(run_path.as_path()));
        for path in [run_path.as_path(), sink.latest_path().unwrap()] {
            let lines = read_lines(path);
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0]["type"], "run_started");
            assert_eq!(lines[0]["node_id"], "node_001");
            assert_eq!(lines[0]["config_hash"], "0123456789abcdef");
            assert_eq!(lines[0]["t_ns"], 0);
            assert_eq!(lines[0]["t_wall_ns"], 1_000);
            assert_eq!(lines[1]["type"], "heartbeat");
            assert_eq!(lines[1]["message"], "alive tick=0");
        }
        sink.close();
    }

    #[test]
    fn test_latest_truncated_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlEventSink::new();
        sink.open(&run_info(dir.path(), 1)).unwrap();
        for i in 0..3 {
            sink.emit(&Event::new(EventKind::FrameStats, i, i)).unwrap();
        }
        sink.close();

        sink.open(&run_info(dir.path(), 2)).unwrap();
        sink.emit(&Event::new(EventKind::Shutdown, 0, 0)).unwrap();
        sink.close();

        assert_eq!(read_lines(&dir.path().join("events_1.jsonl")).len(), 4);
        assert_eq!(read_lines(&dir.path().join("events_2.jsonl")).len(), 2);
        let latest = read_lines(&dir.path().join(LATEST_FILE_NAME));
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0]["t_wall_ns"], 2);
    }

    #[test]
    fn test_creates_nested_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut sink = JsonlEventSink::new();
        sink.open(&run_info(&nested, 5)).unwrap();
        assert!(nested.join("events_5.jsonl").exists());
    }

    #[test]
    fn test_emit_before_open_is_internal() {
        let mut sink = JsonlEventSink::new();
        let err = sink.emit(&Event::new(EventKind::Heartbeat, 0, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlEventSink::new();
        sink.close();
        sink.open(&run_info(dir.path(), 9)).unwrap();
        sink.close();
        sink.close();
        assert!(!sink.is_open());
        assert!(sink.path().is_none());
    }

    #[test]
    fn test_open_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let mut sink = JsonlEventSink::new();
        let err = sink.open(&run_info(&blocker.join("sub"), 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        sink.close();
    }

    #[test]
    fn test_every_line_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlEventSink::new();
        sink.open(&run_info(dir.path(), 3)).unwrap();
        sink.emit(&Event::new(EventKind::FrameStats, 1, 1).with_message("id=\"x\"\nnext"))
            .unwrap();
        sink.emit(&Event::new(EventKind::InputEof, 2, 2)).unwrap();
        sink.close();

        let content = fs::read_to_string(dir.path().join("events_3.jsonl")).unwrap();
        assert!(content.ends_with('\n'));
        for line in content.lines() {
            assert!(serde_json::from_str::<Value>(line).is_ok(), "bad line: {line}");
        }
    }
}
