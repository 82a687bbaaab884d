//! Per-run log retention
//!
//! Keeps the newest `keep_last` files named `events_<digits>.jsonl`, ordered
//! by the embedded wall-clock start time. `events_latest.jsonl` and any other
//! file are never touched.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Parse the wall-clock start time from a per-run file name
pub fn parse_run_file_name(name: &str) -> Option<i64> {
    let digits = name.strip_prefix("events_")?.strip_suffix(".jsonl")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Delete per-run files beyond the newest `keep_last`
///
/// Best-effort: listing and removal failures are logged, never returned.
/// `keep_last == 0` disables pruning. Returns the number of files removed.
pub fn prune_event_logs(out_dir: &Path, keep_last: usize) -> usize {
    if keep_last == 0 {
        return 0;
    }

    let read_dir = match std::fs::read_dir(out_dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            debug!(out_dir = %out_dir.display(), error = %e, "retention skipped");
            return 0;
        }
    };

    let mut runs: Vec<(i64, PathBuf)> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name();
            let stamp = parse_run_file_name(name.to_str()?)?;
            Some((stamp, entry.path()))
        })
        .collect();

    if runs.len() <= keep_last {
        return 0;
    }

    // newest first
    runs.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = 0;
    for (_, path) in runs.into_iter().skip(keep_last) {
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "failed to prune event log"),
        }
    }

    info!(out_dir = %out_dir.display(), removed, keep_last, "pruned old event logs");
    removed
}
