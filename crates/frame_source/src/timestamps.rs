//! Timestamp sidecar
//!
//! Plain text, one base-10 `i64` nanosecond value per line, line `i` belongs
//! to the `i`-th frame in filename order.

use std::path::Path;

use contracts::{NodeError, Result};

/// Sidecar name used when the config does not set one
pub const DEFAULT_TIMESTAMPS_FILE: &str = "timestamps.txt";

/// Load a sidecar file
///
/// A missing file is not an error and yields `None`.
///
/// # Errors
/// IO error when the file exists but cannot be read, parse error for a
/// malformed line.
pub fn load_timestamps(path: &Path) -> Result<Option<Vec<i64>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(NodeError::io_with(
                format!("failed to read timestamps {}", path.display()),
                e,
            ))
        }
    };
    parse_timestamps(&content).map(Some)
}

/// Parse sidecar content
///
/// Values must be non-decreasing; logical time never runs backward within
/// one pass.
pub fn parse_timestamps(content: &str) -> Result<Vec<i64>> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let value: i64 = line.trim().parse().map_err(|e| NodeError::Parse {
            message: format!("timestamps line {line_no}: invalid integer {:?}", line.trim()),
            source: Some(Box::new(e)),
        })?;
        if let Some(&prev) = out.last() {
            if value < prev {
                return Err(NodeError::parse(format!(
                    "timestamps line {line_no}: {value} is earlier than previous {prev}"
                )));
            }
        }
        out.push(value);
    }
    Ok(out)
}
