//! Directory replay source
//!
//! Replays `.bin` frame files from one directory in lexicographic filename
//! order. Each file is a packed array of little-endian `f32` records whose
//! layout (`xyzi` or `xyz`) is fixed per dataset by configuration.
//!
//! Timestamps come from an optional sidecar file; frames past its end get
//! `index * period`, never earlier than one period after the last sidecar
//! value.

use std::path::{Path, PathBuf};

use contracts::{
    hz_to_period_ns, Frame, FrameSource, NodeConfig, NodeError, Point, PointLayout, Result,
};
use tracing::{debug, info, instrument, warn};

use crate::timestamps::{load_timestamps, DEFAULT_TIMESTAMPS_FILE};

/// Directory replay configuration
#[derive(Debug, Clone)]
pub struct FrameDirConfig {
    /// Dataset directory
    pub path: PathBuf,

    /// Rewind at end of input instead of reporting EOF
    pub loop_playback: bool,

    /// Rate used for frames without a sidecar timestamp (must be > 0)
    pub fps: f64,

    /// Record layout of every file in the directory
    pub layout: PointLayout,

    /// Sidecar file name, relative to `path`
    pub timestamps_file: String,
}

impl FrameDirConfig {
    /// Resolve from node config; `fps <= 0` falls back to the tick rate
    pub fn from_node_config(cfg: &NodeConfig) -> Self {
        let dir = &cfg.input.frame_dir;
        let fps = if dir.fps > 0.0 {
            dir.fps
        } else {
            cfg.input.tick_hz
        };
        Self {
            path: PathBuf::from(&dir.path),
            loop_playback: dir.loop_playback,
            fps,
            layout: dir.point_layout,
            timestamps_file: dir
                .timestamps_file
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMESTAMPS_FILE.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct FrameEntry {
    frame_id: String,
    path: PathBuf,
}

/// Directory replay source
pub struct FrameDirSource {
    config: FrameDirConfig,
    period_ns: i64,
    entries: Vec<FrameEntry>,
    timestamps: Vec<i64>,
    index: usize,
    rewinds: u64,
    opened: bool,
}

impl FrameDirSource {
    /// Unopened source; the directory is not touched until `open`
    pub fn new(config: FrameDirConfig) -> Self {
        let period_ns = hz_to_period_ns(config.fps);
        Self {
            config,
            period_ns,
            entries: Vec::new(),
            timestamps: Vec::new(),
            index: 0,
            rewinds: 0,
            opened: false,
        }
    }

    pub fn from_node_config(cfg: &NodeConfig) -> Self {
        Self::new(FrameDirConfig::from_node_config(cfg))
    }

    /// Number of frame files found at open
    pub fn frame_count(&self) -> usize {
        self.entries.len()
    }

    /// Fallback timestamp period (ns)
    pub fn period_ns(&self) -> i64 {
        self.period_ns
    }

    /// Logical time of frame `index`
    ///
    /// Past the end of the sidecar, frames step one period from its last
    /// value unless `index * period` is already later, so time stays
    /// increasing across the handover.
    fn timestamp_for(&self, index: usize) -> i64 {
        if let Some(&t) = self.timestamps.get(index) {
            return t;
        }
        let fallback = (index as i64).saturating_mul(self.period_ns);
        match self.timestamps.last() {
            Some(&last) => {
                let steps = (index - self.timestamps.len() + 1) as i64;
                fallback.max(last.saturating_add(steps.saturating_mul(self.period_ns)))
            }
            None => fallback,
        }
    }

    fn rewind(&mut self) {
        self.index = 0;
        self.rewinds += 1;
        info!(
            path = %self.config.path.display(),
            rewinds = self.rewinds,
            "frame_dir looped to first frame"
        );
    }
}

impl FrameSource for FrameDirSource {
    fn name(&self) -> &str {
        "frame_dir"
    }

    #[instrument(name = "frame_dir_open", skip(self), fields(path = %self.config.path.display()))]
    fn open(&mut self) -> Result<()> {
        if self.config.path.as_os_str().is_empty() {
            return Err(NodeError::invalid_argument("frame_dir: path is empty"));
        }
        self.close();

        let entries = list_frame_files(&self.config.path)?;
        let sidecar = self.config.path.join(&self.config.timestamps_file);
        let timestamps = load_timestamps(&sidecar)?.unwrap_or_default();

        if !timestamps.is_empty() && timestamps.len() != entries.len() {
            warn!(
                frames = entries.len(),
                timestamps = timestamps.len(),
                "timestamp count does not match frame count"
            );
        }

        info!(
            frames = entries.len(),
            timestamps = timestamps.len(),
            layout = self.config.layout.as_str(),
            loop_playback = self.config.loop_playback,
            "frame_dir source opened"
        );

        self.entries = entries;
        self.timestamps = timestamps;
        self.index = 0;
        self.opened = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Frame> {
        if !self.opened {
            return Err(NodeError::invalid_argument("frame_dir: next called before open"));
        }
        if self.index >= self.entries.len() {
            if !self.config.loop_playback || self.entries.is_empty() {
                return Err(NodeError::out_of_range("eof"));
            }
            self.rewind();
        }

        let entry = &self.entries[self.index];
        let points = read_frame_file(&entry.path, self.config.layout)?;
        let frame = Frame {
            t_ns: self.timestamp_for(self.index),
            frame_id: entry.frame_id.clone(),
            points,
        };

        debug!(
            frame_id = %frame.frame_id,
            t_ns = frame.t_ns,
            num_points = frame.len(),
            "frame_dir frame read"
        );

        self.index += 1;
        Ok(frame)
    }

    fn reset(&mut self) -> Result<()> {
        self.index = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
        self.entries.clear();
        self.timestamps.clear();
        self.index = 0;
    }

    fn rewind_count(&self) -> u64 {
        self.rewinds
    }
}

/// Number of `.bin` frame files in `dir`
pub fn count_frame_files(dir: &Path) -> Result<usize> {
    list_frame_files(dir).map(|entries| entries.len())
}

/// Regular `.bin` files in `dir`, sorted by filename
fn list_frame_files(dir: &Path) -> Result<Vec<FrameEntry>> {
    let metadata = std::fs::metadata(dir).map_err(|e| {
        NodeError::from_io(format!("frame_dir: cannot access {}", dir.display()), e)
    })?;
    if !metadata.is_dir() {
        return Err(NodeError::invalid_argument(format!(
            "frame_dir: path is not a directory: {}",
            dir.display()
        )));
    }

    let read_dir = std::fs::read_dir(dir).map_err(|e| {
        NodeError::io_with(format!("frame_dir: failed listing {}", dir.display()), e)
    })?;

    let mut entries = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| {
            NodeError::io_with(format!("frame_dir: failed listing {}", dir.display()), e)
        })?;
        let path = item.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("bin") {
            continue;
        }
        let frame_id = item.file_name().to_string_lossy().into_owned();
        entries.push(FrameEntry { frame_id, path });
    }

    if entries.is_empty() {
        return Err(NodeError::not_found(format!(
            "frame_dir: no .bin files found in {}",
            dir.display()
        )));
    }

    entries.sort_by(|a, b| a.frame_id.cmp(&b.frame_id));
    Ok(entries)
}

fn read_frame_file(path: &Path, layout: PointLayout) -> Result<Vec<Point>> {
    let bytes = std::fs::read(path).map_err(|e| {
        NodeError::io_with(format!("frame_dir: failed to read {}", path.display()), e)
    })?;
    decode_points(&bytes, layout).map_err(|e| match e {
        NodeError::CorruptData { message } => {
            NodeError::corrupt_data(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Decode packed little-endian `f32` records
///
/// # Errors
/// `corrupt_data` when the buffer is empty or not a whole number of records.
pub fn decode_points(bytes: &[u8], layout: PointLayout) -> Result<Vec<Point>> {
    let stride = layout.stride();
    if bytes.is_empty() || bytes.len() % stride != 0 {
        return Err(NodeError::corrupt_data(format!(
            "size {} is not a positive multiple of the {}-byte {} record",
            bytes.len(),
            stride,
            layout.as_str()
        )));
    }

    let points = bytes
        .chunks_exact(stride)
        .map(|record| {
            let f = |i: usize| {
                let mut word = [0u8; 4];
                word.copy_from_slice(&record[i * 4..i * 4 + 4]);
                f32::from_le_bytes(word)
            };
            let intensity = match layout {
                PointLayout::Xyzi => f(3),
                PointLayout::Xyz => 0.0,
            };
            Point::new(f(0), f(1), f(2), intensity)
        })
        .collect();
    Ok(points)
}
