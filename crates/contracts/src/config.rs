//! NodeConfig - Config Loader output
//!
//! Complete node configuration: identity, calibration, downstream stage
//! parameters, input source selection and output routing.
//!
//! Units: distances in metres, durations in nanoseconds (written as seconds in
//! config files, see [`crate::secs_as_ns`]).

use serde::{Deserialize, Serialize};

use crate::{secs_as_ns, seconds_to_ns};

/// High-level run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Replay,
    /// Placeholder for live sensors
    Live,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replay => "replay",
            Self::Live => "live",
        }
    }
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Run mode
    pub mode: RunMode,

    /// Node identifier (e.g. "node_001")
    pub node_id: String,

    /// Coordinate frame names
    pub frames: FramesConfig,

    /// Extrinsic calibration
    pub calibration: CalibrationConfig,

    /// Baseline capture timing
    pub baseline: BaselineConfig,

    /// Sparse voxel mapping parameters
    pub mapping: MappingConfig,

    /// Throughput budgets
    pub budgets: BudgetsConfig,

    /// Change detection parameters
    pub change: ChangeDetectionConfig,

    /// Dataset replay parameters
    pub replay: ReplayConfig,

    /// Input source and run loop
    pub input: InputConfig,

    /// Event output
    pub output: OutputConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Replay,
            node_id: "node_001".to_string(),
            frames: FramesConfig::default(),
            calibration: CalibrationConfig::default(),
            baseline: BaselineConfig::default(),
            mapping: MappingConfig::default(),
            budgets: BudgetsConfig::default(),
            change: ChangeDetectionConfig::default(),
            replay: ReplayConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Frame names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramesConfig {
    pub lidar_frame: String,
    pub node_frame: String,
    /// Optional until site alignment exists
    pub site_frame: String,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            lidar_frame: "lidar".to_string(),
            node_frame: "node".to_string(),
            site_frame: "site".to_string(),
        }
    }
}

/// Row-major 4x4 rigid transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformSE3(pub [[f32; 4]; 4]);

impl TransformSE3 {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Elements in row-major order
    pub fn elements(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }
}

impl Default for TransformSE3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Calibration payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Path to the calibration source
    pub calibration_path: String,

    /// Version string (hashed)
    pub calibration_version: String,

    /// Extrinsics lidar -> node
    #[serde(alias = "T_node_lidar")]
    pub t_node_lidar: TransformSE3,

    /// Node -> site, identity when unknown
    #[serde(alias = "T_site_node")]
    pub t_site_node: TransformSE3,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            calibration_path: String::new(),
            calibration_version: "dev".to_string(),
            t_node_lidar: TransformSE3::IDENTITY,
            t_site_node: TransformSE3::IDENTITY,
        }
    }
}

/// Baseline capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// How long to learn "normal" before freezing the baseline
    #[serde(rename = "capture_duration_s", with = "secs_as_ns")]
    pub capture_duration_ns: i64,

    /// Settling time ignored before capture
    #[serde(rename = "warmup_duration_s", with = "secs_as_ns")]
    pub warmup_duration_ns: i64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            capture_duration_ns: seconds_to_ns(30.0),
            warmup_duration_ns: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned region of interest (node frame)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    pub min: Vec3,
    pub max: Vec3,
}

impl RoiConfig {
    /// min <= max on every axis
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            min: Vec3::new(-10.0, -10.0, -2.0),
            max: Vec3::new(10.0, 10.0, 5.0),
        }
    }
}

/// Sparse voxel mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub voxel_size_m: f32,
    /// Voxels per block edge
    pub block_size_vox: i32,
    pub roi: RoiConfig,
    pub min_range_m: f32,
    pub max_range_m: f32,
    pub use_intensity: bool,
    pub integrate_hz: i32,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            voxel_size_m: 0.02,
            block_size_vox: 8,
            roi: RoiConfig::default(),
            min_range_m: 0.2,
            max_range_m: 50.0,
            use_intensity: true,
            integrate_hz: 10,
        }
    }
}

/// Budgets / throttling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetsConfig {
    /// Hard cap, above it input is decimated
    pub max_points_per_sec: i64,
    pub target_fps: i32,
    pub downsample_voxel_m: f32,
}

impl Default for BudgetsConfig {
    fn default() -> Self {
        Self {
            max_points_per_sec: 2_000_000,
            target_fps: 10,
            downsample_voxel_m: 0.03,
        }
    }
}

/// Change detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeDetectionConfig {
    /// Change must persist this long before emission
    #[serde(rename = "persistence_s", with = "secs_as_ns")]
    pub persistence_ns: i64,
    pub min_cluster_volume_m3: f32,
    pub min_aabb_edge_m: f32,
    /// 0..1
    pub min_confidence: f32,
    pub prefer_site_frame: bool,
}

impl Default for ChangeDetectionConfig {
    fn default() -> Self {
        Self {
            persistence_ns: seconds_to_ns(2.0),
            min_cluster_volume_m3: 0.01,
            min_aabb_edge_m: 0.10,
            min_confidence: 0.6,
            prefer_site_frame: true,
        }
    }
}

/// Dataset replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub dataset_path: String,
    /// 1.0 = real time, 0 = as fast as possible
    pub time_scale: f64,
    #[serde(rename = "start_offset_s", with = "secs_as_ns")]
    pub start_offset_ns: i64,
    #[serde(rename = "end_offset_s", with = "secs_as_ns")]
    pub end_offset_ns: i64,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
}

/// Input source variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Synth,
    FrameDir,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synth => "synth",
            Self::FrameDir => "frame_dir",
        }
    }
}

/// Input source and run loop limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    #[serde(rename = "type")]
    pub input_type: InputType,

    /// Run loop rate, must be > 0
    pub tick_hz: f64,

    /// Heartbeat interval in seconds (0 disables)
    pub heartbeat_every_s: i32,

    /// Stop after this many ticks (0 disables)
    pub max_ticks: i64,

    /// Stop after this many seconds (0 disables)
    pub max_run_s: f64,

    /// Emit a frame_stats record every N ticks
    pub frame_stats_every: u32,

    pub synth: InputSynthConfig,

    pub frame_dir: InputFrameDirConfig,
}

impl InputConfig {
    /// Whether the selected source should loop at end of input
    pub fn loops(&self) -> bool {
        match self.input_type {
            InputType::Synth => false,
            InputType::FrameDir => self.frame_dir.loop_playback,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            input_type: InputType::Synth,
            tick_hz: 10.0,
            heartbeat_every_s: 5,
            max_ticks: 0,
            max_run_s: 0.0,
            frame_stats_every: 1,
            synth: InputSynthConfig::default(),
            frame_dir: InputFrameDirConfig::default(),
        }
    }
}

/// Synthetic generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSynthConfig {
    pub seed: u32,
    /// Static scene size
    pub num_points: i32,
    pub enable_obstacle: bool,
    pub obstacle_start_s: f64,
    pub moving_obstacle: bool,
    pub obstacle_speed_mps: f32,
}

impl Default for InputSynthConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            num_points: 1600,
            enable_obstacle: true,
            obstacle_start_s: 8.0,
            moving_obstacle: false,
            obstacle_speed_mps: 0.25,
        }
    }
}

/// On-disk point record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLayout {
    /// x, y, z, intensity (16 bytes)
    #[default]
    Xyzi,
    /// x, y, z (12 bytes), intensity 0
    Xyz,
}

impl PointLayout {
    /// Record size in bytes
    pub fn stride(&self) -> usize {
        match self {
            Self::Xyzi => 16,
            Self::Xyz => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xyzi => "xyzi",
            Self::Xyz => "xyz",
        }
    }
}

/// Directory replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrameDirConfig {
    /// Directory holding `.bin` frame files
    pub path: String,

    #[serde(rename = "loop")]
    pub loop_playback: bool,

    /// Timestamp rate when no sidecar value exists; <= 0 falls back to `tick_hz`
    pub fps: f64,

    pub point_layout: PointLayout,

    /// Sidecar name relative to `path` (default `timestamps.txt`)
    pub timestamps_file: Option<String>,
}

/// Event output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Event log directory
    pub out_dir: String,

    /// Legacy heartbeat period, fingerprinted only
    pub heartbeat_period_s: i32,

    /// Per-run event files kept on start (0 disables pruning)
    pub keep_last_runs: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: "out".to_string(),
            heartbeat_period_s: 5,
            keep_last_runs: 50,
        }
    }
}
