//! Frame - Frame Source output
//!
//! A timestamped point cloud handed from a source to the scheduler.

use serde::{Deserialize, Serialize};

/// Single LiDAR return
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32, z: f32, intensity: f32) -> Self {
        Self { x, y, z, intensity }
    }
}

/// Point cloud frame
///
/// Ownership passes fully to the caller of `FrameSource::next`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Logical time (ns). Tick-derived or taken from the dataset timestamp table.
    pub t_ns: i64,

    /// Identifier for diagnostics (filename for replay, `synth_<tick>` for synthetic)
    pub frame_id: String,

    /// Points in the sensor frame
    pub points: Vec<Point>,
}

impl Frame {
    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the frame carries no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
