//! Synthetic frame source
//!
//! Produces a static floor patch every tick and, once the configured start
//! time is reached, the surface of a 1 m box sitting on it. Used to bring the
//! pipeline up without recorded data.

use contracts::{
    hz_to_period_ns, seconds_to_ns, Frame, FrameSource, InputSynthConfig, NodeConfig, NodeError,
    Point, Result,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Floor patch half extent (m)
const FLOOR_HALF_EXTENT_M: f32 = 8.0;
/// Floor thickness (m)
const FLOOR_THICKNESS_M: f32 = 0.05;

const OBSTACLE_CENTER: [f32; 3] = [2.0, 0.0, 0.5];
const OBSTACLE_SIZE_M: f32 = 1.0;
/// Samples per face edge
const OBSTACLE_GRID_N: usize = 10;
const OBSTACLE_INTENSITY: f32 = 1.0;

/// Synthetic source configuration
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Tick rate; drives the logical clock
    pub tick_hz: f64,
    /// Scene and obstacle parameters
    pub synth: InputSynthConfig,
}

impl SynthConfig {
    pub fn from_node_config(cfg: &NodeConfig) -> Self {
        Self {
            tick_hz: cfg.input.tick_hz,
            synth: cfg.input.synth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceState {
    Created,
    Open,
    Closed,
}

/// Synthetic frame source
///
/// Never reaches end of input while open.
pub struct SynthFrameSource {
    config: SynthConfig,
    period_ns: i64,
    obstacle_start_ns: i64,
    scene: Vec<Point>,
    tick: i64,
    state: SourceState,
}

impl SynthFrameSource {
    /// Create a source and precompute the static scene
    ///
    /// # Errors
    /// Invalid argument when `tick_hz` or `num_points` is not positive.
    pub fn new(config: SynthConfig) -> Result<Self> {
        if config.tick_hz <= 0.0 || !config.tick_hz.is_finite() {
            return Err(NodeError::invalid_argument(format!(
                "synth: tick_hz must be > 0, got {}",
                config.tick_hz
            )));
        }
        if config.synth.num_points <= 0 {
            return Err(NodeError::invalid_argument(format!(
                "synth: num_points must be > 0, got {}",
                config.synth.num_points
            )));
        }

        let period_ns = hz_to_period_ns(config.tick_hz);
        let obstacle_start_ns = seconds_to_ns(config.synth.obstacle_start_s);
        let scene = generate_floor(config.synth.seed, config.synth.num_points as usize);

        debug!(
            seed = config.synth.seed,
            num_points = scene.len(),
            period_ns,
            "synth scene generated"
        );

        Ok(Self {
            config,
            period_ns,
            obstacle_start_ns,
            scene,
            tick: 0,
            state: SourceState::Created,
        })
    }

    /// Build from the `input` section of a node config
    pub fn from_node_config(cfg: &NodeConfig) -> Result<Self> {
        Self::new(SynthConfig::from_node_config(cfg))
    }

    /// Tick period (ns)
    pub fn period_ns(&self) -> i64 {
        self.period_ns
    }

    /// Next tick index
    pub fn tick(&self) -> i64 {
        self.tick
    }

    fn obstacle_visible(&self, t_ns: i64) -> bool {
        self.config.synth.enable_obstacle && t_ns >= self.obstacle_start_ns
    }

    fn obstacle_center(&self, t_ns: i64) -> [f32; 3] {
        let mut center = OBSTACLE_CENTER;
        if self.config.synth.moving_obstacle {
            let dt_s = (t_ns - self.obstacle_start_ns) as f64 / 1e9;
            center[0] += (self.config.synth.obstacle_speed_mps as f64 * dt_s) as f32;
        }
        center
    }
}

impl FrameSource for SynthFrameSource {
    fn name(&self) -> &str {
        "synth"
    }

    fn open(&mut self) -> Result<()> {
        self.tick = 0;
        self.state = SourceState::Open;
        info!(
            num_points = self.scene.len(),
            tick_hz = self.config.tick_hz,
            obstacle = self.config.synth.enable_obstacle,
            "synth source opened"
        );
        Ok(())
    }

    fn next(&mut self) -> Result<Frame> {
        match self.state {
            SourceState::Created => {
                return Err(NodeError::invalid_argument("synth: next called before open"))
            }
            SourceState::Closed => return Err(NodeError::out_of_range("synth: source closed")),
            SourceState::Open => {}
        }

        let t_ns = self.tick * self.period_ns;
        let capacity = self.scene.len() + 6 * OBSTACLE_GRID_N * OBSTACLE_GRID_N;
        let mut points = Vec::with_capacity(capacity);
        points.extend_from_slice(&self.scene);

        if self.obstacle_visible(t_ns) {
            append_box_surface(&mut points, self.obstacle_center(t_ns), OBSTACLE_SIZE_M);
        }

        let frame = Frame {
            t_ns,
            frame_id: format!("synth_{}", self.tick),
            points,
        };
        self.tick += 1;
        Ok(frame)
    }

    fn reset(&mut self) -> Result<()> {
        self.tick = 0;
        Ok(())
    }

    fn close(&mut self) {
        if self.state == SourceState::Open {
            debug!(ticks = self.tick, "synth source closed");
        }
        self.state = SourceState::Closed;
    }
}

/// Uniform floor patch from a seeded generator
fn generate_floor(seed: u32, n: usize) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
    (0..n)
        .map(|_| {
            let x = rng.random_range(-FLOOR_HALF_EXTENT_M..FLOOR_HALF_EXTENT_M);
            let y = rng.random_range(-FLOOR_HALF_EXTENT_M..FLOOR_HALF_EXTENT_M);
            let z = rng.random_range(0.0..FLOOR_THICKNESS_M);
            let intensity = rng.random_range(0.1..0.3);
            Point::new(x, y, z, intensity)
        })
        .collect()
}

/// Six faces sampled on an n x n grid, 6 * n^2 points
fn append_box_surface(points: &mut Vec<Point>, center: [f32; 3], size: f32) {
    let h = 0.5 * size;
    let (x0, x1) = (center[0] - h, center[0] + h);
    let (y0, y1) = (center[1] - h, center[1] + h);
    let (z0, z1) = (center[2] - h, center[2] + h);
    let last = (OBSTACLE_GRID_N - 1) as f32;

    for i in 0..OBSTACLE_GRID_N {
        let u = i as f32 / last;
        let x = x0 + u * (x1 - x0);
        let y = y0 + u * (y1 - y0);
        for j in 0..OBSTACLE_GRID_N {
            let v = j as f32 / last;
            let xx = x0 + v * (x1 - x0);
            let yy = y0 + v * (y1 - y0);
            let zz = z0 + v * (z1 - z0);

            points.push(Point::new(xx, yy, z0, OBSTACLE_INTENSITY));
            points.push(Point::new(xx, yy, z1, OBSTACLE_INTENSITY));
            points.push(Point::new(x0, y, zz, OBSTACLE_INTENSITY));
            points.push(Point::new(x1, y, zz, OBSTACLE_INTENSITY));
            points.push(Point::new(x, y0, zz, OBSTACLE_INTENSITY));
            points.push(Point::new(x, y1, zz, OBSTACLE_INTENSITY));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ErrorKind;

    fn config(num_points: i32) -> SynthConfig {
        SynthConfig {
            tick_hz: 10.0,
            synth: InputSynthConfig {
                num_points,
                ..InputSynthConfig::default()
            },
        }
    }

    fn opened(config: SynthConfig) -> SynthFrameSource {
        let mut source = SynthFrameSource::new(config).unwrap();
        source.open().unwrap();
        source
    }

    #[test]
    fn test_tick_timing() {
        let mut source = opened(config(100));
        for k in 0..5 {
            let frame = source.next().unwrap();
            assert_eq!(frame.t_ns, k * 100_000_000);
            assert_eq!(frame.frame_id, format!("synth_{k}"));
        }
    }

    #[test]
    fn test_obstacle_appears_at_start_time() {
        // 10 Hz, obstacle at 8 s: tick 79 without, tick 80 with
        let mut source = opened(config(1600));
        let frames: Vec<Frame> = (0..81).map(|_| source.next().unwrap()).collect();
        assert_eq!(frames[79].len(), 1600);
        assert_eq!(frames[80].len(), 1600 + 600);
        assert_eq!(frames[80].t_ns, 8_000_000_000);
        assert!(frames[80].points[1600..].iter().all(|p| p.intensity == 1.0));
    }

    #[test]
    fn test_obstacle_disabled() {
        let mut cfg = config(10);
        cfg.synth.enable_obstacle = false;
        cfg.synth.obstacle_start_s = 0.0;
        let mut source = opened(cfg);
        assert_eq!(source.next().unwrap().len(), 10);
    }

    #[test]
    fn test_floor_bounds() {
        let mut source = opened(config(500));
        let frame = source.next().unwrap();
        for p in &frame.points {
            assert!((-8.0..8.0).contains(&p.x));
            assert!((-8.0..8.0).contains(&p.y));
            assert!((0.0..0.05).contains(&p.z));
            assert!((0.1..0.3).contains(&p.intensity));
        }
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = opened(config(64)).next().unwrap();
        let b = opened(config(64)).next().unwrap();
        assert_eq!(a, b);

        let mut other = config(64);
        other.synth.seed = 2;
        let c = opened(other).next().unwrap();
        assert_ne!(a.points, c.points);
    }

    #[test]
    fn test_moving_obstacle_translates_x() {
        let mut cfg = config(1);
        cfg.synth.obstacle_start_s = 0.0;
        cfg.synth.moving_obstacle = true;
        cfg.synth.obstacle_speed_mps = 1.0;
        let mut source = opened(cfg);

        let first = source.next().unwrap();
        for _ in 0..9 {
            source.next().unwrap();
        }
        let later = source.next().unwrap(); // t = 1 s

        let min_x = |f: &Frame| {
            f.points[1..]
                .iter()
                .map(|p| p.x)
                .fold(f32::INFINITY, f32::min)
        };
        assert!((min_x(&first) - 1.5).abs() < 1e-5);
        assert!((min_x(&later) - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_reset_rewinds_tick() {
        let mut source = opened(config(4));
        source.next().unwrap();
        source.next().unwrap();
        source.reset().unwrap();
        assert_eq!(source.next().unwrap().t_ns, 0);
    }

    #[test]
    fn test_invalid_construction() {
        let err = SynthFrameSource::new(config(0)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let mut cfg = config(10);
        cfg.tick_hz = 0.0;
        assert!(SynthFrameSource::new(cfg).is_err());
    }

    #[test]
    fn test_next_outside_open_window() {
        let mut source = SynthFrameSource::new(config(4)).unwrap();
        assert_eq!(source.next().unwrap_err().kind(), ErrorKind::InvalidArgument);

        source.open().unwrap();
        source.close();
        assert!(source.next().unwrap_err().is_eof());
        source.close();
    }
}
