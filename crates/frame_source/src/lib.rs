//! # Frame Source
//!
//! Point cloud producers behind the `FrameSource` trait.
//!
//! Responsibilities:
//! - Synthetic scene generation for pipeline bring-up (`SynthFrameSource`)
//! - Directory replay of recorded `.bin` frames (`FrameDirSource`)
//! - Source selection from `NodeConfig` (`build_source`)
//!
//! Both variants are deterministic: the same configuration and the same files
//! produce identical frame sequences, which is what makes runs reproducible.

pub mod factory;
pub mod frame_dir;
pub mod synth;
pub mod timestamps;

pub use contracts::{Frame, FrameSource, NodeError, Point, Result};
pub use factory::build_source;
pub use frame_dir::{count_frame_files, decode_points, FrameDirConfig, FrameDirSource};
pub use synth::{SynthConfig, SynthFrameSource};
pub use timestamps::{load_timestamps, parse_timestamps, DEFAULT_TIMESTAMPS_FILE};
