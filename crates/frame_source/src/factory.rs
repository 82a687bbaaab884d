//! Source selection

use contracts::{FrameSource, InputType, NodeConfig, Result};
use tracing::info;

use crate::frame_dir::FrameDirSource;
use crate::synth::SynthFrameSource;

/// Build the frame source selected by `input.type`
///
/// The returned source is not opened yet.
///
/// # Errors
/// Invalid argument when the selected variant rejects its configuration.
pub fn build_source(cfg: &NodeConfig) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match cfg.input.input_type {
        InputType::Synth => Box::new(SynthFrameSource::from_node_config(cfg)?),
        InputType::FrameDir => Box::new(FrameDirSource::from_node_config(cfg)),
    };
    info!(source = source.name(), "frame source built");
    Ok(source)
}
