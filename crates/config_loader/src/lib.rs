//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `NodeConfig` the core can trust
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let cfg = ConfigLoader::load_from_path(Path::new("node.toml")).unwrap();
//! println!("Node: {}", cfg.node_id);
//! ```

mod parser;
mod validator;

pub use contracts::NodeConfig;
pub use parser::ConfigFormat;

use contracts::NodeError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<NodeConfig, NodeError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        debug!(path = %path.display(), ?format, "Loading config");
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<NodeConfig, NodeError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built configuration (e.g. after CLI overrides)
    pub fn validate(cfg: &NodeConfig) -> Result<(), NodeError> {
        validator::validate(cfg)
    }

    /// Serialize NodeConfig to TOML string
    pub fn to_toml(cfg: &NodeConfig) -> Result<String, NodeError> {
        toml::to_string_pretty(cfg)
            .map_err(|e| NodeError::parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize NodeConfig to JSON string
    pub fn to_json(cfg: &NodeConfig) -> Result<String, NodeError> {
        serde_json::to_string_pretty(cfg)
            .map_err(|e| NodeError::parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, NodeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| NodeError::parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| NodeError::unsupported(format!("unsupported config format: .{ext}")))
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, NodeError> {
        std::fs::read_to_string(path)
            .map_err(|e| NodeError::from_io(format!("cannot read {}", path.display()), e))
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<NodeConfig, NodeError> {
        let cfg = parser::parse(content, format)?;
        validator::validate(&cfg)?;
        Ok(cfg)
    }
}
