//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{InputType, NodeConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    node_id: String,
    mode: String,
    input_type: String,
    tick_hz: f64,
    out_dir: String,
    config_hash: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(&args.config);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", path.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(path) {
        Ok(node) => {
            let warnings = collect_warnings(&node);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    node_id: node.node_id.clone(),
                    mode: node.mode.as_str().to_string(),
                    input_type: node.input.input_type.as_str().to_string(),
                    tick_hz: node.input.tick_hz,
                    out_dir: node.output.out_dir.clone(),
                    config_hash: fingerprint::compute_config_hash(&node),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(node: &NodeConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let input = &node.input;
    let bounded = input.max_ticks > 0 || input.max_run_s > 0.0;

    if !bounded && (input.input_type == InputType::Synth || input.loops()) {
        warnings.push(
            "Run is unbounded - set input.max_ticks or input.max_run_s, or stop with a signal"
                .to_string(),
        );
    }

    if input.heartbeat_every_s == 0 {
        warnings.push("input.heartbeat_every_s is 0 - heartbeats disabled".to_string());
    }

    if input.heartbeat_every_s != node.output.heartbeat_period_s {
        warnings.push(
            "output.heartbeat_period_s differs from input.heartbeat_every_s - \
             only the latter drives heartbeats"
                .to_string(),
        );
    }

    if input.input_type == InputType::FrameDir && !Path::new(&input.frame_dir.path).is_dir() {
        warnings.push(format!(
            "input.frame_dir.path '{}' is not a directory",
            input.frame_dir.path
        ));
    }

    if node.output.keep_last_runs == 0 {
        warnings.push("output.keep_last_runs is 0 - old event logs are never pruned".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Node: {} ({})", summary.node_id, summary.mode);
            println!("  Input: {} @ {} Hz", summary.input_type, summary.tick_hz);
            println!("  Output: {}", summary.out_dir);
            println!("  Config hash: {}", summary.config_hash);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_summary() {
        let file = write_config(
            r#"
node_id = "node_042"
[input]
max_ticks = 10
"#,
        );
        let result = validate_config(file.path());
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.node_id, "node_042");
        assert_eq!(summary.input_type, "synth");
        assert_eq!(summary.config_hash.len(), 16);
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let file = write_config("[input]\ntick_hz = 0.0\n");
        let result = validate_config(file.path());
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("tick_hz"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(Path::new("/nonexistent/node.toml"));
        assert!(!result.valid);
        assert!(result.error.unwrap().starts_with("File not found"));
    }

    #[test]
    fn test_unbounded_synth_warns() {
        let warnings = collect_warnings(&NodeConfig::default());
        assert!(warnings.iter().any(|w| w.starts_with("Run is unbounded")));

        let mut node = NodeConfig::default();
        node.input.max_ticks = 5;
        let warnings = collect_warnings(&node);
        assert!(!warnings.iter().any(|w| w.starts_with("Run is unbounded")));
    }
}
