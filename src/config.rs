//! Tool configuration module.
//!
//! Handles loading and validating `config.toml`. All options are optional;
//! a missing file means stock defaults. Unknown keys are rejected to catch
//! typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! dimensions = [1200, 1200]  # Final crop dimensions [width, height]
//! max_bytes = 256000         # Soft byte budget per encoded image (250 KiB)
//!
//! [quality]
//! min = 1                    # Lowest JPEG quality the search may use
//! max = 95                   # Highest JPEG quality the search may use
//! start = 85                 # First quality probed
//! step = 5                   # Upward increment when start already fits
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```

use crate::imaging::{Dimensions, EncodeOptions, Quality, QualityRange};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Final crop dimensions and byte budget.
    pub output: OutputConfig,
    /// Quality search bounds and probing parameters.
    pub quality: QualityConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.dimensions[0] == 0 || self.output.dimensions[1] == 0 {
            return Err(ConfigError::Validation(
                "output.dimensions values must be non-zero".into(),
            ));
        }
        if self.output.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "output.max_bytes must be non-zero".into(),
            ));
        }
        let q = &self.quality;
        if q.min == 0 || q.max == 0 || q.start == 0 {
            return Err(ConfigError::Validation(
                "quality values must be at least 1".into(),
            ));
        }
        if q.min > 100 || q.max > 100 || q.start > 100 {
            return Err(ConfigError::Validation(
                "quality values must be at most 100".into(),
            ));
        }
        if q.min > q.max {
            return Err(ConfigError::Validation(
                "quality.min must not exceed quality.max".into(),
            ));
        }
        if q.step == 0 {
            return Err(ConfigError::Validation("quality.step must be at least 1".into()));
        }
        Ok(())
    }

    /// Final crop dimensions as an imaging target.
    pub fn target(&self) -> Dimensions {
        Dimensions::new(self.output.dimensions[0], self.output.dimensions[1])
    }

    /// Encoder options derived from the output and quality sections.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            max_bytes: self.output.max_bytes,
            range: QualityRange::new(self.quality.min, self.quality.max),
            start: Quality::new(self.quality.start),
            step: self.quality.step,
        }
    }
}

/// Final crop dimensions and byte budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Final crop dimensions as `[width, height]`.
    pub dimensions: [u32; 2],
    /// Soft maximum encoded size in bytes per image.
    pub max_bytes: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dimensions: [1200, 1200],
            max_bytes: 250 * 1024,
        }
    }
}

/// Quality search bounds and probing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub min: u8,
    pub max: u8,
    pub start: u8,
    pub step: u8,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min: 1,
            max: 95,
            start: 85,
            step: 5,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Load `config.toml` from a directory, validated.
///
/// Returns stock defaults when the file does not exist.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let config_path = dir.join("config.toml");
    let config: Config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        Config::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# squarepack Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file in the source
# directory (next to the images). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Final crop dimensions as [width, height]. Every processed image is scaled
# to cover this area and center-cropped to exactly these dimensions.
dimensions = [1200, 1200]

# Soft byte budget per encoded image (default 250 KiB). The quality search
# picks the highest JPEG quality whose output fits. When even the lowest
# quality is too large, the lowest-quality result is written anyway and the
# status line reports the overshoot.
max_bytes = 256000

# ---------------------------------------------------------------------------
# Quality search
# ---------------------------------------------------------------------------
[quality]
# Closed quality range the search may use.
min = 1
max = 95

# First quality probed. If the result already fits the budget, the search
# walks upward from here in `step` increments instead of binary searching.
start = 85
step = 5

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel workers. Omit for auto (one per CPU core).
# Each worker holds one decoded image plus one encode buffer in memory, so
# lower this on memory-constrained machines.
#max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.output.dimensions, [1200, 1200]);
        assert_eq!(config.output.max_bytes, 256_000);
        assert_eq!(config.quality.min, 1);
        assert_eq!(config.quality.max, 95);
        assert_eq!(config.quality.start, 85);
        assert_eq!(config.quality.step, 5);
        assert_eq!(config.processing.max_processes, None);
        config.validate().unwrap();
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output.dimensions, [1200, 1200]);
    }

    #[test]
    fn load_config_reads_partial_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[output]
dimensions = [800, 600]

[quality]
max = 90
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output.dimensions, [800, 600]);
        assert_eq!(config.output.max_bytes, 256_000);
        assert_eq!(config.quality.max, 90);
        assert_eq!(config.quality.min, 1);
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[output]\ndimension = [800, 600]\n",
        )
        .unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_rejects_zero_dimension() {
        let mut config = Config::default();
        config.output.dimensions = [0, 1200];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_inverted_quality_range() {
        let mut config = Config::default();
        config.quality.min = 90;
        config.quality.max = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_step() {
        let mut config = Config::default();
        config.quality.step = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_quality_above_100() {
        let mut config = Config::default();
        config.quality.start = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn stock_config_parses_and_validates() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.output.dimensions, [1200, 1200]);
    }

    #[test]
    fn encode_options_mirror_quality_section() {
        let mut config = Config::default();
        config.quality.min = 10;
        config.quality.max = 80;
        config.quality.start = 60;
        config.output.max_bytes = 1000;

        let opts = config.encode_options();
        assert_eq!(opts.max_bytes, 1000);
        assert_eq!(opts.range, QualityRange::new(10, 80));
        assert_eq!(opts.start.value(), 60);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism().unwrap().get();
        assert_eq!(
            effective_threads(&ProcessingConfig {
                max_processes: Some(1)
            }),
            1
        );
        assert_eq!(
            effective_threads(&ProcessingConfig {
                max_processes: Some(10_000)
            }),
            cores
        );
        assert_eq!(
            effective_threads(&ProcessingConfig {
                max_processes: None
            }),
            cores
        );
    }
}
