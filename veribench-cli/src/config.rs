//! Configuration loading from veribench.toml
//!
//! Veribench configuration can be specified in a `veribench.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Veribench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VeriConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for case execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Measurement time budget per case (e.g., "5s")
    #[serde(default = "default_measurement")]
    pub measurement_time: String,
    /// Fixed sample count: run exactly N timed iterations per case
    #[serde(default)]
    pub samples: Option<u64>,
    /// Minimum number of timed iterations
    #[serde(default)]
    pub min_iterations: Option<u64>,
    /// Maximum number of timed iterations
    #[serde(default)]
    pub max_iterations: Option<u64>,
    /// Pin the run to a single CPU
    #[serde(default)]
    pub pin_cpu: Option<usize>,
    /// Number of threads for parallel case execution
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            measurement_time: default_measurement(),
            samples: None,
            min_iterations: None,
            max_iterations: None,
            pin_cpu: None,
            threads: None,
        }
    }
}

fn default_measurement() -> String {
    "5s".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl VeriConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("veribench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Veribench Configuration

[runner]
# Measurement time budget per case
measurement_time = "5s"
# Fixed sample count: run exactly N timed iterations (uncomment to enable)
# samples = 5
# Minimum timed iterations (uncomment to enable)
# min_iterations = 100
# Maximum timed iterations (uncomment to enable)
# max_iterations = 1000000
# Pin the run to a single CPU (uncomment to enable)
# pin_cpu = 0
# Threads for parallel case execution (uncomment to enable)
# threads = 4

[output]
# Default output format: human or json
format = "human"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}
