//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veribench_core::Metric;
use veribench_logic::CaseStatus;

/// Complete suite report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// Per-case results in execution order
    pub cases: Vec<CaseReport>,
    /// Suite totals
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Schema version for downstream parsers
    pub schema_version: u32,
    /// Harness version
    pub version: String,
    /// Run timestamp
    pub timestamp: DateTime<Utc>,
    /// Host information
    pub system: SystemInfo,
}

impl ReportMeta {
    /// Metadata for a run starting now on this host.
    pub fn collect() -> Self {
        Self {
            schema_version: 1,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system: SystemInfo::collect(),
        }
    }
}

/// Host information captured in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// CPU model string
    pub cpu: String,
    /// Number of logical CPUs
    pub cpu_cores: u32,
}

impl SystemInfo {
    /// Probe the current host.
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            cpu: cpu_model_string(),
            cpu_cores: std::thread::available_parallelism()
                .map(|p| p.get() as u32)
                .unwrap_or(1),
        }
    }
}

fn cpu_model_string() -> String {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("model name"))
                    .and_then(|line| line.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }

    #[cfg(not(target_os = "linux"))]
    {
        "Unknown CPU".to_string()
    }
}

/// Result of one benchmark case in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case identifier
    pub id: String,
    /// Group this case belongs to
    pub group: String,
    /// Terminal state
    pub status: CaseStatus,
    /// Input size in bytes
    pub bytes: u64,
    /// Logical item count reported by the candidate
    pub items: u64,
    /// Timed iterations executed
    pub iterations: u64,
    /// Whether hardware counters were collected
    pub hardware_events: bool,
    /// Derived metric table (empty for skipped cases)
    pub metrics: Vec<Metric>,
    /// Fixed-width best-of summary line
    pub label: Option<String>,
    /// Skip message for abandoned cases
    pub failure: Option<String>,
}

/// Suite totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of cases in the suite
    pub total_cases: usize,
    /// Cases that completed with metrics
    pub completed: usize,
    /// Cases abandoned with a failure message
    pub skipped: usize,
    /// Wall-clock duration of the whole run in milliseconds
    pub total_duration_ms: f64,
}
