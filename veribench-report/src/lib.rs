#![warn(missing_docs)]
//! Veribench Report - Output Generation
//!
//! Generates the harness's output surfaces:
//! - JSON (machine-readable, full schema)
//! - Human-readable terminal output
//! - The fixed-width best-of summary label consumed by downstream tooling

mod human;
mod json;
mod label;
mod report;

pub use human::format_human_output;
pub use json::generate_json_report;
pub use label::format_best_label;
pub use report::{CaseReport, Report, ReportMeta, ReportSummary, SystemInfo};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
