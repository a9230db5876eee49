//! Output Formatting
//!
//! Human-readable output formatting for case reports.
//!
//! Generates terminal-friendly output with:
//! - Grouped case results with status icons (✓/⊘)
//! - Best-of throughput and rate metrics
//! - Hardware counter ratios when available
//! - Per-case best-of summary labels

use crate::report::{CaseReport, Report};
use veribench_logic::CaseStatus;

/// Format a report for human-readable terminal display
///
/// # Arguments
/// * `report` - Complete suite report
///
/// # Returns
/// Formatted string suitable for terminal output
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Veribench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    // Group results
    let mut groups: std::collections::BTreeMap<&str, Vec<&CaseReport>> =
        std::collections::BTreeMap::new();
    for case in &report.cases {
        groups.entry(&case.group).or_default().push(case);
    }

    for (group, cases) in groups {
        output.push_str(&format!("Group: {}\n", group));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for case in cases {
            let status_icon = match case.status {
                CaseStatus::Done => "✓",
                CaseStatus::Skipped => "⊘",
            };

            output.push_str(&format!("  {} {}\n", status_icon, case.id));

            if !case.metrics.is_empty() {
                if let (Some(gbs), Some(docs)) = (
                    metric_value(case, "best_bytes_per_sec"),
                    metric_value(case, "best_docs_per_sec"),
                ) {
                    output.push_str(&format!(
                        "      best: {:.3} GB/s  {:.0} docs/s\n",
                        gbs / 1_000_000_000.0,
                        docs
                    ));
                }
                output.push_str(&format!(
                    "      bytes: {}  items: {}  iterations: {}\n",
                    case.bytes, case.items, case.iterations
                ));
                // Counter ratios only appear when the kernel granted the event
                // group. `frequency` is raw mean cycles (the reporting rate is
                // applied downstream); `best_frequency` is already cycles per
                // second, so it is the one rendered as a clock.
                if case.hardware_events {
                    if let (Some(ipc), Some(ipb), Some(clock)) = (
                        metric_value(case, "instructions_per_cycle"),
                        metric_value(case, "instructions_per_byte"),
                        metric_value(case, "best_frequency"),
                    ) {
                        output.push_str(&format!(
                            "      {:.2} insn/cycle  {:.2} insn/byte  {:.2} GHz\n",
                            ipc,
                            ipb,
                            clock / 1_000_000_000.0
                        ));
                    }
                }
            }

            if let Some(label) = &case.label {
                output.push_str(&format!("      {}\n", label));
            }

            if let Some(failure) = &case.failure {
                output.push_str(&format!("      error: {}\n", failure));
            }

            output.push('\n');
        }
    }

    // Summary
    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Completed: {}  Skipped: {}\n",
        report.summary.total_cases, report.summary.completed, report.summary.skipped
    ));
    output.push_str(&format!(
        "  Duration: {:.2} ms\n",
        report.summary.total_duration_ms
    ));

    output
}

fn metric_value(case: &CaseReport, name: &str) -> Option<f64> {
    case.metrics
        .iter()
        .find(|m| m.name == name)
        .map(|m| m.value)
}
