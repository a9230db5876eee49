#![warn(missing_docs)]
//! # Veribench
//!
//! Micro-benchmark harness for document-processing implementations that
//! verifies correctness before measuring speed:
//! - **Structural Verification**: a candidate's result is diffed against a
//!   trusted reference recursively, with actionable mismatch diagnostics
//! - **Best-of-N Sampling**: every timed iteration becomes one sample; the
//!   fastest sample drives the headline throughput metrics
//! - **Hardware Counters**: instructions, cycles, branch and cache misses
//!   per trial via Linux perf events, degrading to timing-only elsewhere
//! - **Derived Metrics**: a fixed table of throughput and efficiency ratios
//!   normalized by input bytes and logical item count
//!
//! ## Quick Start
//!
//! ```ignore
//! use veribench::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let input = std::fs::read("data/numbers.txt")?;
//!     let cases = vec![CaseDef::new(
//!         "count/numbers",
//!         "count",
//!         input,
//!         || Box::new(FastCounter::default()) as Box<dyn Workload>,
//!         || Box::new(NaiveCounter::default()) as Box<dyn Workload>,
//!     )];
//!     veribench::run(cases)
//! }
//! ```

// Re-export core types
pub use veribench_core::{
    derive_metrics, pin_to_cpu, EventAggregate, EventCollector, HwCounters, Metric, MetricKind,
    Sample, Trial,
};

// Re-export logic types
pub use veribench_logic::{diff, CaseError, CaseStatus, DocValue, Mismatch, Workload};

// Re-export report types
pub use veribench_report::{
    format_best_label, format_human_output, generate_json_report, CaseReport, OutputFormat,
    Report, ReportMeta, ReportSummary, SystemInfo,
};

// Re-export driver types
pub use veribench_cli::{
    build_report, run_case, run_suite, CaseDef, CaseOutcome, TrialPlan, VeriConfig,
    WorkloadFactory,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        diff, CaseDef, CaseStatus, DocValue, EventAggregate, EventCollector, Mismatch, Sample,
        TrialPlan, Workload,
    };
}

/// Run the Veribench CLI harness.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     veribench::run(cases)
/// }
/// ```
pub use veribench_cli::run;
