//! Case Contract
//!
//! The workload interface every candidate and reference implementation
//! satisfies, plus the error taxonomy for one benchmark case. All case
//! errors are recovered at the case boundary: the case is skipped with its
//! message and the suite continues.

use crate::diff::Mismatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A document-processing implementation under measurement.
///
/// `run` processes the input document and reports success; `result` is read
/// only after a successful run. `item_count` is the logical item total used
/// as a normalization base for derived metrics.
pub trait Workload {
    /// Process the input document. Returns `false` on failure.
    fn run(&mut self, input: &[u8]) -> bool;

    /// The result of the most recent successful run.
    fn result(&self) -> crate::DocValue;

    /// Number of logical items the workload processed.
    fn item_count(&self) -> u64;
}

/// Why a benchmark case was abandoned.
///
/// Each variant renders the exact message reported to the suite; run
/// failures in different phases are distinguished so the report can tell a
/// broken warmup from a broken timed iteration.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseError {
    /// The candidate's warmup run failed before any verification.
    #[error("warmup document reading failed")]
    WarmupRun,
    /// The reference implementation's run failed.
    #[error("reference document reading failed")]
    ReferenceRun,
    /// The candidate failed inside the timed loop; remaining iterations are
    /// abandoned.
    #[error("document reading failed")]
    TimedRun,
    /// The candidate's result diverged from the reference.
    #[error(transparent)]
    Verification(#[from] Mismatch),
}

impl CaseError {
    /// Whether this is a verification mismatch rather than a run failure.
    pub fn is_verification(&self) -> bool {
        matches!(self, CaseError::Verification(_))
    }
}

/// Terminal state of one benchmark case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// All phases completed and metrics were derived.
    Done,
    /// The case was abandoned with a [`CaseError`].
    Skipped,
}
