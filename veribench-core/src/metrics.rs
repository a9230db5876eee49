//! Derived Metrics
//!
//! Computes the fixed metric table for one benchmark case from an
//! [`EventAggregate`] plus the two externally supplied normalization bases
//! (input size in bytes, logical item count). Metrics are purely derived and
//! recomputed on demand; deriving twice from the same aggregate yields
//! identical results.
//!
//! Preconditions: `bytes > 0`, and non-zero best cycles when hardware
//! counters are present. Division by zero is a caller error, not handled.

use crate::aggregate::EventAggregate;
use serde::{Deserialize, Serialize};

/// How the reporting layer should interpret a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Plain numeric value.
    Value,
    /// A per-iteration rate that does not scale with the iteration count
    /// (e.g., one document per run regardless of how many runs occurred).
    IterationInvariantRate,
}

/// A single named metric in the report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name, stable for downstream tooling
    pub name: String,
    /// Numeric value
    pub value: f64,
    /// Interpretation hint for the reporting layer
    pub kind: MetricKind,
}

impl Metric {
    /// Plain numeric metric.
    pub fn value(name: &str, value: f64) -> Metric {
        Metric {
            name: name.to_string(),
            value,
            kind: MetricKind::Value,
        }
    }

    /// Iteration-invariant rate metric.
    pub fn invariant_rate(name: &str, value: f64) -> Metric {
        Metric {
            name: name.to_string(),
            value,
            kind: MetricKind::IterationInvariantRate,
        }
    }
}

/// Derive the full metric table from an aggregate and its bases.
///
/// Hardware-counter metrics appear only when every sample carried counters.
/// Returns an empty table for an aggregate that has seen no samples.
pub fn derive_metrics(agg: &EventAggregate, bytes: u64, items: u64) -> Vec<Metric> {
    let Some(best) = agg.best() else {
        return Vec::new();
    };

    let best_elapsed = best.elapsed_sec();
    let mut metrics = vec![
        Metric::value("best_bytes_per_sec", bytes as f64 / best_elapsed),
        Metric::value("best_items_per_sec", items as f64 / best_elapsed),
        Metric::invariant_rate("docs_per_sec", 1.0),
        Metric::value("best_docs_per_sec", 1.0 / best_elapsed),
    ];

    if let (true, Some(counters)) = (agg.has_hardware_counters(), best.counters) {
        metrics.push(Metric::value("instructions", agg.instructions()));
        metrics.push(Metric::value("cycles", agg.cycles()));
        metrics.push(Metric::value("branch_miss", agg.branch_misses()));
        metrics.push(Metric::value("cache_miss", agg.cache_misses()));
        metrics.push(Metric::value("cache_ref", agg.cache_references()));

        metrics.push(Metric::value(
            "instructions_per_byte",
            agg.instructions() / bytes as f64,
        ));
        metrics.push(Metric::value(
            "instructions_per_cycle",
            agg.instructions() / agg.cycles(),
        ));
        metrics.push(Metric::value("cycles_per_byte", agg.cycles() / bytes as f64));
        metrics.push(Metric::invariant_rate("frequency", agg.cycles()));

        // Best-sample mirrors, computed from the fastest trial alone.
        let best_instructions = counters.instructions as f64;
        let best_cycles = counters.cycles as f64;
        metrics.push(Metric::value("best_instructions", best_instructions));
        metrics.push(Metric::value("best_cycles", best_cycles));
        metrics.push(Metric::value("best_branch_miss", counters.branch_misses as f64));
        metrics.push(Metric::value("best_cache_miss", counters.cache_misses as f64));
        metrics.push(Metric::value("best_cache_ref", counters.cache_references as f64));

        metrics.push(Metric::value(
            "best_instructions_per_byte",
            best_instructions / bytes as f64,
        ));
        metrics.push(Metric::value(
            "best_instructions_per_cycle",
            best_instructions / best_cycles,
        ));
        metrics.push(Metric::value("best_cycles_per_byte", best_cycles / bytes as f64));
        metrics.push(Metric::value("best_frequency", best_cycles / best_elapsed));
    }

    metrics.push(Metric::value("bytes", bytes as f64));
    metrics.push(Metric::value("items", items as f64));

    metrics
}
