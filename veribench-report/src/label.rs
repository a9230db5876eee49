//! Best-Of Summary Label
//!
//! One line per case, columnar: best throughput in GB/s (two decimals), best
//! document rate, hardware counters from the best trial when available, item
//! count, and average elapsed time in nanoseconds. Field widths are fixed so
//! existing tooling can parse the lines; do not change them.

use veribench_core::EventAggregate;

/// Render the best-of label for a finished case.
///
/// Returns `None` when the aggregate has seen no samples.
pub fn format_best_label(agg: &EventAggregate, bytes: u64, items: u64) -> Option<String> {
    let best = agg.best()?;
    let best_elapsed = best.elapsed_sec();

    let mut label = String::from("[best:");
    label.push_str(&format!(
        " throughput={:>6.2} GB/s",
        bytes as f64 / 1_000_000_000.0 / best_elapsed
    ));
    label.push_str(&format!(
        " doc_throughput={:>6} docs/s",
        (1.0 / best_elapsed) as u64
    ));

    if let Some(counters) = best.counters {
        label.push_str(&format!(" instructions={:>12}", counters.instructions));
        label.push_str(&format!(" cycles={:>12}", counters.cycles));
        label.push_str(&format!(" branch_miss={:>8}", counters.branch_misses));
        label.push_str(&format!(" cache_miss={:>8}", counters.cache_misses));
        label.push_str(&format!(" cache_ref={:>10}", counters.cache_references));
    }

    label.push_str(&format!(" items={:>10}", items));
    label.push_str(&format!(" avg_time={:>10} ns", agg.mean_elapsed_ns() as u64));
    label.push(']');

    Some(label)
}
