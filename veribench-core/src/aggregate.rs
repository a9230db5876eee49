//! Sample Aggregation
//!
//! Reduces the stream of per-trial samples for one benchmark case into the
//! single fastest sample plus running totals. Aggregate counter figures are
//! reported as means across samples, matching the elapsed-time average.

use crate::collector::Sample;
use std::time::Duration;

/// Accumulated state over all samples of one benchmark case.
///
/// Invariant: after N samples fed, `count() == N` and `best()` is the sample
/// with minimum elapsed time among the N; on ties the first-seen sample wins.
#[derive(Debug, Clone, Default)]
pub struct EventAggregate {
    count: u64,
    elapsed_sum: Duration,
    instructions_sum: u64,
    cycles_sum: u64,
    branch_misses_sum: u64,
    cache_misses_sum: u64,
    cache_references_sum: u64,
    counter_samples: u64,
    best: Option<Sample>,
}

impl EventAggregate {
    /// Fresh aggregate for a new case.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one trial's sample: bump the count, add the totals, and take
    /// over as best on strict elapsed-time improvement.
    pub fn feed(&mut self, sample: Sample) {
        self.count += 1;
        self.elapsed_sum += sample.elapsed;

        if let Some(counters) = &sample.counters {
            self.counter_samples += 1;
            self.instructions_sum += counters.instructions;
            self.cycles_sum += counters.cycles;
            self.branch_misses_sum += counters.branch_misses;
            self.cache_misses_sum += counters.cache_misses;
            self.cache_references_sum += counters.cache_references;
        }

        let improved = match &self.best {
            Some(best) => sample.elapsed < best.elapsed,
            None => true,
        };
        if improved {
            self.best = Some(sample);
        }
    }

    /// Number of samples fed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether no samples have been fed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The fastest sample seen so far.
    pub fn best(&self) -> Option<&Sample> {
        self.best.as_ref()
    }

    /// Whether every sample so far carried hardware counters.
    pub fn has_hardware_counters(&self) -> bool {
        self.count > 0 && self.counter_samples == self.count
    }

    /// Mean elapsed time in seconds across all samples.
    pub fn mean_elapsed_sec(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.elapsed_sum.as_secs_f64() / self.count as f64
    }

    /// Mean elapsed time in nanoseconds across all samples.
    pub fn mean_elapsed_ns(&self) -> f64 {
        self.mean_elapsed_sec() * 1e9
    }

    /// Mean instructions retired per trial.
    pub fn instructions(&self) -> f64 {
        self.counter_mean(self.instructions_sum)
    }

    /// Mean CPU cycles per trial.
    pub fn cycles(&self) -> f64 {
        self.counter_mean(self.cycles_sum)
    }

    /// Mean branch mispredictions per trial.
    pub fn branch_misses(&self) -> f64 {
        self.counter_mean(self.branch_misses_sum)
    }

    /// Mean cache misses per trial.
    pub fn cache_misses(&self) -> f64 {
        self.counter_mean(self.cache_misses_sum)
    }

    /// Mean cache references per trial.
    pub fn cache_references(&self) -> f64 {
        self.counter_mean(self.cache_references_sum)
    }

    fn counter_mean(&self, sum: u64) -> f64 {
        if self.counter_samples == 0 {
            return 0.0;
        }
        sum as f64 / self.counter_samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::HwCounters;

    fn timing_sample(secs: f64) -> Sample {
        Sample::timing_only(Duration::from_secs_f64(secs))
    }

    fn counter_sample(secs: f64, instructions: u64, cycles: u64) -> Sample {
        Sample {
            elapsed: Duration::from_secs_f64(secs),
            counters: Some(HwCounters {
                instructions,
                cycles,
                branch_misses: 10,
                cache_misses: 20,
                cache_references: 30,
            }),
        }
    }

    #[test]
    fn test_best_of_tracking() {
        let mut agg = EventAggregate::new();
        for secs in [5.0, 3.0, 7.0, 3.0] {
            agg.feed(timing_sample(secs));
        }

        assert_eq!(agg.count(), 4);
        let best = agg.best().unwrap();
        assert!((best.elapsed_sec() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_break_keeps_first_seen() {
        let mut agg = EventAggregate::new();
        agg.feed(counter_sample(3.0, 100, 200));
        agg.feed(counter_sample(3.0, 999, 999));

        // Strict improvement only: the second 3.0s sample does not replace.
        let best = agg.best().unwrap();
        assert_eq!(best.counters.unwrap().instructions, 100);
    }

    #[test]
    fn test_mean_elapsed() {
        let mut agg = EventAggregate::new();
        agg.feed(timing_sample(1.0));
        agg.feed(timing_sample(3.0));

        assert!((agg.mean_elapsed_sec() - 2.0).abs() < 1e-9);
        assert!((agg.mean_elapsed_ns() - 2e9).abs() < 1.0);
    }

    #[test]
    fn test_counter_means() {
        let mut agg = EventAggregate::new();
        agg.feed(counter_sample(1.0, 100, 400));
        agg.feed(counter_sample(1.0, 300, 600));

        assert!(agg.has_hardware_counters());
        assert!((agg.instructions() - 200.0).abs() < 1e-9);
        assert!((agg.cycles() - 500.0).abs() < 1e-9);
        assert!((agg.branch_misses() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_aggregate() {
        let agg = EventAggregate::new();
        assert!(agg.is_empty());
        assert!(agg.best().is_none());
        assert!(!agg.has_hardware_counters());
        assert_eq!(agg.mean_elapsed_sec(), 0.0);
    }

    #[test]
    fn test_timing_only_samples_have_no_counters() {
        let mut agg = EventAggregate::new();
        agg.feed(timing_sample(1.0));
        assert!(!agg.has_hardware_counters());
        assert_eq!(agg.instructions(), 0.0);
    }
}
