//! Case Driver
//!
//! Executes one benchmark case through its phases: a warmup run of the
//! candidate, a reference run plus structural verification, then the timed
//! loop feeding samples into an [`EventAggregate`]. Any phase failure
//! abandons the case with its skip message and the suite continues.
//!
//! Cases execute in parallel via rayon; each case owns its collector and
//! aggregate, so there is no cross-case shared mutable state.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use veribench_core::{derive_metrics, EventAggregate, EventCollector, Metric};
use veribench_logic::{diff, CaseError, CaseStatus, Workload};
use veribench_report::{format_best_label, CaseReport, Report, ReportMeta, ReportSummary};

/// Factory producing a fresh workload instance for one case.
pub type WorkloadFactory = Box<dyn Fn() -> Box<dyn Workload> + Send + Sync>;

/// One benchmark case: an input document plus candidate and reference
/// implementations.
pub struct CaseDef {
    /// Case identifier, unique within the suite
    pub id: String,
    /// Group this case belongs to
    pub group: String,
    /// Input document, shared across iterations
    pub input: Arc<[u8]>,
    /// Implementation under measurement
    pub candidate: WorkloadFactory,
    /// Trusted implementation the candidate is verified against
    pub reference: WorkloadFactory,
}

impl CaseDef {
    /// Build a case from workload factory closures.
    pub fn new<C, R>(
        id: impl Into<String>,
        group: impl Into<String>,
        input: impl Into<Arc<[u8]>>,
        candidate: C,
        reference: R,
    ) -> Self
    where
        C: Fn() -> Box<dyn Workload> + Send + Sync + 'static,
        R: Fn() -> Box<dyn Workload> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            group: group.into(),
            input: input.into(),
            candidate: Box::new(candidate),
            reference: Box::new(reference),
        }
    }
}

/// Trial-count policy for the timed loop.
///
/// `samples` wins when set: exactly that many timed iterations run. Otherwise
/// the loop runs at least `min_iterations`, then continues until the time
/// budget or `max_iterations` is reached.
#[derive(Debug, Clone, Copy)]
pub struct TrialPlan {
    /// Fixed iteration count, overriding the time budget
    pub samples: Option<u64>,
    /// Minimum timed iterations
    pub min_iterations: u64,
    /// Optional cap on timed iterations
    pub max_iterations: Option<u64>,
    /// Time budget for the timed loop in nanoseconds
    pub measurement_time_ns: u64,
}

impl Default for TrialPlan {
    fn default() -> Self {
        Self {
            samples: None,
            min_iterations: 1,
            max_iterations: None,
            measurement_time_ns: 5_000_000_000,
        }
    }
}

impl TrialPlan {
    fn wants_more(&self, iterations: u64, loop_started: Instant) -> bool {
        if let Some(n) = self.samples {
            return iterations < n;
        }
        if iterations < self.min_iterations {
            return true;
        }
        if let Some(max) = self.max_iterations {
            if iterations >= max {
                return false;
            }
        }
        (loop_started.elapsed().as_nanos() as u64) < self.measurement_time_ns
    }
}

/// Terminal result of driving one case.
#[derive(Debug)]
pub struct CaseOutcome {
    /// Case identifier
    pub id: String,
    /// Group this case belongs to
    pub group: String,
    /// Terminal state
    pub status: CaseStatus,
    /// Why the case was abandoned, when it was
    pub error: Option<CaseError>,
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
    /// Wall-clock duration of the whole case in nanoseconds
    pub duration_ns: u64,
}

struct CompletedCase {
    items: u64,
    iterations: u64,
    hardware_events: bool,
    agg: EventAggregate,
}

/// Drive one case through warmup, verification, and the timed loop.
pub fn run_case(case: &CaseDef, plan: &TrialPlan) -> CaseOutcome {
    let started = Instant::now();
    let bytes = case.input.len() as u64;

    match drive(case, plan) {
        Ok(done) => {
            let metrics = derive_metrics(&done.agg, bytes, done.items);
            let label = format_best_label(&done.agg, bytes, done.items);
            CaseOutcome {
                id: case.id.clone(),
                group: case.group.clone(),
                status: CaseStatus::Done,
                error: None,
                bytes,
                items: done.items,
                iterations: done.iterations,
                hardware_events: done.hardware_events,
                metrics,
                label,
                duration_ns: started.elapsed().as_nanos() as u64,
            }
        }
        Err(error) => CaseOutcome {
            id: case.id.clone(),
            group: case.group.clone(),
            status: CaseStatus::Skipped,
            error: Some(error),
            bytes,
            items: 0,
            iterations: 0,
            hardware_events: false,
            metrics: Vec::new(),
            label: None,
            duration_ns: started.elapsed().as_nanos() as u64,
        },
    }
}

fn drive(case: &CaseDef, plan: &TrialPlan) -> Result<CompletedCase, CaseError> {
    let mut candidate = (case.candidate)();

    // Warmup: one untimed run, also populates the candidate's result
    if !candidate.run(&case.input) {
        return Err(CaseError::WarmupRun);
    }

    let mut reference = (case.reference)();
    if !reference.run(&case.input) {
        return Err(CaseError::ReferenceRun);
    }

    diff(&candidate.result(), &reference.result())?;

    let items = candidate.item_count();
    let mut collector = EventCollector::new();
    let hardware_events = collector.has_hardware_events();
    let mut agg = EventAggregate::new();
    let mut iterations = 0u64;
    let loop_started = Instant::now();

    while plan.wants_more(iterations, loop_started) {
        let trial = collector.start();
        if !candidate.run(&case.input) {
            // Trial guard disables the counters on drop
            return Err(CaseError::TimedRun);
        }
        agg.feed(trial.end());
        iterations += 1;
    }

    Ok(CompletedCase {
        items,
        iterations,
        hardware_events,
        agg,
    })
}

/// Run every case, in parallel, with a progress bar across the suite.
///
/// Outcomes come back in case order regardless of scheduling.
pub fn run_suite(cases: &[CaseDef], plan: &TrialPlan, show_progress: bool) -> Vec<CaseOutcome> {
    let pb = if show_progress {
        ProgressBar::new(cases.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let outcomes: Vec<CaseOutcome> = cases
        .par_iter()
        .map(|case| {
            pb.set_message(case.id.clone());
            let outcome = run_case(case, plan);
            match &outcome.error {
                Some(error) => {
                    tracing::warn!(case = %outcome.id, %error, "case skipped");
                }
                None => {
                    tracing::debug!(
                        case = %outcome.id,
                        iterations = outcome.iterations,
                        "case complete"
                    );
                }
            }
            pb.inc(1);
            outcome
        })
        .collect();

    pb.finish_with_message("Complete");
    outcomes
}

/// Assemble the suite report from case outcomes.
pub fn build_report(outcomes: &[CaseOutcome], total_duration_ms: f64) -> Report {
    let cases: Vec<CaseReport> = outcomes
        .iter()
        .map(|o| CaseReport {
            id: o.id.clone(),
            group: o.group.clone(),
            status: o.status,
            bytes: o.bytes,
            items: o.items,
            iterations: o.iterations,
            hardware_events: o.hardware_events,
            metrics: o.metrics.clone(),
            label: o.label.clone(),
            failure: o.error.as_ref().map(|e| e.to_string()),
        })
        .collect();

    let completed = outcomes
        .iter()
        .filter(|o| o.status == CaseStatus::Done)
        .count();

    Report {
        meta: ReportMeta::collect(),
        summary: ReportSummary {
            total_cases: cases.len(),
            completed,
            skipped: cases.len() - completed,
            total_duration_ms,
        },
        cases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veribench_logic::DocValue;

    /// Workload that succeeds for the first `fail_after` runs, then fails.
    /// `fail_after == None` never fails.
    struct Scripted {
        value: DocValue,
        items: u64,
        fail_after: Option<u64>,
        runs: u64,
    }

    impl Scripted {
        fn factory(value: DocValue, items: u64, fail_after: Option<u64>) -> WorkloadFactory {
            Box::new(move || {
                Box::new(Scripted {
                    value: value.clone(),
                    items,
                    fail_after,
                    runs: 0,
                })
            })
        }
    }

    impl Workload for Scripted {
        fn run(&mut self, _input: &[u8]) -> bool {
            self.runs += 1;
            match self.fail_after {
                Some(n) => self.runs <= n,
                None => true,
            }
        }

        fn result(&self) -> DocValue {
            self.value.clone()
        }

        fn item_count(&self) -> u64 {
            self.items
        }
    }

    fn fixed_plan(samples: u64) -> TrialPlan {
        TrialPlan {
            samples: Some(samples),
            ..Default::default()
        }
    }

    fn case_with(candidate: WorkloadFactory, reference: WorkloadFactory) -> CaseDef {
        CaseDef {
            id: "count/ints".to_string(),
            group: "count".to_string(),
            input: Arc::from(&b"1 2 3"[..]),
            candidate,
            reference,
        }
    }

    #[test]
    fn test_fixed_sample_count_runs_exactly_n_iterations() {
        let value = DocValue::from(vec![1u64, 2, 3]);
        let case = case_with(
            Scripted::factory(value.clone(), 3, None),
            Scripted::factory(value, 3, None),
        );

        let outcome = run_case(&case, &fixed_plan(4));
        assert_eq!(outcome.status, CaseStatus::Done);
        assert_eq!(outcome.iterations, 4);
        assert_eq!(outcome.items, 3);
        assert_eq!(outcome.bytes, 5);
        assert!(!outcome.metrics.is_empty());
        assert!(outcome.label.is_some());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_warmup_failure_skips_before_verification() {
        let value = DocValue::from(7u64);
        let case = case_with(
            Scripted::factory(value.clone(), 1, Some(0)),
            Scripted::factory(value, 1, None),
        );

        let outcome = run_case(&case, &fixed_plan(4));
        assert_eq!(outcome.status, CaseStatus::Skipped);
        assert_eq!(outcome.error, Some(CaseError::WarmupRun));
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.metrics.is_empty());
        assert!(outcome.label.is_none());
    }

    #[test]
    fn test_reference_failure_message() {
        let value = DocValue::from(7u64);
        let case = case_with(
            Scripted::factory(value.clone(), 1, None),
            Scripted::factory(value, 1, Some(0)),
        );

        let outcome = run_case(&case, &fixed_plan(4));
        assert_eq!(outcome.error, Some(CaseError::ReferenceRun));
        assert_eq!(
            outcome.error.unwrap().to_string(),
            "reference document reading failed"
        );
    }

    #[test]
    fn test_mismatch_skips_with_diagnostic() {
        let case = case_with(
            Scripted::factory(DocValue::from(vec![1u64, 2]), 2, None),
            Scripted::factory(DocValue::from(vec![1u64, 3]), 2, None),
        );

        let outcome = run_case(&case, &fixed_plan(4));
        assert_eq!(outcome.status, CaseStatus::Skipped);
        let error = outcome.error.unwrap();
        assert!(error.is_verification());
        assert_eq!(error.to_string(), "result incorrect: 2 ... reference: 3");
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_timed_run_failure_abandons_remaining_iterations() {
        let value = DocValue::from(7u64);
        // Warmup succeeds (run #1), first timed run (run #2) fails.
        let case = case_with(
            Scripted::factory(value.clone(), 1, Some(1)),
            Scripted::factory(value, 1, None),
        );

        let outcome = run_case(&case, &fixed_plan(10));
        assert_eq!(outcome.status, CaseStatus::Skipped);
        assert_eq!(outcome.error, Some(CaseError::TimedRun));
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.metrics.is_empty());
    }

    #[test]
    fn test_min_iterations_override_time_budget() {
        let value = DocValue::from(1u64);
        let case = case_with(
            Scripted::factory(value.clone(), 1, None),
            Scripted::factory(value, 1, None),
        );

        // Zero time budget: the loop still honors the minimum.
        let plan = TrialPlan {
            samples: None,
            min_iterations: 3,
            max_iterations: Some(3),
            measurement_time_ns: 0,
        };
        let outcome = run_case(&case, &plan);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn test_suite_preserves_case_order_and_continues_past_skips() {
        let good = DocValue::from(1u64);
        let cases = vec![
            CaseDef {
                id: "a".to_string(),
                group: "g".to_string(),
                input: Arc::from(&b"x"[..]),
                candidate: Scripted::factory(good.clone(), 1, Some(0)),
                reference: Scripted::factory(good.clone(), 1, None),
            },
            CaseDef {
                id: "b".to_string(),
                group: "g".to_string(),
                input: Arc::from(&b"x"[..]),
                candidate: Scripted::factory(good.clone(), 1, None),
                reference: Scripted::factory(good, 1, None),
            },
        ];

        let outcomes = run_suite(&cases, &fixed_plan(2), false);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].id, "a");
        assert_eq!(outcomes[0].status, CaseStatus::Skipped);
        assert_eq!(outcomes[1].id, "b");
        assert_eq!(outcomes[1].status, CaseStatus::Done);

        let report = build_report(&outcomes, 1.0);
        assert_eq!(report.summary.total_cases, 2);
        assert_eq!(report.summary.completed, 1);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(
            report.cases[0].failure.as_deref(),
            Some("warmup document reading failed")
        );
    }
}
