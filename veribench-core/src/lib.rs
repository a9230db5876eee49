#![warn(missing_docs)]
//! Veribench Core - Measurement Runtime
//!
//! This crate provides the measurement side of the harness:
//! - `EventCollector` for per-trial wall-clock and hardware-counter samples
//!   (Linux perf events with a timing-only fallback)
//! - `EventAggregate` for best-of tracking and running totals across trials
//! - Derived metric computation (throughput, per-byte and per-cycle ratios)
//! - CPU affinity pinning for stable measurements

mod aggregate;
mod collector;
mod metrics;

pub use aggregate::EventAggregate;
pub use collector::{EventCollector, HwCounters, Sample, Trial, pin_to_cpu};
pub use metrics::{Metric, MetricKind, derive_metrics};
