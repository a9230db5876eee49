#![warn(missing_docs)]
//! Veribench Logic - Verification and Case Contracts
//!
//! This crate defines the verification side of the harness:
//! - The [`Workload`] trait every candidate and reference implements
//! - The [`DocValue`] result model (scalars and nested sequences)
//! - The recursive structural [`diff`] with typed [`Mismatch`] diagnostics
//! - The per-case error taxonomy ([`CaseError`]) and status

mod case;
mod diff;

pub use case::{CaseError, CaseStatus, Workload};
pub use diff::{DocValue, Mismatch, diff};
