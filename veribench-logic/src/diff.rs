//! Structural Result Diff
//!
//! Recursive equality over workload results with actionable diagnostics
//! instead of a bare boolean. Results are tagged variants: scalar shapes
//! compared by value, sequences walked in lockstep with short-circuit on the
//! first divergence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The output of running a workload: a scalar or an ordered sequence of
/// further results. Immutable once produced; identity is value equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocValue {
    /// Unsigned integer scalar
    Unsigned(u64),
    /// Signed integer scalar
    Signed(i64),
    /// Floating-point scalar
    Float(f64),
    /// Boolean scalar
    Bool(bool),
    /// Text scalar
    Text(String),
    /// Ordered sequence of nested results
    Seq(Vec<DocValue>),
}

impl fmt::Display for DocValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocValue::Unsigned(v) => write!(f, "{}", v),
            DocValue::Signed(v) => write!(f, "{}", v),
            DocValue::Float(v) => write!(f, "{}", v),
            DocValue::Bool(v) => write!(f, "{}", v),
            DocValue::Text(v) => write!(f, "{}", v),
            DocValue::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<u64> for DocValue {
    fn from(v: u64) -> Self {
        DocValue::Unsigned(v)
    }
}

impl From<i64> for DocValue {
    fn from(v: i64) -> Self {
        DocValue::Signed(v)
    }
}

impl From<f64> for DocValue {
    fn from(v: f64) -> Self {
        DocValue::Float(v)
    }
}

impl From<bool> for DocValue {
    fn from(v: bool) -> Self {
        DocValue::Bool(v)
    }
}

impl From<&str> for DocValue {
    fn from(v: &str) -> Self {
        DocValue::Text(v.to_string())
    }
}

impl From<String> for DocValue {
    fn from(v: String) -> Self {
        DocValue::Text(v)
    }
}

impl<T: Into<DocValue>> From<Vec<T>> for DocValue {
    fn from(items: Vec<T>) -> Self {
        DocValue::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl FromIterator<DocValue> for DocValue {
    fn from_iter<I: IntoIterator<Item = DocValue>>(iter: I) -> Self {
        DocValue::Seq(iter.into_iter().collect())
    }
}

/// Why a candidate result diverged from the reference.
///
/// Carried as a value rather than thrown: the caller inspects it and abandons
/// the benchmark case with the message, the suite continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mismatch {
    /// Scalar (or shape) divergence at the first differing position.
    Value {
        /// Textual representation of the candidate value
        got: String,
        /// Textual representation of the reference value
        expected: String,
    },
    /// Candidate sequence is longer than the reference.
    Extra {
        /// Candidate length
        got: usize,
        /// Reference length
        expected: usize,
        /// The first element past the reference's end, if available
        first_extra: Option<String>,
    },
    /// Candidate sequence is shorter than the reference.
    Missing {
        /// Candidate length
        got: usize,
        /// Reference length
        expected: usize,
        /// The first reference element with no counterpart, if available
        first_missing: Option<String>,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Value { got, expected } => {
                write!(f, "result incorrect: {} ... reference: {}", got, expected)
            }
            Mismatch::Extra {
                got,
                expected,
                first_extra,
            } => {
                write!(f, "extra results (got {}, expected {})", got, expected)?;
                if let Some(element) = first_extra {
                    write!(f, ": first extra element: {}", element)?;
                }
                Ok(())
            }
            Mismatch::Missing {
                got,
                expected,
                first_missing,
            } => {
                write!(f, "missing results (got {}, expected {})", got, expected)?;
                if let Some(element) = first_missing {
                    write!(f, ": first missing element: {}", element)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Mismatch {}

/// Structurally compare a candidate result against the reference.
///
/// Scalars are equal iff value-equality holds. Sequences are walked in
/// lockstep, recursing into corresponding elements and stopping at the first
/// divergence; a length difference after the common prefix is reported with
/// both sizes and the first unmatched element. A scalar compared against a
/// sequence is a value mismatch. Recursion depth equals the nesting depth of
/// the result shape.
pub fn diff(candidate: &DocValue, reference: &DocValue) -> Result<(), Mismatch> {
    match (candidate, reference) {
        (DocValue::Seq(got), DocValue::Seq(expected)) => {
            let mut got_iter = got.iter();
            let mut expected_iter = expected.iter();
            loop {
                match (got_iter.next(), expected_iter.next()) {
                    (Some(g), Some(e)) => diff(g, e)?,
                    (Some(g), None) => {
                        return Err(Mismatch::Extra {
                            got: got.len(),
                            expected: expected.len(),
                            first_extra: Some(g.to_string()),
                        });
                    }
                    (None, Some(e)) => {
                        return Err(Mismatch::Missing {
                            got: got.len(),
                            expected: expected.len(),
                            first_missing: Some(e.to_string()),
                        });
                    }
                    (None, None) => return Ok(()),
                }
            }
        }
        _ => {
            if candidate == reference {
                Ok(())
            } else {
                Err(Mismatch::Value {
                    got: candidate.to_string(),
                    expected: reference.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[u64]) -> DocValue {
        values.iter().map(|&v| DocValue::Unsigned(v)).collect()
    }

    #[test]
    fn test_equal_scalars() {
        assert!(diff(&DocValue::Unsigned(7), &DocValue::Unsigned(7)).is_ok());
        assert!(diff(&DocValue::Text("abc".into()), &DocValue::Text("abc".into())).is_ok());
        assert!(diff(&DocValue::Float(1.5), &DocValue::Float(1.5)).is_ok());
    }

    #[test]
    fn test_unequal_scalars_report_both_values() {
        let err = diff(&DocValue::Unsigned(3), &DocValue::Unsigned(4)).unwrap_err();
        assert_eq!(err.to_string(), "result incorrect: 3 ... reference: 4");
    }

    #[test]
    fn test_shape_mismatch_is_value_mismatch() {
        let err = diff(&seq(&[1, 2]), &DocValue::Unsigned(1)).unwrap_err();
        assert_eq!(err.to_string(), "result incorrect: [1, 2] ... reference: 1");
    }

    #[test]
    fn test_equal_sequences() {
        assert!(diff(&seq(&[1, 2, 3]), &seq(&[1, 2, 3])).is_ok());
    }

    #[test]
    fn test_empty_vs_empty() {
        assert!(diff(&seq(&[]), &seq(&[])).is_ok());
    }

    #[test]
    fn test_first_divergence_wins() {
        // Elements differ at index 1 and again at index 2; only the first
        // divergence is reported.
        let err = diff(&seq(&[1, 2, 3]), &seq(&[1, 9, 8])).unwrap_err();
        assert_eq!(err.to_string(), "result incorrect: 2 ... reference: 9");
    }

    #[test]
    fn test_extra_results_message() {
        let err = diff(&seq(&[1, 2, 3]), &seq(&[1, 2])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extra results (got 3, expected 2): first extra element: 3"
        );
    }

    #[test]
    fn test_missing_results_message() {
        let err = diff(&seq(&[1]), &seq(&[1, 2, 3])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing results (got 1, expected 3): first missing element: 2"
        );
    }

    #[test]
    fn test_empty_vs_non_empty() {
        let err = diff(&seq(&[]), &seq(&[5])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing results (got 0, expected 1): first missing element: 5"
        );

        let err = diff(&seq(&[5]), &seq(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extra results (got 1, expected 0): first extra element: 5"
        );
    }

    #[test]
    fn test_nested_sequences() {
        let candidate = DocValue::Seq(vec![seq(&[1, 2]), seq(&[3, 4])]);
        let reference = DocValue::Seq(vec![seq(&[1, 2]), seq(&[3, 5])]);

        let err = diff(&candidate, &reference).unwrap_err();
        assert_eq!(err.to_string(), "result incorrect: 4 ... reference: 5");

        let same = DocValue::Seq(vec![seq(&[1, 2]), seq(&[3, 4])]);
        assert!(diff(&candidate, &same).is_ok());
    }

    #[test]
    fn test_nested_length_mismatch() {
        let candidate = DocValue::Seq(vec![seq(&[1, 2, 3])]);
        let reference = DocValue::Seq(vec![seq(&[1, 2])]);

        let err = diff(&candidate, &reference).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extra results (got 3, expected 2): first extra element: 3"
        );
    }

    #[test]
    fn test_message_without_example_element() {
        let err = Mismatch::Extra {
            got: 2,
            expected: 1,
            first_extra: None,
        };
        assert_eq!(err.to_string(), "extra results (got 2, expected 1)");
    }

    #[test]
    fn test_display_of_nested_value() {
        let value = DocValue::Seq(vec![DocValue::Unsigned(1), seq(&[2, 3])]);
        assert_eq!(value.to_string(), "[1, [2, 3]]");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(DocValue::from(3u64), DocValue::Unsigned(3));
        assert_eq!(DocValue::from("hi"), DocValue::Text("hi".into()));
        assert_eq!(DocValue::from(vec![1u64, 2]), seq(&[1, 2]));
    }
}
