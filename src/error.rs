// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;

use thiserror::Error;

/// Errors reported by curve construction, evaluation and fitting.
///
/// Degenerate inputs such as a zero-length curve or a fit over identical
/// points are not errors; they produce well-defined degenerate results.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CurveError {
    /// A curve was built from an empty list of segments.
    #[error("a curve needs at least one segment")]
    EmptyCurve,

    /// A fit was requested over an empty point list.
    #[error("cannot fit an empty point list")]
    EmptyInput,

    /// A segment was described with the wrong number of points.
    #[error("a segment takes {expected} points, got {found}")]
    MalformedSegment {
        /// Number of points a segment description takes.
        expected: usize,
        /// Number of points actually supplied.
        found: usize,
    },

    /// A segment form tag other than `raw`, `vector` or `tangent`.
    #[error("unknown segment form `{0}`")]
    UnknownForm(String),

    /// A coordinate or parameter was NaN or infinite.
    #[error("{parameter} is not finite")]
    NonFinite {
        /// The name of the offending input.
        parameter: &'static str,
    },

    /// A parameter outside the domain of the operation.
    #[error("{parameter} = {value} is out of range [{min}, {max}]")]
    OutOfDomain {
        /// The name of the offending input.
        parameter: &'static str,
        /// The value supplied.
        value: f64,
        /// Lower bound of the domain.
        min: f64,
        /// Upper bound of the domain.
        max: f64,
    },

    /// An internal consistency check failed.
    ///
    /// This indicates a bug or a malformed lookup table, never bad
    /// caller input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}

impl CurveError {
    /// Whether the error signals an internal logic failure rather than a
    /// construction or domain error.
    pub fn is_internal(&self) -> bool {
        matches!(self, CurveError::InvariantViolation(_))
    }

    pub(crate) fn check_finite(parameter: &'static str, value: f64) -> Result<f64, CurveError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CurveError::NonFinite { parameter })
        }
    }

    pub(crate) fn check_range(
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<f64, CurveError> {
        if value >= min && value <= max {
            Ok(value)
        } else {
            Err(CurveError::OutOfDomain {
                parameter,
                value,
                min,
                max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CurveError;

    #[test]
    fn messages() {
        let err = CurveError::OutOfDomain {
            parameter: "t1",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(err.to_string(), "t1 = 1.5 is out of range [0, 1]");
        assert_eq!(
            CurveError::UnknownForm("spline".into()).to_string(),
            "unknown segment form `spline`"
        );
        assert!(CurveError::InvariantViolation("x").is_internal());
        assert!(!CurveError::EmptyCurve.is_internal());
    }

    #[test]
    fn range_checks() {
        assert_eq!(CurveError::check_range("t", 0.5, 0.0, 1.0), Ok(0.5));
        assert!(CurveError::check_range("t", -0.1, 0.0, 1.0).is_err());
        assert!(CurveError::check_range("t", f64::NAN, 0.0, 1.0).is_err());
        assert!(CurveError::check_finite("t", f64::INFINITY).is_err());
    }
}
