// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Piecewise linear lookup over sorted samples.

use alloc::vec::Vec;

use crate::CurveError;

/// Upper bound on the halvings of one lookup.
///
/// A table of sorted keys never needs more than 64; reaching this bound
/// means the table is not monotonic.
const MAX_HALVINGS: usize = 1000;

/// A piecewise linear function given by `(key, value)` samples with
/// non-decreasing keys.
///
/// Lookups clamp to the key domain, so the function is constant beyond its
/// first and last samples.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonotonicInterpolator {
    samples: Vec<(f64, f64)>,
}

impl MonotonicInterpolator {
    /// Create an interpolator from samples sorted by key.
    ///
    /// Equal consecutive keys are allowed.
    ///
    /// # Errors
    ///
    /// [`CurveError::EmptyInput`] when there are no samples,
    /// [`CurveError::NonFinite`] for NaN or infinite entries, and
    /// [`CurveError::InvariantViolation`] when the keys decrease.
    pub fn new(samples: Vec<(f64, f64)>) -> Result<MonotonicInterpolator, CurveError> {
        if samples.is_empty() {
            return Err(CurveError::EmptyInput);
        }
        for &(k, v) in &samples {
            CurveError::check_finite("interpolation key", k)?;
            CurveError::check_finite("interpolation value", v)?;
        }
        if samples.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(CurveError::InvariantViolation(
                "interpolation keys are not sorted",
            ));
        }
        Ok(MonotonicInterpolator { samples })
    }

    /// Pair up `keys` and `values`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`CurveError::InvariantViolation`] if
    /// the slices differ in length.
    pub fn from_slices(keys: &[f64], values: &[f64]) -> Result<MonotonicInterpolator, CurveError> {
        if keys.len() != values.len() {
            return Err(CurveError::InvariantViolation(
                "interpolation keys and values differ in length",
            ));
        }
        MonotonicInterpolator::new(keys.iter().copied().zip(values.iter().copied()).collect())
    }

    /// The samples, in key order.
    #[inline]
    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    /// The key domain `(first, last)`.
    pub fn domain(&self) -> (f64, f64) {
        let first = self.samples[0].0;
        let last = self.samples[self.samples.len() - 1].0;
        (first, last)
    }

    /// Evaluate at `x`, clamped to the key domain.
    ///
    /// A key hit exactly returns its value, the first one when the key is
    /// repeated.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for a NaN `x`, and
    /// [`CurveError::InvariantViolation`] if the search does not converge.
    pub fn lookup(&self, x: f64) -> Result<f64, CurveError> {
        if x.is_nan() {
            return Err(CurveError::NonFinite {
                parameter: "lookup key",
            });
        }
        let (first, last) = self.domain();
        let x = x.clamp(first, last);
        let samples = &self.samples;
        let mut lo = 0;
        let mut hi = samples.len() - 1;
        if x <= samples[lo].0 {
            return Ok(samples[lo].1);
        }
        let mut halvings = 0;
        // Invariant: samples[lo].0 < x <= samples[hi].0
        while hi - lo > 1 {
            halvings += 1;
            if halvings > MAX_HALVINGS {
                return Err(CurveError::InvariantViolation(
                    "interpolation search did not converge",
                ));
            }
            let mid = lo + (hi - lo) / 2;
            if x <= samples[mid].0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        let (k0, v0) = samples[lo];
        let (k1, v1) = samples[hi];
        if x == k1 {
            return Ok(v1);
        }
        Ok(v0 + (v1 - v0) * ((x - k0) / (k1 - k0)))
    }
}
