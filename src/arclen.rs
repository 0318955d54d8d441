// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arc length parametrization.
//!
//! The map is built by adaptively flattening a [`MultiCurve`] into a
//! polyline whose vertices sit at known curve parameters, then accumulating
//! the polyline length. Two [`MonotonicInterpolator`]s convert between the
//! curve parameter and the normalized length along the curve.

use alloc::vec::Vec;

use crate::{CurveError, MonotonicInterpolator, MultiCurve, Side};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Number of root intervals each side of a curve is split into before the
/// adaptive refinement starts.
const ROOTS_PER_SIDE: usize = 4;

/// Below this total length a curve is treated as a point.
const MIN_LENGTH: f64 = 1e-10;

/// Floor applied to [`FlattenOptions::min_width`], bounding the bisection
/// depth.
pub const MIN_FLATTEN_WIDTH: f64 = 1e-6;

/// Options for the adaptive flattening behind an [`ArcLengthMap`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlattenOptions {
    /// Maximum deviation of an interval before it is bisected.
    ///
    /// The deviation is `|t1 × chord| + |t2 × chord|` with the one-third
    /// tangents at both ends of the interval, so it scales with the square
    /// of the curve size.
    pub tolerance: f64,
    /// Intervals narrower than this, in parameter units, are never
    /// bisected. Values below [`MIN_FLATTEN_WIDTH`] act as that floor.
    pub min_width: f64,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            tolerance: 0.01,
            min_width: 0.01,
        }
    }
}

impl FlattenOptions {
    /// Set the deviation tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the minimum interval width.
    #[must_use]
    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = min_width;
        self
    }
}

/// Flatten the parameter interval `a1..a2` of `curve`.
///
/// Returns the increasing list of parameters ending the flattened pieces.
/// The interval start is not included, so consecutive results can be
/// appended to each other. The frame at `a1` is taken on the right-hand
/// segment and the one at `a2` on the left-hand segment, so an interval
/// lying on a single segment never sees the neighbouring one.
pub fn flatten_interval(curve: &MultiCurve, a1: f64, a2: f64, options: &FlattenOptions) -> Vec<f64> {
    let start = curve.frame_at_param(a1, Side::Right);
    let end = curve.frame_at_param(a2, Side::Left);
    let chord = end.point - start.point;
    let deviation = start.tangent.cross(chord).abs() + end.tangent.cross(chord).abs();
    let min_width = options.min_width.max(MIN_FLATTEN_WIDTH);
    if deviation > options.tolerance && (a2 - a1).abs() > min_width {
        let mid = 0.5 * (a1 + a2);
        let mut result = flatten_interval(curve, a1, mid, options);
        result.extend(flatten_interval(curve, mid, a2, options));
        result
    } else {
        alloc::vec![a2]
    }
}

/// Flatten the whole curve, side by side.
fn flatten(curve: &MultiCurve, options: &FlattenOptions) -> Vec<f64> {
    let n = curve.segment_count() as f64;
    let mut bounds: Vec<f64> = curve.side_boundaries().iter().map(|&b| b as f64).collect();
    // A side wrapping around the start of a closed curve is flattened in
    // two parts.
    if bounds.first().is_some_and(|&b| b < 0.0) {
        bounds[0] = 0.0;
        bounds.push(n);
    }
    let mut params = alloc::vec![0.0];
    for w in bounds.windows(2) {
        let (r0, r1) = (w[0], w[1]);
        if r1 <= r0 {
            continue;
        }
        let step = (r1 - r0) / ROOTS_PER_SIDE as f64;
        let mut lo = r0;
        for k in 1..=ROOTS_PER_SIDE {
            let hi = if k == ROOTS_PER_SIDE {
                r1
            } else {
                r0 + step * k as f64
            };
            let piece = flatten_interval(curve, lo, hi, options);
            log::trace!("flattened {lo}..{hi} into {} pieces", piece.len());
            params.extend(piece);
            lo = hi;
        }
    }
    params
}

/// A two-way map between curve parameter and normalized arc length.
#[derive(Clone, Debug, PartialEq)]
pub struct ArcLengthMap {
    length: f64,
    parameters: Vec<f64>,
    to_parameter: MonotonicInterpolator,
    to_fraction: MonotonicInterpolator,
}

impl ArcLengthMap {
    /// Build the map of `curve` with the given flattening options.
    ///
    /// A curve of zero length gets degenerate tables sending every
    /// fraction to parameter 0 and every parameter to fraction 0.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] if the curve has non-finite coordinates,
    /// and [`CurveError::OutOfDomain`] for a negative or non-finite
    /// tolerance or a minimum width that is not positive and finite.
    pub fn build(curve: &MultiCurve, options: &FlattenOptions) -> Result<ArcLengthMap, CurveError> {
        CurveError::check_range("tolerance", options.tolerance, 0.0, f64::MAX)?;
        CurveError::check_range("min_width", options.min_width, f64::MIN_POSITIVE, f64::MAX)?;
        let parameters = flatten(curve, options);
        let mut sums = Vec::with_capacity(parameters.len());
        let mut total = 0.0;
        let mut last = curve.point_at_param(0.0, Side::Right);
        for &p in &parameters {
            let pt = curve.point_at_param(p, Side::Right);
            total += pt.distance(last);
            sums.push(total);
            last = pt;
        }
        CurveError::check_finite("curve length", total)?;
        log::debug!(
            "arc length map over {} segments: {} samples, length {total}",
            curve.segment_count(),
            parameters.len()
        );
        let (to_parameter, to_fraction) = if total < MIN_LENGTH {
            (
                MonotonicInterpolator::new(alloc::vec![(0.0, 0.0), (1.0, 0.0)])?,
                MonotonicInterpolator::new(alloc::vec![(0.0, 0.0), (0.0, 1.0)])?,
            )
        } else {
            let fractions: Vec<f64> = sums.iter().map(|s| s / total).collect();
            (
                MonotonicInterpolator::from_slices(&fractions, &parameters)?,
                MonotonicInterpolator::from_slices(&parameters, &fractions)?,
            )
        };
        Ok(ArcLengthMap {
            length: total,
            parameters,
            to_parameter,
            to_fraction,
        })
    }

    /// The total length of the curve.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The flattening samples, as increasing curve parameters from 0 to the
    /// segment count.
    #[inline]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Normalized length, in `[0, 1]`, at curve parameter `t`.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for a NaN `t`.
    pub fn parameter_to_fraction(&self, t: f64) -> Result<f64, CurveError> {
        self.to_fraction.lookup(t)
    }

    /// Curve parameter at normalized length `x`, clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for a NaN `x`.
    pub fn fraction_to_parameter(&self, x: f64) -> Result<f64, CurveError> {
        self.to_parameter.lookup(x)
    }
}
