// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Least-squares fitting of cubic curves to point sequences.
//!
//! A fit pins the first and last points and solves, by linear least
//! squares, for the two remaining monomial coefficients of the cubic. The
//! parameter assigned to each point starts as its normalized chord length
//! and is refined between solves by one secant step on the orthogonality
//! condition `(B(u) - P) · B′(u) = 0`.
//!
//! [`adaptive_fit`] splits the input in halves whenever a single cubic
//! does not converge, producing a [`MultiCurve`] with as few pieces as the
//! error bound allows.

use alloc::vec::Vec;

use crate::common::solve_2x2;
use crate::{CurveError, CurveSegment, MultiCurve, ParamCurve, Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single fit stops when its error changes by less than this between
/// iterations.
const STAGNATION: f64 = 1e-5;

/// Parameter offset of the second secant sample.
const SECANT_STEP: f64 = 0.01;

/// Below this many points a run is never split.
const MIN_SPLIT_POINTS: usize = 9;

/// Options for curve fitting.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitOptions {
    /// Target error, relative to the total chord length of the input or
    /// to [`total_length`](Self::total_length).
    pub max_error: f64,
    /// Number of reparametrization rounds after the first solve.
    pub max_iterations: usize,
    /// Length the error is measured against, in place of the chord length
    /// of the input.
    ///
    /// Set this when the points are one piece of a longer stroke, so that
    /// errors of separate pieces are comparable.
    pub total_length: Option<f64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            max_error: 1e-4,
            max_iterations: 10,
            total_length: None,
        }
    }
}

impl FitOptions {
    /// Set the target error.
    #[must_use]
    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = max_error;
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the length errors are measured against.
    #[must_use]
    pub fn with_total_length(mut self, total_length: f64) -> Self {
        self.total_length = Some(total_length);
        self
    }

    /// The error scale for an input whose chord length is `chord`.
    fn scale(&self, chord: f64) -> Result<f64, CurveError> {
        match self.total_length {
            None => Ok(chord),
            Some(len) => CurveError::check_range("total length", len, f64::MIN_POSITIVE, f64::MAX),
        }
    }
}

/// The outcome of a fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FitResult {
    /// The fitted curve.
    pub curve: MultiCurve,
    /// The largest distance from an input point to its position on the
    /// curve, divided by the total chord length of the input.
    pub error: f64,
}

impl FitResult {
    fn point(p: Point) -> FitResult {
        FitResult {
            curve: MultiCurve::point(p),
            error: 0.0,
        }
    }
}

/// Fit a single cubic segment through `points`.
///
/// Iteration stops when the error drops below
/// [`max_error`](FitOptions::max_error), when it stagnates, or when the
/// iteration budget runs out; the last fit is returned either way. Points
/// that all coincide give a zero-length segment with error 0.
///
/// # Errors
///
/// [`CurveError::EmptyInput`] for an empty slice,
/// [`CurveError::NonFinite`] for NaN or infinite coordinates, and
/// [`CurveError::OutOfDomain`] for a total length hint that is not
/// positive and finite.
pub fn fit(points: &[Point], options: &FitOptions) -> Result<FitResult, CurveError> {
    check_points(points)?;
    let (mut params, chord) = chord_parameters(points);
    let scale = options.scale(chord)?;
    if chord == 0.0 {
        return Ok(FitResult::point(points[0]));
    }
    let mut previous: Option<f64> = None;
    let mut iterations = 0;
    loop {
        let segment = solve(points, &params);
        let error = max_deviation(&segment, points, &params) / scale;
        params = reparametrize(&segment, points, &params);
        if error < options.max_error
            || previous.is_some_and(|e| (error - e).abs() < STAGNATION)
            || iterations >= options.max_iterations
        {
            return Ok(FitResult {
                curve: MultiCurve::from_segment(segment),
                error,
            });
        }
        previous = Some(error);
        iterations += 1;
    }
}

/// Fit a curve through `points` with as few segments as needed.
///
/// A run of points that does not converge within the iteration budget is
/// split in two halves sharing their middle point, each fitted in turn.
/// Runs of eight points or fewer are never split. The reported error is
/// the worst over all pieces, always relative to the chord length of the
/// whole input or to [`total_length`](FitOptions::total_length) when set.
///
/// # Errors
///
/// [`CurveError::EmptyInput`] for an empty slice,
/// [`CurveError::NonFinite`] for NaN or infinite coordinates, and
/// [`CurveError::OutOfDomain`] for a total length hint that is not
/// positive and finite.
pub fn adaptive_fit(points: &[Point], options: &FitOptions) -> Result<FitResult, CurveError> {
    check_points(points)?;
    let (_, chord) = chord_parameters(points);
    let scale = options.scale(chord)?;
    Ok(adaptive_fit_run(points, options, scale))
}

fn adaptive_fit_run(points: &[Point], options: &FitOptions, total: f64) -> FitResult {
    let (mut params, run_length) = chord_parameters(points);
    if run_length == 0.0 {
        return FitResult::point(points[0]);
    }
    let mut iterations = 0;
    loop {
        let segment = solve(points, &params);
        let error = max_deviation(&segment, points, &params) / total;
        params = reparametrize(&segment, points, &params);
        if iterations >= options.max_iterations
            && error > options.max_error
            && points.len() >= MIN_SPLIT_POINTS
        {
            let half = points.len() / 2;
            log::debug!(
                "splitting a run of {} points at error {error}",
                points.len()
            );
            let left = adaptive_fit_run(&points[..half], options, total);
            let right = adaptive_fit_run(&points[half - 1..], options, total);
            return FitResult {
                curve: left.curve + right.curve,
                error: left.error.max(right.error),
            };
        }
        if error < options.max_error || iterations >= options.max_iterations {
            return FitResult {
                curve: MultiCurve::from_segment(segment),
                error,
            };
        }
        iterations += 1;
    }
}

fn check_points(points: &[Point]) -> Result<(), CurveError> {
    if points.is_empty() {
        return Err(CurveError::EmptyInput);
    }
    if !points.iter().all(|p| p.is_finite()) {
        return Err(CurveError::NonFinite {
            parameter: "fit point",
        });
    }
    Ok(())
}

/// Normalized cumulative chord lengths, and the total.
///
/// All parameters are 0 when the points coincide.
fn chord_parameters(points: &[Point]) -> (Vec<f64>, f64) {
    let mut params = Vec::with_capacity(points.len());
    let mut total = 0.0;
    params.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        params.push(total);
    }
    if total > 0.0 {
        for u in &mut params {
            *u /= total;
        }
    }
    (params, total)
}

/// Least-squares cubic through `points` at `params`, with both endpoints
/// pinned.
///
/// With `d` the first point and `c` fixed by the last one, the residual is
/// linear in the cubic and quadratic coefficients `a` and `b`, and the
/// normal equations share one 2×2 matrix for both axes. When that matrix
/// is singular the fit falls back to the straight segment.
fn solve(points: &[Point], params: &[f64]) -> CurveSegment {
    let first = points[0].to_vec2();
    let last = points[points.len() - 1].to_vec2();
    // s[k] = Σ uᵏ, m[k] = Σ P uᵏ
    let mut s = [0.0; 7];
    let mut m = [Vec2::ZERO; 4];
    for (&p, &u) in points.iter().zip(params) {
        let mut uk = 1.0;
        for (k, sk) in s.iter_mut().enumerate() {
            *sk += uk;
            if let Some(mk) = m.get_mut(k) {
                *mk += p.to_vec2() * uk;
            }
            uk *= u;
        }
    }
    let c11 = s[6] - 2.0 * s[4] + s[2];
    let c12 = s[5] - s[4] - s[3] + s[2];
    let c22 = s[4] - 2.0 * s[3] + s[2];
    let r1 = (first - last) * (s[4] - s[2]) - first * (s[3] - s[1]) + m[3] - m[1];
    let r2 = (first - last) * (s[3] - s[2]) - first * (s[2] - s[1]) + m[2] - m[1];
    let solution = solve_2x2(c11, c12, c12, c22, r1.x, r2.x)
        .zip(solve_2x2(c11, c12, c12, c22, r1.y, r2.y));
    let (a, b) = match solution {
        Some(((ax, bx), (ay, by))) => (Vec2::new(ax, ay), Vec2::new(bx, by)),
        None => {
            if points.len() >= 4 {
                log::warn!(
                    "singular fit over {} points, using a straight segment",
                    points.len()
                );
            }
            (Vec2::ZERO, Vec2::ZERO)
        }
    };
    let c = last - first - a - b;
    let q1 = first + c / 3.0;
    let q2 = q1 + c / 3.0 + b / 3.0;
    CurveSegment::new(first.to_point(), q1.to_point(), q2.to_point(), last.to_point())
}

/// Largest distance between a point and the curve at its parameter,
/// clamped to the segment.
fn max_deviation(segment: &CurveSegment, points: &[Point], params: &[f64]) -> f64 {
    points
        .iter()
        .zip(params)
        .map(|(&p, &u)| segment.eval(u.clamp(0.0, 1.0)).distance(p))
        .fold(0.0, f64::max)
}

/// One secant step per point on `z(u) = (B(u) - P) · B′(u)`.
///
/// The second sample sits one step after `u`, or before it near the end
/// of the segment. If both samples agree the step is retried further on
/// and then on the other side; a point whose samples still agree keeps
/// its parameter.
fn reparametrize(segment: &CurveSegment, points: &[Point], params: &[f64]) -> Vec<f64> {
    let z = |u: f64, p: Point| (segment.eval(u.clamp(0.0, 1.0)) - p).dot(segment.derivative(u));
    points
        .iter()
        .zip(params)
        .map(|(&p, &u1)| {
            let z1 = z(u1, p);
            let first = if u1 < 1.0 - SECANT_STEP {
                u1 + SECANT_STEP
            } else {
                u1 - SECANT_STEP
            };
            [first, first + SECANT_STEP, u1 - SECANT_STEP]
                .into_iter()
                .map(|u2| (u2, z(u2, p)))
                .find(|&(_, z2)| z2 != z1)
                .map_or(u1, |(u2, z2)| (z2 * u1 - z1 * u2) / (z2 - z1))
        })
        .collect()
}
