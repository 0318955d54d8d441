// Copyright 2018 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for curves parametrized by a scalar.

use core::ops::Range;

use arrayvec::ArrayVec;

use crate::{Point, Rect, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A curve parametrized by a scalar.
///
/// If the result is interpreted as a point, this represents a curve.
pub trait ParamCurve: Sized {
    /// Evaluate the curve at parameter `t`.
    ///
    /// Generally `t` is in the range [0..1].
    fn eval(&self, t: f64) -> Point;

    /// Get a subsegment of the curve for the given parameter range.
    fn subsegment(&self, range: Range<f64>) -> Self;

    /// Subdivide into halves.
    #[inline]
    fn subdivide(&self) -> (Self, Self) {
        (self.subsegment(0.0..0.5), self.subsegment(0.5..1.0))
    }

    /// The start point.
    fn start(&self) -> Point {
        self.eval(0.0)
    }

    /// The end point.
    fn end(&self) -> Point {
        self.eval(1.0)
    }
}

/// A point on a curve together with the tangent there.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// The point on the curve.
    pub point: Point,
    /// The tangent at that point, at the one-third scale of
    /// [`ParamCurveFrame::tangent`].
    pub tangent: Vec2,
}

impl Frame {
    /// The unit normal, the tangent turned a quarter anticlockwise.
    ///
    /// This is NaN when the tangent is null.
    #[inline]
    pub fn normal(&self) -> Vec2 {
        self.tangent.turn_90().normalize()
    }

    /// The direction of the tangent, in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.tangent.atan2()
    }
}

/// A parametrized curve with derivatives.
///
/// Both derivatives are reported at **one third** of their true value:
/// for a cubic `a t³ + b t² + c t + d` the tangent is `c/3 + 2b/3 t + a t²`
/// and the acceleration `2b/3 + 2a t`. With this scale the tangent at an
/// endpoint of a segment equals the offset to the adjacent control point.
/// Every consumer in this crate relies on it; use
/// [`curvature`](ParamCurveFrame::curvature) when the true geometric
/// quantity is wanted.
pub trait ParamCurveFrame: ParamCurve {
    /// One third of the first derivative at `t`.
    fn tangent(&self, t: f64) -> Vec2;

    /// One third of the second derivative at `t`.
    fn acceleration(&self, t: f64) -> Vec2;

    /// Point and tangent at `t`.
    fn frame(&self, t: f64) -> Frame {
        Frame {
            point: self.eval(t),
            tangent: self.tangent(t),
        }
    }

    /// Signed curvature at `t`, positive when the curve turns
    /// anticlockwise.
    fn curvature(&self, t: f64) -> f64 {
        let d = self.tangent(t);
        let d2 = self.acceleration(t);
        // Both inputs are a third of the real derivatives.
        d.cross(d2) / (3.0 * d.hypot().powi(3))
    }
}

/// The maximum number of extrema that can be reported in the
/// [`ParamCurveExtrema`] trait: two per axis for a cubic.
pub const MAX_EXTREMA: usize = 4;

/// A parametrized curve that reports its extrema.
pub trait ParamCurveExtrema: ParamCurve {
    /// Compute the extrema of the curve.
    ///
    /// Only extrema within the interior of the curve count.
    /// At most four extrema can be reported, which is sufficient for
    /// cubic Béziers.
    ///
    /// The extrema should be reported in increasing parameter order.
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA>;

    /// The smallest rectangle that encloses the curve in the range (0..1).
    fn bounding_box(&self) -> Rect {
        let mut bbox = Rect::from_points(self.start(), self.end());
        for t in self.extrema() {
            bbox = bbox.union_pt(self.eval(t));
        }
        bbox
    }
}
