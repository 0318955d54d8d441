// Copyright 2018 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic curve segments.

use core::ops::{Mul, Range};
use core::str::FromStr;

use alloc::string::ToString;

use arrayvec::ArrayVec;

use crate::common::solve_quadratic;
use crate::{
    Affine, CurveError, ParamCurve, ParamCurveExtrema, ParamCurveFrame, Point, Vec2, MAX_EXTREMA,
};

/// How the four points describing a segment are to be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentForm {
    /// Anchor, control, control, anchor.
    Raw,
    /// Anchor, outgoing offset, anchor, incoming offset.
    ///
    /// Each offset points from its anchor to the adjacent control point.
    Tangent,
}

impl FromStr for SegmentForm {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(SegmentForm::Raw),
            "vector" | "tangent" => Ok(SegmentForm::Tangent),
            _ => Err(CurveError::UnknownForm(s.to_string())),
        }
    }
}

/// A segment in tangent form: two anchors, each with the offset to its
/// adjacent control point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TangentForm {
    /// The start anchor.
    pub start: Point,
    /// Offset from `start` to the first control point.
    pub start_offset: Vec2,
    /// The end anchor.
    pub end: Point,
    /// Offset from `end` to the second control point.
    pub end_offset: Vec2,
}

/// A single cubic segment.
///
/// The segment is immutable. Its monomial coefficients are computed once
/// at construction, so evaluation costs a handful of multiplications.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[Point; 4]", into = "[Point; 4]")
)]
pub struct CurveSegment {
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    coeffs: Coeffs,
}

/// `a t³ + b t² + c t + d`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Coeffs {
    a: Vec2,
    b: Vec2,
    c: Vec2,
    d: Point,
}

impl Coeffs {
    fn from_points(p0: Point, p1: Point, p2: Point, p3: Point) -> Coeffs {
        let (v0, v1, v2, v3) = (p0.to_vec2(), p1.to_vec2(), p2.to_vec2(), p3.to_vec2());
        Coeffs {
            a: -(v0 - 3.0 * v1 + 3.0 * v2 - v3),
            b: 3.0 * (v0 - 2.0 * v1 + v2),
            c: 3.0 * (v1 - v0),
            d: p0,
        }
    }
}

impl CurveSegment {
    /// Create a new segment from its anchors and control points.
    #[inline]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CurveSegment {
        let (p0, p1, p2, p3) = (p0.into(), p1.into(), p2.into(), p3.into());
        CurveSegment {
            p0,
            p1,
            p2,
            p3,
            coeffs: Coeffs::from_points(p0, p1, p2, p3),
        }
    }

    /// Create a segment from anchors and the offsets to their control
    /// points.
    #[inline]
    pub fn from_tangents(
        start: impl Into<Point>,
        start_offset: impl Into<Vec2>,
        end: impl Into<Point>,
        end_offset: impl Into<Vec2>,
    ) -> CurveSegment {
        let start = start.into();
        let end = end.into();
        CurveSegment::new(
            start,
            start + start_offset.into(),
            end + end_offset.into(),
            end,
        )
    }

    /// Like [`from_tangents`](Self::from_tangents), with both offsets
    /// rescaled to a third of the distance between the anchors.
    ///
    /// A null offset stays null.
    pub fn from_tangents_regular(
        start: impl Into<Point>,
        start_offset: impl Into<Vec2>,
        end: impl Into<Point>,
        end_offset: impl Into<Vec2>,
    ) -> CurveSegment {
        let start = start.into();
        let end = end.into();
        let third = start.distance(end) / 3.0;
        let rescale = |v: Vec2| {
            let len = v.hypot();
            if len == 0.0 {
                v
            } else {
                v * (third / len)
            }
        };
        CurveSegment::from_tangents(
            start,
            rescale(start_offset.into()),
            end,
            rescale(end_offset.into()),
        )
    }

    /// The straight segment from `p0` to `p1`, with control points at the
    /// thirds so that it is traversed at constant speed.
    #[inline]
    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> CurveSegment {
        let p0 = p0.into();
        let p1 = p1.into();
        let third = (p1 - p0) / 3.0;
        CurveSegment::new(p0, p0 + third, p1 - third, p1)
    }

    /// The zero-length segment sitting at `p`.
    #[inline]
    pub fn point(p: impl Into<Point>) -> CurveSegment {
        let p = p.into();
        CurveSegment::new(p, p, p, p)
    }

    /// Build a segment from exactly four points read according to `form`.
    ///
    /// # Errors
    ///
    /// [`CurveError::MalformedSegment`] unless exactly four points are
    /// given, and [`CurveError::NonFinite`] if any coordinate is NaN or
    /// infinite.
    pub fn try_from_form(form: SegmentForm, points: &[Point]) -> Result<CurveSegment, CurveError> {
        let [q0, q1, q2, q3] = match *points {
            [q0, q1, q2, q3] => [q0, q1, q2, q3],
            _ => {
                return Err(CurveError::MalformedSegment {
                    expected: 4,
                    found: points.len(),
                })
            }
        };
        if !points.iter().all(|p| p.is_finite()) {
            return Err(CurveError::NonFinite {
                parameter: "segment point",
            });
        }
        Ok(match form {
            SegmentForm::Raw => CurveSegment::new(q0, q1, q2, q3),
            SegmentForm::Tangent => CurveSegment::from_tangents(q0, q1.to_vec2(), q2, q3.to_vec2()),
        })
    }

    /// Like [`try_from_form`](Self::try_from_form), with the form given by
    /// its name: `"raw"`, `"vector"` or `"tangent"`.
    ///
    /// # Errors
    ///
    /// [`CurveError::UnknownForm`] for any other tag, plus the errors of
    /// [`try_from_form`](Self::try_from_form).
    pub fn try_from_tagged(tag: &str, points: &[Point]) -> Result<CurveSegment, CurveError> {
        CurveSegment::try_from_form(tag.parse()?, points)
    }

    /// The four points in raw form.
    #[inline]
    pub fn points(&self) -> [Point; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// The four points read according to `form`.
    ///
    /// In tangent form the offsets are returned as points relative to the
    /// origin, matching what [`try_from_form`](Self::try_from_form) takes.
    pub fn points_in(&self, form: SegmentForm) -> [Point; 4] {
        match form {
            SegmentForm::Raw => self.points(),
            SegmentForm::Tangent => {
                let t = self.to_tangent_form();
                [
                    t.start,
                    t.start_offset.to_point(),
                    t.end,
                    t.end_offset.to_point(),
                ]
            }
        }
    }

    /// The segment in tangent form.
    #[inline]
    pub fn to_tangent_form(&self) -> TangentForm {
        TangentForm {
            start: self.p0,
            start_offset: self.p1 - self.p0,
            end: self.p3,
            end_offset: self.p2 - self.p3,
        }
    }

    /// Offset from the start anchor to the first control point.
    #[inline]
    pub fn start_offset(&self) -> Vec2 {
        self.p1 - self.p0
    }

    /// Offset from the end anchor to the second control point.
    #[inline]
    pub fn end_offset(&self) -> Vec2 {
        self.p2 - self.p3
    }

    /// The monomial coefficients `(a, b, c, d)` of `a t³ + b t² + c t + d`.
    #[inline]
    pub fn coefficients(&self) -> (Vec2, Vec2, Vec2, Point) {
        let Coeffs { a, b, c, d } = self.coeffs;
        (a, b, c, d)
    }

    /// The true first derivative at `t`.
    ///
    /// This is three times [`tangent`](ParamCurveFrame::tangent).
    #[inline]
    pub fn derivative(&self, t: f64) -> Vec2 {
        let Coeffs { a, b, c, .. } = self.coeffs;
        (3.0 * a * t + 2.0 * b) * t + c
    }

    /// Whether all four points coincide.
    pub fn is_point(&self) -> bool {
        self.p0.approx_eq(self.p1) && self.p0.approx_eq(self.p2) && self.p0.approx_eq(self.p3)
    }

    /// Sum of the lengths of the control polygon edges, an upper bound of
    /// the arc length.
    pub fn polygon_length(&self) -> f64 {
        self.p0.distance(self.p1) + self.p1.distance(self.p2) + self.p2.distance(self.p3)
    }

    /// The same curve traversed from end to start.
    #[inline]
    #[must_use]
    pub fn reverse(&self) -> CurveSegment {
        CurveSegment::new(self.p3, self.p2, self.p1, self.p0)
    }

    /// Apply an affine map to every point.
    #[inline]
    #[must_use]
    pub fn transform(&self, affine: Affine) -> CurveSegment {
        CurveSegment::new(
            affine * self.p0,
            affine * self.p1,
            affine * self.p2,
            affine * self.p3,
        )
    }

    /// Translate by `v`.
    #[must_use]
    pub fn translate(&self, v: Vec2) -> CurveSegment {
        self.transform(Affine::translate(v))
    }

    /// Rotate by `angle` radians about `center`.
    #[must_use]
    pub fn rotate(&self, angle: f64, center: Point) -> CurveSegment {
        self.transform(Affine::rotate_about(angle, center))
    }

    /// Point reflection through `center`.
    #[must_use]
    pub fn reflect_point(&self, center: Point) -> CurveSegment {
        self.transform(Affine::point_reflection(center))
    }

    /// Reflection across the line through `point` along `direction`.
    #[must_use]
    pub fn reflect_axis(&self, point: Point, direction: Vec2) -> CurveSegment {
        self.transform(Affine::reflect(point, direction))
    }
}

impl From<[Point; 4]> for CurveSegment {
    #[inline]
    fn from(p: [Point; 4]) -> CurveSegment {
        CurveSegment::new(p[0], p[1], p[2], p[3])
    }
}

impl From<CurveSegment> for [Point; 4] {
    #[inline]
    fn from(seg: CurveSegment) -> [Point; 4] {
        seg.points()
    }
}

impl ParamCurve for CurveSegment {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let Coeffs { a, b, c, d } = self.coeffs;
        d + ((a * t + b) * t + c) * t
    }

    #[inline]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline]
    fn end(&self) -> Point {
        self.p3
    }

    /// The restriction of the segment to `range`.
    ///
    /// The offsets of the result are `tangent(t1) * (t2 - t1)` at the start
    /// and `tangent(t2) * (t1 - t2)` at the end, which reproduces the
    /// original curve exactly. A decreasing range yields a reversed piece.
    fn subsegment(&self, range: Range<f64>) -> CurveSegment {
        let (t1, t2) = (range.start, range.end);
        CurveSegment::from_tangents(
            self.eval(t1),
            self.tangent(t1) * (t2 - t1),
            self.eval(t2),
            self.tangent(t2) * (t1 - t2),
        )
    }

    /// Subdivide into halves, using de Casteljau.
    #[inline]
    fn subdivide(&self) -> (CurveSegment, CurveSegment) {
        let pm = self.eval(0.5);
        let (v0, v1, v2, v3) = (
            self.p0.to_vec2(),
            self.p1.to_vec2(),
            self.p2.to_vec2(),
            self.p3.to_vec2(),
        );
        (
            CurveSegment::new(
                self.p0,
                ((v0 + v1) / 2.0).to_point(),
                ((v0 + v1 * 2.0 + v2) * 0.25).to_point(),
                pm,
            ),
            CurveSegment::new(
                pm,
                ((v1 + v2 * 2.0 + v3) * 0.25).to_point(),
                ((v2 + v3) / 2.0).to_point(),
                self.p3,
            ),
        )
    }
}

impl ParamCurveFrame for CurveSegment {
    #[inline]
    fn tangent(&self, t: f64) -> Vec2 {
        let Coeffs { a, b, c, .. } = self.coeffs;
        c / 3.0 + (2.0 / 3.0) * b * t + a * (t * t)
    }

    #[inline]
    fn acceleration(&self, t: f64) -> Vec2 {
        let Coeffs { a, b, .. } = self.coeffs;
        (2.0 / 3.0) * b + 2.0 * a * t
    }
}

impl ParamCurveExtrema for CurveSegment {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        fn one_coord(result: &mut ArrayVec<f64, MAX_EXTREMA>, d0: f64, d1: f64, d2: f64) {
            let a = d0 - 2.0 * d1 + d2;
            let b = 2.0 * (d1 - d0);
            let c = d0;
            let roots = solve_quadratic(c, b, a);
            for &t in &roots {
                if t > 0.0 && t < 1.0 {
                    result.push(t);
                }
            }
        }
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let d2 = self.p3 - self.p2;
        one_coord(&mut result, d0.x, d1.x, d2.x);
        one_coord(&mut result, d0.y, d1.y, d2.y);
        result.sort_by(|a, b| a.total_cmp(b));
        result
    }
}

impl Mul<CurveSegment> for Affine {
    type Output = CurveSegment;

    #[inline]
    fn mul(self, c: CurveSegment) -> CurveSegment {
        c.transform(self)
    }
}
