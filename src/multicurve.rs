// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Piecewise cubic curves.

use core::fmt;
use core::ops::{Add, Mul};

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use once_cell::race::OnceBox;
use smallvec::SmallVec;

use crate::common::{wrap_range, POINT_EPSILON};
use crate::{
    Affine, ArcLengthMap, BezPath, CurveError, CurveSegment, FlattenOptions, Frame, ParamCurve,
    ParamCurveExtrema, ParamCurveFrame, PathEl, Point, Rect, SegmentForm, Vec2,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Tangents shorter than this carry no direction.
const NULL_TANGENT: f64 = 1e-10;

/// Largest distance between unit tangents still counted as a smooth join,
/// roughly an angle in radians.
const SMOOTH_TOLERANCE: f64 = 0.01;

/// Junction gaps above this start a new subpath on export.
const SUBPATH_GAP: f64 = 1e-7;

/// Samples per curve for polyline intersection.
const INTERSECTION_SAMPLES: usize = 100;

/// How a scalar position along a [`MultiCurve`] is to be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamMode {
    /// The curve parameter in `[0, N]`, where segment `i` owns `[i, i + 1]`.
    Parameter,
    /// The normalized arc length in `[0, 1]`.
    Length,
}

/// Which segment owns a parameter that falls exactly on a segment boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The segment ending at the boundary, except at parameter 0.
    Left,
    /// The segment starting at the boundary, except at parameter `N`.
    #[default]
    Right,
}

/// An ordered, non-empty sequence of cubic segments.
///
/// Adjacent segments are usually joined end to start but this is not
/// enforced. The curve is immutable: every transform returns a new curve.
///
/// The arc length map and the list of side boundaries are derived on first
/// use and kept for the lifetime of the value. Both caches are thread safe.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<CurveSegment>", into = "Vec<CurveSegment>")
)]
pub struct MultiCurve {
    segments: Vec<CurveSegment>,
    arclen: OnceBox<ArcLengthMap>,
    side_boundaries: OnceBox<SmallVec<[isize; 4]>>,
}

impl MultiCurve {
    /// Create a curve from its segments.
    ///
    /// # Errors
    ///
    /// [`CurveError::EmptyCurve`] if `segments` is empty.
    pub fn new(segments: Vec<CurveSegment>) -> Result<MultiCurve, CurveError> {
        if segments.is_empty() {
            return Err(CurveError::EmptyCurve);
        }
        Ok(MultiCurve::with_segments(segments))
    }

    /// Callers guarantee `segments` is not empty.
    pub(crate) fn with_segments(segments: Vec<CurveSegment>) -> MultiCurve {
        debug_assert!(!segments.is_empty(), "a curve needs a segment");
        MultiCurve {
            segments,
            arclen: OnceBox::new(),
            side_boundaries: OnceBox::new(),
        }
    }

    /// A curve made of one segment.
    pub fn from_segment(segment: CurveSegment) -> MultiCurve {
        MultiCurve::with_segments(vec![segment])
    }

    /// A one-segment curve from anchors and control points.
    pub fn raw(
        p0: impl Into<Point>,
        c0: impl Into<Point>,
        c1: impl Into<Point>,
        p1: impl Into<Point>,
    ) -> MultiCurve {
        MultiCurve::from_segment(CurveSegment::new(p0.into(), c0.into(), c1.into(), p1.into()))
    }

    /// A one-segment curve from anchors and control offsets.
    pub fn vector(
        p0: impl Into<Point>,
        t0: impl Into<Vec2>,
        p1: impl Into<Point>,
        t1: impl Into<Vec2>,
    ) -> MultiCurve {
        MultiCurve::from_segment(CurveSegment::from_tangents(p0, t0, p1, t1))
    }

    /// Like [`vector`](Self::vector), with both offsets rescaled to a third
    /// of the anchor distance.
    pub fn vector_regular(
        p0: impl Into<Point>,
        t0: impl Into<Vec2>,
        p1: impl Into<Point>,
        t1: impl Into<Vec2>,
    ) -> MultiCurve {
        MultiCurve::from_segment(CurveSegment::from_tangents_regular(p0, t0, p1, t1))
    }

    /// The straight line from `p0` to `p1`.
    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> MultiCurve {
        MultiCurve::from_segment(CurveSegment::line(p0, p1))
    }

    /// The zero-length curve at `p`.
    pub fn point(p: impl Into<Point>) -> MultiCurve {
        MultiCurve::from_segment(CurveSegment::point(p))
    }

    /// A smooth curve through `(anchor, control)` pairs.
    ///
    /// Each control is the outgoing control point of its anchor; the
    /// incoming one is its reflection through the anchor.
    ///
    /// # Errors
    ///
    /// [`CurveError::EmptyCurve`] with fewer than two anchors.
    pub fn raws(knots: &[(Point, Point)]) -> Result<MultiCurve, CurveError> {
        let segments = knots
            .windows(2)
            .map(|w| {
                let ((a0, c0), (a1, c1)) = (w[0], w[1]);
                CurveSegment::new(a0, c0, a1 + (a1 - c1), a1)
            })
            .collect();
        MultiCurve::new(segments)
    }

    /// A smooth curve through `(anchor, offset)` pairs, where each offset
    /// leads to the outgoing control point of its anchor.
    ///
    /// # Errors
    ///
    /// [`CurveError::EmptyCurve`] with fewer than two anchors.
    pub fn vectors(knots: &[(Point, Vec2)]) -> Result<MultiCurve, CurveError> {
        let segments = knots
            .windows(2)
            .map(|w| {
                let ((a0, v0), (a1, v1)) = (w[0], w[1]);
                CurveSegment::from_tangents(a0, v0, a1, -v1)
            })
            .collect();
        MultiCurve::new(segments)
    }

    /// The segments, in order.
    #[inline]
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// The number of segments, which is also the upper end of the
    /// parameter domain.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The start point of the first segment.
    pub fn first_point(&self) -> Point {
        self.segments[0].start()
    }

    /// The end point of the last segment.
    pub fn last_point(&self) -> Point {
        self.segments[self.segments.len() - 1].end()
    }

    /// Whether the curve ends where it starts.
    pub fn is_closed(&self) -> bool {
        self.first_point().distance(self.last_point()) < POINT_EPSILON
    }

    /// The arc length map, built on first use.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] if the curve has non-finite coordinates.
    pub fn arclen(&self) -> Result<&ArcLengthMap, CurveError> {
        self.arclen
            .get_or_try_init(|| ArcLengthMap::build(self, &FlattenOptions::default()).map(Box::new))
    }

    /// The total length of the curve.
    ///
    /// # Errors
    ///
    /// As [`arclen`](Self::arclen).
    pub fn length(&self) -> Result<f64, CurveError> {
        Ok(self.arclen()?.length())
    }

    /// Split a clamped parameter into segment index and local parameter.
    pub(crate) fn locate(&self, p: f64, side: Side) -> (usize, f64) {
        let n = self.segments.len();
        let p = p.clamp(0.0, n as f64);
        let whole = p.floor();
        let i = whole as usize;
        if whole == p && i != 0 && (i == n || side == Side::Left) {
            (i - 1, 1.0)
        } else {
            (i, p - whole)
        }
    }

    pub(crate) fn point_at_param(&self, p: f64, side: Side) -> Point {
        let (i, t) = self.locate(p, side);
        self.segments[i].eval(t)
    }

    pub(crate) fn frame_at_param(&self, p: f64, side: Side) -> Frame {
        let (i, t) = self.locate(p, side);
        self.segments[i].frame(t)
    }

    /// Convert a position in `mode` to a curve parameter in `[0, N]`.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for a NaN or infinite `t`.
    pub fn to_parameter(&self, t: f64, mode: ParamMode) -> Result<f64, CurveError> {
        let t = CurveError::check_finite("t", t)?;
        let p = match mode {
            ParamMode::Parameter => t,
            ParamMode::Length => self.arclen()?.fraction_to_parameter(t.clamp(0.0, 1.0))?,
        };
        Ok(p.clamp(0.0, self.segments.len() as f64))
    }

    /// The segment index and local parameter of position `t`.
    ///
    /// On a segment boundary, `side` picks the owning segment.
    ///
    /// # Errors
    ///
    /// [`CurveError::NonFinite`] for a NaN or infinite `t`.
    pub fn parameter_mapping(
        &self,
        t: f64,
        mode: ParamMode,
        side: Side,
    ) -> Result<(usize, f64), CurveError> {
        Ok(self.locate(self.to_parameter(t, mode)?, side))
    }

    /// The point at position `t`.
    ///
    /// # Errors
    ///
    /// As [`parameter_mapping`](Self::parameter_mapping).
    pub fn point_at(&self, t: f64, mode: ParamMode) -> Result<Point, CurveError> {
        let (i, u) = self.parameter_mapping(t, mode, Side::Right)?;
        Ok(self.segments[i].eval(u))
    }

    /// One third of the derivative at position `t`.
    ///
    /// # Errors
    ///
    /// As [`parameter_mapping`](Self::parameter_mapping).
    pub fn tangent_at(&self, t: f64, mode: ParamMode) -> Result<Vec2, CurveError> {
        let (i, u) = self.parameter_mapping(t, mode, Side::Right)?;
        Ok(self.segments[i].tangent(u))
    }

    /// One third of the second derivative at position `t`.
    ///
    /// # Errors
    ///
    /// As [`parameter_mapping`](Self::parameter_mapping).
    pub fn acceleration_at(&self, t: f64, mode: ParamMode) -> Result<Vec2, CurveError> {
        let (i, u) = self.parameter_mapping(t, mode, Side::Right)?;
        Ok(self.segments[i].acceleration(u))
    }

    /// Point and tangent at position `t`.
    ///
    /// # Errors
    ///
    /// As [`parameter_mapping`](Self::parameter_mapping).
    pub fn frame(&self, t: f64, mode: ParamMode) -> Result<Frame, CurveError> {
        let (i, u) = self.parameter_mapping(t, mode, Side::Right)?;
        Ok(self.segments[i].frame(u))
    }

    /// Signed curvature at position `t`.
    ///
    /// # Errors
    ///
    /// As [`parameter_mapping`](Self::parameter_mapping).
    pub fn curvature_at(&self, t: f64, mode: ParamMode) -> Result<f64, CurveError> {
        let (i, u) = self.parameter_mapping(t, mode, Side::Right)?;
        Ok(self.segments[i].curvature(u))
    }

    /// The part of the curve between normalized lengths `t1` and `t2`.
    ///
    /// A decreasing range gives the reversed piece. On a closed curve the
    /// bounds may leave `[0, 1]`: the range then wraps around the start,
    /// possibly several times.
    ///
    /// # Errors
    ///
    /// [`CurveError::OutOfDomain`] if a bound leaves `[0, 1]` on an open
    /// curve, [`CurveError::NonFinite`] for NaN or infinite bounds.
    pub fn subcurve(&self, t1: f64, t2: f64) -> Result<MultiCurve, CurveError> {
        CurveError::check_finite("t1", t1)?;
        CurveError::check_finite("t2", t2)?;
        if t1 > t2 {
            return Ok(self.subcurve(t2, t1)?.reverse());
        }
        let map = self.arclen()?;
        let mut segments = Vec::new();
        if self.is_closed() {
            for (x1, x2) in wrap_range(t1, t2, 0.0, 1.0) {
                segments.extend(self.extract(
                    map.fraction_to_parameter(x1)?,
                    map.fraction_to_parameter(x2)?,
                ));
            }
        } else {
            CurveError::check_range("t1", t1, 0.0, 1.0)?;
            CurveError::check_range("t2", t2, 0.0, 1.0)?;
            segments = self.extract(
                map.fraction_to_parameter(t1)?,
                map.fraction_to_parameter(t2)?,
            );
        }
        Ok(MultiCurve::with_segments(segments))
    }

    /// The part of the curve between parameters `t1` and `t2`.
    ///
    /// # Errors
    ///
    /// [`CurveError::OutOfDomain`] if a bound leaves `[0, N]`.
    pub fn subcurve_params(&self, t1: f64, t2: f64) -> Result<MultiCurve, CurveError> {
        if t1 > t2 {
            return Ok(self.subcurve_params(t2, t1)?.reverse());
        }
        let n = self.segments.len() as f64;
        CurveError::check_range("t1", t1, 0.0, n)?;
        CurveError::check_range("t2", t2, 0.0, n)?;
        Ok(MultiCurve::with_segments(self.extract(t1, t2)))
    }

    /// Segments covering the parameter range `p1..p2`, with `p1 <= p2`.
    fn extract(&self, p1: f64, p2: f64) -> Vec<CurveSegment> {
        let (i1, u1) = self.locate(p1, Side::Right);
        let (i2, u2) = self.locate(p2, Side::Left);
        if i1 == i2 {
            return vec![self.segments[i1].subsegment(u1..u2)];
        }
        if i1 > i2 {
            // Empty range on a segment boundary.
            return vec![CurveSegment::point(self.segments[i1].start())];
        }
        let mut result = Vec::with_capacity(i2 - i1 + 1);
        result.push(self.segments[i1].subsegment(u1..1.0));
        result.extend_from_slice(&self.segments[i1 + 1..i2]);
        result.push(self.segments[i2].subsegment(0.0..u2));
        result
    }

    /// The same curve traversed from end to start.
    #[must_use]
    pub fn reverse(&self) -> MultiCurve {
        MultiCurve::with_segments(self.segments.iter().rev().map(CurveSegment::reverse).collect())
    }

    /// This curve followed by `other`.
    ///
    /// No continuity between the two is required.
    #[must_use]
    pub fn concatenate(&self, other: &MultiCurve) -> MultiCurve {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        MultiCurve::with_segments(segments)
    }

    /// Parameters of the corners of the curve, as segment boundary indices.
    ///
    /// The list starts and ends with the ends of the curve. When a closed
    /// curve is smooth across its start, the first side wraps around it and
    /// its start is reported as a negative offset from `N`.
    ///
    /// A join where either tangent is null counts as smooth.
    pub fn side_boundaries(&self) -> &[isize] {
        self.side_boundaries
            .get_or_init(|| Box::new(self.compute_side_boundaries()))
    }

    fn compute_side_boundaries(&self) -> SmallVec<[isize; 4]> {
        let segs = &self.segments;
        let n = segs.len() as isize;
        let mut result: SmallVec<[isize; 4]> = SmallVec::new();
        for (k, w) in (1..).zip(segs.windows(2)) {
            if !is_smooth(w[0].end_offset(), w[1].start_offset()) {
                if result.is_empty() {
                    result.push(0);
                }
                result.push(k);
            }
        }
        let wraps_smoothly =
            self.is_closed() && is_smooth(segs[segs.len() - 1].end_offset(), segs[0].start_offset());
        match result.last().copied() {
            Some(last) if wraps_smoothly => result[0] = last - n,
            None if wraps_smoothly => result.extend([0, n]),
            _ => {
                if result.is_empty() {
                    result.push(0);
                }
                result.push(n);
            }
        }
        result
    }

    /// One curve per side, between consecutive corners.
    pub fn sides(&self) -> Vec<MultiCurve> {
        let n = self.segments.len();
        self.side_boundaries()
            .windows(2)
            .map(|w| {
                let end = w[1].unsigned_abs();
                let segments = if w[0] < 0 {
                    let start = n - w[0].unsigned_abs();
                    self.segments[start..]
                        .iter()
                        .chain(&self.segments[..end])
                        .copied()
                        .collect()
                } else {
                    self.segments[w[0].unsigned_abs()..end].to_vec()
                };
                MultiCurve::with_segments(segments)
            })
            .collect()
    }

    /// Normalized length at every segment boundary, from 0 to 1.
    ///
    /// # Errors
    ///
    /// As [`arclen`](Self::arclen).
    pub fn piece_lengths(&self) -> Result<Vec<f64>, CurveError> {
        let map = self.arclen()?;
        (0..=self.segments.len())
            .map(|i| map.parameter_to_fraction(i as f64))
            .collect()
    }

    /// The bounding rectangle of all anchors and control points.
    pub fn viewbox(&self) -> Rect {
        self.segments
            .iter()
            .flat_map(CurveSegment::points)
            .fold(Rect::from_point(self.first_point()), |r, p| r.union_pt(p))
    }

    /// The tight bounding rectangle of the curve.
    pub fn bounding_box(&self) -> Rect {
        self.segments
            .iter()
            .map(|s| s.bounding_box())
            .fold(Rect::from_point(self.first_point()), |r, b| r.union(b))
    }

    /// Four points per segment, read according to `form`.
    pub fn control_points(&self, form: SegmentForm) -> Vec<Point> {
        self.segments.iter().flat_map(|s| s.points_in(form)).collect()
    }

    /// Apply an affine map to every segment.
    #[must_use]
    pub fn transform(&self, affine: Affine) -> MultiCurve {
        MultiCurve::with_segments(self.segments.iter().map(|s| s.transform(affine)).collect())
    }

    /// Translate by `v`.
    #[must_use]
    pub fn translate(&self, v: Vec2) -> MultiCurve {
        self.transform(Affine::translate(v))
    }

    /// Rotate by `angle` radians about `center`.
    #[must_use]
    pub fn rotate(&self, angle: f64, center: Point) -> MultiCurve {
        self.transform(Affine::rotate_about(angle, center))
    }

    /// Point reflection through `center`.
    #[must_use]
    pub fn reflect_point(&self, center: Point) -> MultiCurve {
        self.transform(Affine::point_reflection(center))
    }

    /// Reflection across the line through `point` along `direction`.
    #[must_use]
    pub fn reflect_axis(&self, point: Point, direction: Vec2) -> MultiCurve {
        self.transform(Affine::reflect(point, direction))
    }

    /// Rotate and scale the curve so that its first and last points land
    /// on `start` and `end`.
    ///
    /// # Errors
    ///
    /// [`CurveError::OutOfDomain`] when the curve ends where it starts, so
    /// that no such map exists.
    pub fn similar(
        &self,
        start: impl Into<Point>,
        end: impl Into<Point>,
    ) -> Result<MultiCurve, CurveError> {
        let from = (self.first_point(), self.last_point());
        let affine = Affine::similarity(from, (start.into(), end.into())).ok_or(
            CurveError::OutOfDomain {
                parameter: "chord length",
                value: from.0.distance(from.1),
                min: f64::MIN_POSITIVE,
                max: f64::INFINITY,
            },
        )?;
        Ok(self.transform(affine))
    }

    /// Approximate crossings of two curves.
    ///
    /// Both curves are sampled as polylines at evenly spaced normalized
    /// lengths. Each crossing is reported as a pair of normalized lengths,
    /// one on each curve, interpolated within the crossing spans.
    ///
    /// # Errors
    ///
    /// As [`arclen`](Self::arclen), on either curve.
    pub fn intersections(a: &MultiCurve, b: &MultiCurve) -> Result<Vec<(f64, f64)>, CurveError> {
        let step = ((INTERSECTION_SAMPLES - 1) as f64).recip();
        let polyline = |curve: &MultiCurve| -> Result<Vec<Point>, CurveError> {
            (0..INTERSECTION_SAMPLES)
                .map(|i| curve.point_at(i as f64 * step, ParamMode::Length))
                .collect()
        };
        let pa = polyline(a)?;
        let pb = polyline(b)?;
        let mut result = Vec::new();
        for (i, sa) in pa.windows(2).enumerate() {
            let d1 = sa[1] - sa[0];
            for (j, sb) in pb.windows(2).enumerate() {
                let d2 = sb[1] - sb[0];
                let denom = d1.cross(d2);
                if denom == 0.0 {
                    continue;
                }
                let offset = sb[0] - sa[0];
                let s = offset.cross(d2) / denom;
                let u = offset.cross(d1) / denom;
                // Half-open spans, so a crossing on a shared vertex is
                // reported once.
                if (0.0..1.0).contains(&s) && (0.0..1.0).contains(&u) {
                    result.push(((i as f64 + s) * step, (j as f64 + u) * step));
                }
            }
        }
        Ok(result)
    }

    /// Export as a path of cubic Béziers.
    ///
    /// A new subpath starts wherever a segment does not begin at the end of
    /// the previous one. A closed curve ends with a close-path element.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut last: Option<Point> = None;
        for seg in &self.segments {
            let [p0, p1, p2, p3] = seg.points();
            if last.map_or(true, |l| !l.approx_eq_eps(p0, SUBPATH_GAP)) {
                path.move_to(p0);
            }
            path.curve_to(p1, p2, p3);
            last = Some(p3);
        }
        if self.is_closed() {
            path.close_path();
        }
        path
    }

    /// Import a path. Lines become straight segments, and a close-path
    /// element away from the subpath start adds the closing line.
    ///
    /// # Errors
    ///
    /// [`CurveError::EmptyCurve`] if the path draws nothing.
    pub fn from_bez_path(path: &BezPath) -> Result<MultiCurve, CurveError> {
        let mut segments = Vec::new();
        let mut start = Point::ORIGIN;
        let mut current = Point::ORIGIN;
        for &el in path.elements() {
            match el {
                PathEl::MoveTo(p) => {
                    start = p;
                    current = p;
                }
                PathEl::LineTo(p) => {
                    segments.push(CurveSegment::line(current, p));
                    current = p;
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    segments.push(CurveSegment::new(current, p1, p2, p3));
                    current = p3;
                }
                PathEl::ClosePath => {
                    if !current.approx_eq(start) {
                        segments.push(CurveSegment::line(current, start));
                    }
                    current = start;
                }
            }
        }
        MultiCurve::new(segments)
    }
}

fn is_smooth(incoming: Vec2, outgoing: Vec2) -> bool {
    let a = incoming.hypot();
    let b = outgoing.hypot();
    if a < NULL_TANGENT || b < NULL_TANGENT {
        if a < NULL_TANGENT && b < NULL_TANGENT {
            log::warn!("null tangents on both sides of a segment boundary");
        }
        return true;
    }
    ((-outgoing) / b - incoming / a).hypot() < SMOOTH_TOLERANCE
}

/// The copy starts with empty caches.
impl Clone for MultiCurve {
    fn clone(&self) -> Self {
        MultiCurve::with_segments(self.segments.clone())
    }
}

impl fmt::Debug for MultiCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiCurve")
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}

/// SVG path data.
impl fmt::Display for MultiCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_bez_path(), f)
    }
}

impl PartialEq for MultiCurve {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl TryFrom<Vec<CurveSegment>> for MultiCurve {
    type Error = CurveError;

    fn try_from(segments: Vec<CurveSegment>) -> Result<Self, Self::Error> {
        MultiCurve::new(segments)
    }
}

impl From<MultiCurve> for Vec<CurveSegment> {
    fn from(curve: MultiCurve) -> Self {
        curve.segments
    }
}

impl From<CurveSegment> for MultiCurve {
    fn from(segment: CurveSegment) -> Self {
        MultiCurve::from_segment(segment)
    }
}

impl Add for MultiCurve {
    type Output = MultiCurve;

    fn add(mut self, other: MultiCurve) -> MultiCurve {
        self.segments.extend(other.segments);
        MultiCurve::with_segments(self.segments)
    }
}

impl Mul<MultiCurve> for Affine {
    type Output = MultiCurve;

    #[inline]
    fn mul(self, curve: MultiCurve) -> MultiCurve {
        curve.transform(self)
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use rand::Rng;

    use crate::{
        shapes, CurveError, CurveSegment, MultiCurve, ParamCurve, ParamMode, Point, Rect,
        SegmentForm, Side, Vec2,
    };

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!((p1 - p0).hypot() < epsilon, "{p0:?} != {p1:?}");
    }

    fn bezier() -> MultiCurve {
        MultiCurve::raw((0.0, 1.0), (1.0, 1.0), (0.0, 0.0), (1.0, 0.0))
    }

    fn s_curve() -> MultiCurve {
        MultiCurve::raw((0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0))
    }

    fn square() -> MultiCurve {
        MultiCurve::new(vec![
            CurveSegment::line((0.0, 0.0), (1.0, 0.0)),
            CurveSegment::line((1.0, 0.0), (1.0, 1.0)),
            CurveSegment::line((1.0, 1.0), (0.0, 1.0)),
            CurveSegment::line((0.0, 1.0), (0.0, 0.0)),
        ])
        .unwrap()
    }

    #[test]
    fn empty_curve() {
        assert_eq!(MultiCurve::new(vec![]), Err(CurveError::EmptyCurve));
        assert_eq!(MultiCurve::raws(&[]), Err(CurveError::EmptyCurve));
        assert_eq!(
            MultiCurve::vectors(&[(Point::ZERO, Vec2::ZERO)]),
            Err(CurveError::EmptyCurve)
        );
    }

    #[test]
    fn parameter_mapping_boundaries() {
        let curve = bezier() + bezier().reverse();
        let map = |t, side| curve.parameter_mapping(t, ParamMode::Parameter, side).unwrap();
        assert_eq!(map(0.5, Side::Right), (0, 0.5));
        assert_eq!(map(1.0, Side::Right), (1, 0.0));
        assert_eq!(map(1.0, Side::Left), (0, 1.0));
        assert_eq!(map(0.0, Side::Left), (0, 0.0));
        assert_eq!(map(2.0, Side::Right), (1, 1.0));
        assert_eq!(map(-3.0, Side::Right), (0, 0.0));
        assert_eq!(map(7.0, Side::Left), (1, 1.0));
        assert!(matches!(
            curve.parameter_mapping(f64::NAN, ParamMode::Length, Side::Right),
            Err(CurveError::NonFinite { .. })
        ));
    }

    #[test]
    fn length_mode_midpoint() {
        // Symmetric halves: half the length is the junction.
        let curve = bezier() + bezier().reverse();
        let (i, t) = curve
            .parameter_mapping(0.5, ParamMode::Length, Side::Right)
            .unwrap();
        assert!((i as f64 + t - 1.0).abs() < 1e-9);
        assert_near(
            curve.point_at(0.5, ParamMode::Length).unwrap(),
            Point::new(1.0, 0.0),
            1e-9,
        );
    }

    #[test]
    fn evaluation_modes() {
        let curve = MultiCurve::line((0.0, 0.0), (4.0, 0.0));
        assert_near(
            curve.point_at(0.25, ParamMode::Length).unwrap(),
            Point::new(1.0, 0.0),
            1e-9,
        );
        assert_near(
            curve.point_at(2.0, ParamMode::Length).unwrap(),
            Point::new(4.0, 0.0),
            1e-9,
        );
        let tangent = curve.tangent_at(0.3, ParamMode::Parameter).unwrap();
        assert!((tangent - Vec2::new(4.0 / 3.0, 0.0)).hypot() < 1e-12);
        let acc = curve.acceleration_at(0.3, ParamMode::Parameter).unwrap();
        assert!(acc.hypot() < 1e-12);
        let frame = curve.frame(0.5, ParamMode::Length).unwrap();
        assert!((frame.normal() - Vec2::new(0.0, 1.0)).hypot() < 1e-12);
        let circle = shapes::circle(Point::ORIGIN, 10.0);
        let k = circle.curvature_at(0.3, ParamMode::Length).unwrap();
        assert!((k - 0.1).abs() < 3e-3);
    }

    #[test]
    fn closedness() {
        assert!(shapes::circle(Point::ORIGIN, 1.0).is_closed());
        assert!(square().is_closed());
        assert!(!bezier().is_closed());
        assert!(MultiCurve::point((2.0, 2.0)).is_closed());
    }

    #[test]
    fn side_boundaries() {
        assert_eq!(bezier().side_boundaries(), &[0, 1]);
        assert_eq!(shapes::circle(Point::ORIGIN, 5.0).side_boundaries(), &[0, 4]);
        assert_eq!(square().side_boundaries(), &[0, 1, 2, 3, 4]);
        // Open, smooth at 1, corner at 2.
        let open = MultiCurve::new(vec![
            CurveSegment::line((0.0, 0.0), (1.0, 0.0)),
            CurveSegment::line((1.0, 0.0), (2.0, 0.0)),
            CurveSegment::line((2.0, 0.0), (2.0, 1.0)),
        ])
        .unwrap();
        assert_eq!(open.side_boundaries(), &[0, 2, 3]);
        let sides = open.sides();
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[0].segment_count(), 2);
        assert_eq!(sides[1].segment_count(), 1);
    }

    #[test]
    fn null_tangents_are_smooth() {
        // The second segment leaves its start with a null offset, then turns.
        let open = MultiCurve::line((0.0, 0.0), (1.0, 0.0))
            + MultiCurve::raw((1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (1.0, 2.0));
        assert_eq!(open.side_boundaries(), &[0, 2]);
        // Null offset at the start of a closed curve, corners at 1 and 2.
        let closed = MultiCurve::new(vec![
            CurveSegment::new((0.0, 0.0), (0.0, 0.0), (2.0, 0.0), (3.0, 0.0)),
            CurveSegment::line((3.0, 0.0), (3.0, 3.0)),
            CurveSegment::line((3.0, 3.0), (0.0, 0.0)),
        ])
        .unwrap();
        assert!(closed.is_closed());
        assert_eq!(closed.side_boundaries(), &[-1, 1, 2]);
        let sides = closed.sides();
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[0].segments(), &[closed.segments()[2], closed.segments()[0]]);
        // Null on both sides.
        assert_eq!(MultiCurve::point((2.0, 2.0)).side_boundaries(), &[0, 1]);
    }

    #[test]
    fn side_wrapping_the_start() {
        // Closed, smooth across the start and at 1 and 4, corners at 2 and 3.
        let curve = MultiCurve::new(vec![
            CurveSegment::line((0.0, 0.0), (1.0, 0.0)),
            CurveSegment::line((1.0, 0.0), (2.0, 0.0)),
            CurveSegment::line((2.0, 0.0), (2.0, 1.0)),
            CurveSegment::line((2.0, 1.0), (-1.0, 1.0)),
            CurveSegment::new((-1.0, 1.0), (-2.0, 1.0), (-1.0, 0.0), (0.0, 0.0)),
        ])
        .unwrap();
        assert!(curve.is_closed());
        assert_eq!(curve.side_boundaries(), &[-2, 2, 3]);
        let sides = curve.sides();
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[0].segment_count(), 4);
        assert_eq!(sides[0].segments()[0], curve.segments()[3]);
        assert_eq!(sides[0].segments()[3], curve.segments()[1]);
        assert_eq!(sides[1].segments(), &curve.segments()[2..3]);
    }

    #[test]
    fn subcurve_endpoints() {
        let curve = s_curve() + s_curve().translate(Vec2::new(100.0, 100.0));
        let mut rng = rand::rng();
        for _ in 0..20 {
            let t1: f64 = rng.random_range(0.0..1.0);
            let t2: f64 = rng.random_range(0.0..1.0);
            let sub = curve.subcurve(t1, t2).unwrap();
            assert_near(
                sub.first_point(),
                curve.point_at(t1, ParamMode::Length).unwrap(),
                1e-6,
            );
            assert_near(
                sub.last_point(),
                curve.point_at(t2, ParamMode::Length).unwrap(),
                1e-6,
            );
        }
        let whole = curve.subcurve(0.0, 1.0).unwrap();
        assert_eq!(whole.segment_count(), 2);
        assert_near(whole.segments()[0].eval(0.3), curve.segments()[0].eval(0.3), 1e-9);
    }

    #[test]
    fn subcurve_domain() {
        let curve = bezier();
        assert!(matches!(
            curve.subcurve(-0.5, 0.5),
            Err(CurveError::OutOfDomain { parameter: "t1", .. })
        ));
        assert!(curve.subcurve(0.2, f64::INFINITY).is_err());
        assert!(curve.subcurve_params(0.0, 1.5).is_err());
        let piece = curve.subcurve_params(0.75, 0.25).unwrap();
        assert_near(piece.first_point(), curve.segments()[0].eval(0.75), 1e-12);
        assert_near(piece.last_point(), curve.segments()[0].eval(0.25), 1e-12);
    }

    #[test]
    fn subcurve_on_boundary() {
        let curve = square();
        let sub = curve.subcurve_params(1.0, 3.0).unwrap();
        assert_eq!(sub.segment_count(), 2);
        assert_near(sub.first_point(), Point::new(1.0, 0.0), 1e-12);
        assert_near(sub.last_point(), Point::new(0.0, 1.0), 1e-12);
        let empty = curve.subcurve_params(2.0, 2.0).unwrap();
        assert_eq!(empty.segment_count(), 1);
        assert!(empty.segments()[0].is_point());
    }

    #[test]
    fn subcurve_wraps_closed_curves() {
        let curve = square();
        let sub = curve.subcurve(-0.125, 0.125).unwrap();
        assert_near(sub.first_point(), Point::new(0.0, 0.5), 1e-9);
        assert_near(sub.last_point(), Point::new(0.5, 0.0), 1e-9);
        assert_near(sub.segments()[0].end(), Point::new(0.0, 0.0), 1e-9);
        let length = sub.length().unwrap();
        assert!((length - 1.0).abs() < 1e-9);
        let longer = curve.subcurve(0.5, 1.75).unwrap();
        assert!((longer.length().unwrap() - 5.0).abs() < 1e-9);
        // A start a rounding error below 0 stays at the start.
        let circle = shapes::circle(Point::ORIGIN, 10.0);
        let quarter = circle.subcurve(-1e-17, 0.25).unwrap();
        assert!(!quarter.segments()[0].is_point());
        assert_near(quarter.first_point(), Point::new(10.0, 0.0), 1e-9);
        let expected = circle.length().unwrap() / 4.0;
        assert!((quarter.length().unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn reverse_is_involution() {
        let curve = s_curve() + bezier();
        assert_eq!(curve.reverse().reverse(), curve);
        assert_eq!(curve.reverse().first_point(), curve.last_point());
    }

    #[test]
    fn translate_round_trip() {
        let curve = s_curve();
        let v = Vec2::new(3.5, -2.25);
        let back = curve.translate(v).translate(-v);
        for (p, q) in back
            .control_points(SegmentForm::Raw)
            .iter()
            .zip(curve.control_points(SegmentForm::Raw))
        {
            assert_near(*p, q, 1e-12);
        }
        let spun = curve.rotate(FRAC_PI_2, Point::ORIGIN);
        assert_near(spun.last_point(), Point::new(-100.0, 100.0), 1e-9);
        let flipped = curve.reflect_point(Point::ORIGIN);
        assert_near(flipped.last_point(), Point::new(-100.0, -100.0), 1e-9);
        let mirrored = curve.reflect_axis(Point::ORIGIN, Vec2::new(1.0, 1.0));
        assert_near(mirrored.segments()[0].points()[1], Point::new(0.0, 100.0), 1e-9);
    }

    #[test]
    fn similar_maps_anchors() {
        let curve = bezier().similar((1.0, 4.0), (2.0, 3.0)).unwrap();
        let expected = [
            Point::new(1.0, 4.0),
            Point::new(2.0, 4.0),
            Point::new(1.0, 3.0),
            Point::new(2.0, 3.0),
        ];
        for (p, q) in curve.control_points(SegmentForm::Raw).iter().zip(expected) {
            assert_near(*p, q, 1e-12);
        }
        let scaled = bezier().similar((0.0, 1.0), (2.0, -1.0)).unwrap();
        assert_near(scaled.last_point(), Point::new(2.0, -1.0), 1e-12);
        let len = bezier().length().unwrap();
        assert!((scaled.length().unwrap() - 2.0 * len).abs() < 1e-3 * len);
        assert!(matches!(
            shapes::circle(Point::ORIGIN, 1.0).similar((0.0, 0.0), (1.0, 0.0)),
            Err(CurveError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn piece_lengths() {
        assert_eq!(bezier().piece_lengths().unwrap(), [0.0, 1.0]);
        let lengths = (bezier() + bezier().reverse()).piece_lengths().unwrap();
        assert_eq!(lengths.len(), 3);
        assert!((lengths[1] - 0.5).abs() < 1e-9);
        assert_eq!(lengths[2], 1.0);
    }

    #[test]
    fn length_of_circle() {
        let r = 20.0;
        let len = shapes::circle(Point::new(1.0, 1.0), r).length().unwrap();
        assert!((len - 2.0 * PI * r).abs() / (2.0 * PI * r) < 1e-3);
        assert_eq!(MultiCurve::point((1.0, 2.0)).length(), Ok(0.0));
    }

    #[test]
    fn bounds() {
        let curve = MultiCurve::raw((-1.0, 1.0), (0.0, -1.0), (0.0, -1.0), (1.0, 1.0));
        assert_eq!(curve.viewbox(), Rect::new(-1.0, -1.0, 1.0, 1.0));
        let bbox = curve.bounding_box();
        assert!((bbox.y0 + 0.5).abs() < 1e-12);
        assert_eq!(bbox.x1, 1.0);
    }

    #[test]
    fn control_point_forms() {
        let curve = bezier();
        assert_eq!(
            curve.control_points(SegmentForm::Tangent),
            [
                Point::new(0.0, 1.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(-1.0, 0.0),
            ]
        );
    }

    #[test]
    fn builders() {
        let curve = MultiCurve::raws(&[
            (Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(3.0, 0.0), Point::new(4.0, 1.0)),
            (Point::new(6.0, 0.0), Point::new(7.0, 1.0)),
        ])
        .unwrap();
        assert_eq!(curve.segment_count(), 2);
        assert_eq!(curve.segments()[0].points()[2], Point::new(2.0, -1.0));
        assert_eq!(curve.side_boundaries(), &[0, 2]);
        let curve = MultiCurve::vectors(&[
            (Point::new(0.0, 0.0), Vec2::new(1.0, 1.0)),
            (Point::new(3.0, 0.0), Vec2::new(1.0, -1.0)),
        ])
        .unwrap();
        assert_eq!(curve.segments()[0].end_offset(), Vec2::new(-1.0, 1.0));
        let regular = MultiCurve::vector_regular((0.0, 0.0), (0.0, 10.0), (3.0, 0.0), (0.0, 10.0));
        assert_eq!(regular.segments()[0].start_offset(), Vec2::new(0.0, 1.0));
        let v = MultiCurve::vector((0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (-1.0, 0.0));
        assert_eq!(v, MultiCurve::line((0.0, 0.0), (3.0, 0.0)));
    }

    #[test]
    fn intersections() {
        let a = MultiCurve::line((0.0, 0.0), (10.0, 10.0));
        let b = MultiCurve::line((0.0, 10.0), (10.0, 0.0));
        let hits = MultiCurve::intersections(&a, &b).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].0 - 0.5).abs() < 1e-9);
        assert!((hits[0].1 - 0.5).abs() < 1e-9);
        let far = MultiCurve::line((20.0, 0.0), (30.0, 0.0));
        assert!(MultiCurve::intersections(&a, &far).unwrap().is_empty());
        let circle = shapes::circle(Point::new(5.0, 5.0), 3.0);
        assert_eq!(MultiCurve::intersections(&a, &circle).unwrap().len(), 2);
    }

    #[test]
    fn svg_export() {
        let curve = bezier() + bezier().translate(Vec2::new(5.0, 0.0));
        assert_eq!(
            curve.to_string(),
            "M0 1 C1 1 0 0 1 0 M5 1 C6 1 5 0 6 0"
        );
        let circle = shapes::circle(Point::ORIGIN, 1.0);
        assert!(circle.to_string().ends_with('Z'));
        assert_eq!(circle.to_string().matches('M').count(), 1);
    }

    #[test]
    fn bez_path_import() {
        let curve = square();
        let path = curve.to_bez_path();
        let back = MultiCurve::from_bez_path(&path).unwrap();
        assert_eq!(back, curve);
        let parsed = crate::BezPath::from_svg("M0 0 L1 0 L1 1 Z").unwrap();
        let closed = MultiCurve::from_bez_path(&parsed).unwrap();
        assert_eq!(closed.segment_count(), 3);
        assert!(closed.is_closed());
        assert_eq!(
            MultiCurve::from_bez_path(&crate::BezPath::new()),
            Err(CurveError::EmptyCurve)
        );
    }

    #[test]
    fn shared_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MultiCurve>();
        let curve = shapes::circle(Point::ORIGIN, 2.0);
        let len = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| curve.length())).collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(len.windows(2).all(|w| w[0] == w[1]));
    }
}
