// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready-made curves and curve rewriting.

use alloc::vec::Vec;

use crate::{CurveError, CurveSegment, MultiCurve, ParamMode, Point, Vec2};

/// Control offset of a quarter circle, as a fraction of the radius.
pub const KAPPA: f64 = 0.5522847498;

/// A circle as four quarter-circle segments.
///
/// The curve starts at the rightmost point and runs anticlockwise. Its
/// last anchor is exactly its first, so the curve is closed and smooth
/// across the start. The radial error is below 0.03% of the radius.
pub fn circle(center: impl Into<Point>, radius: f64) -> MultiCurve {
    let c = center.into();
    let k = KAPPA * radius;
    let p = |x: f64, y: f64| c + Vec2::new(x, y);
    let start = p(radius, 0.0);
    MultiCurve::raw(start, p(radius, k), p(k, radius), p(0.0, radius))
        + MultiCurve::raw(p(0.0, radius), p(-k, radius), p(-radius, k), p(-radius, 0.0))
        + MultiCurve::raw(p(-radius, 0.0), p(-radius, -k), p(-k, -radius), p(0.0, -radius))
        + MultiCurve::raw(p(0.0, -radius), p(k, -radius), p(radius, -k), start)
}

/// Pull the tangents at each junction toward their common mean.
///
/// At every junction the outgoing direction of the left segment and the
/// incoming direction of the right one are interpolated toward their
/// average by `factor`: 0 leaves the curve unchanged, 1 makes every
/// junction smooth. A closed curve is also smoothed across its start.
pub fn smooth(curve: &MultiCurve, factor: f64) -> MultiCurve {
    let mut forms: Vec<_> = curve.segments().iter().map(CurveSegment::to_tangent_form).collect();
    let n = forms.len();
    let junctions = if curve.is_closed() { n } else { n - 1 };
    for k in 0..junctions {
        let (left, right) = (k, (k + 1) % n);
        let v1 = -forms[left].end_offset;
        let v2 = forms[right].start_offset;
        let mean = (v1 + v2) / 2.0;
        forms[left].end_offset = -v1.lerp(mean, factor);
        forms[right].start_offset = v2.lerp(mean, factor);
    }
    let segments = forms
        .into_iter()
        .map(|f| CurveSegment::from_tangents(f.start, f.start_offset, f.end, f.end_offset))
        .collect();
    MultiCurve::with_segments(segments)
}

/// Lay `count` copies of `motif` end to end along `support`.
///
/// The support is cut into `count` pieces of equal length and a copy of the
/// motif, rotated and scaled by [`MultiCurve::similar`], spans the chord
/// of each piece.
///
/// # Errors
///
/// [`CurveError::OutOfDomain`] if `count` is zero or the motif ends where
/// it starts.
pub fn repeat_along(
    support: &MultiCurve,
    motif: &MultiCurve,
    count: usize,
) -> Result<MultiCurve, CurveError> {
    if count == 0 {
        return Err(CurveError::OutOfDomain {
            parameter: "count",
            value: 0.0,
            min: 1.0,
            max: f64::INFINITY,
        });
    }
    let points = (0..=count)
        .map(|i| support.point_at(i as f64 / count as f64, ParamMode::Length))
        .collect::<Result<Vec<_>, _>>()?;
    let mut segments = Vec::with_capacity(count * motif.segment_count());
    for w in points.windows(2) {
        let copy: Vec<CurveSegment> = motif.similar(w[0], w[1])?.into();
        segments.extend(copy);
    }
    MultiCurve::new(segments)
}

#[cfg(test)]
mod tests {
    use core::f64::consts::PI;

    use alloc::string::ToString;

    use crate::{shapes, CurveError, MultiCurve, ParamCurve, ParamMode, Point, Vec2};

    fn assert_near(p0: Point, p1: Point) {
        assert!((p1 - p0).hypot() < 1e-9, "{p0:?} != {p1:?}");
    }

    #[test]
    fn circle_is_closed_and_round() {
        let c = Point::new(2.0, -1.0);
        let circle = shapes::circle(c, 5.0);
        assert_eq!(circle.segment_count(), 4);
        assert_eq!(circle.first_point(), circle.last_point());
        assert!(circle.is_closed());
        for i in 0..40 {
            let p = circle.point_at(i as f64 / 10.0, ParamMode::Parameter).unwrap();
            let radius = p.distance(c);
            assert!((radius - 5.0).abs() < 5.0 * 3e-4);
        }
        let len = circle.length().unwrap();
        assert!((len - 10.0 * PI).abs() < 10.0 * PI * 1e-3);
        assert!(circle.to_string().ends_with('Z'));
    }

    #[test]
    fn smooth_factor_bounds() {
        let corner = MultiCurve::line((0.0, 0.0), (1.0, 0.0)) + MultiCurve::line((1.0, 0.0), (1.0, 1.0));
        assert_eq!(shapes::smooth(&corner, 0.0), corner);
        let smoothed = shapes::smooth(&corner, 1.0);
        assert_eq!(smoothed.side_boundaries(), &[0, 2]);
        let segs = smoothed.segments();
        let mean = Vec2::new(1.0 / 6.0, 1.0 / 6.0);
        assert!((segs[0].end_offset() + mean).hypot() < 1e-12);
        assert!((segs[1].start_offset() - mean).hypot() < 1e-12);
        // Anchors never move.
        assert_near(segs[0].end(), Point::new(1.0, 0.0));
        assert_near(smoothed.last_point(), Point::new(1.0, 1.0));
    }

    #[test]
    fn smooth_closed_curve() {
        let square = MultiCurve::line((0.0, 0.0), (1.0, 0.0))
            + MultiCurve::line((1.0, 0.0), (1.0, 1.0))
            + MultiCurve::line((1.0, 1.0), (0.0, 1.0))
            + MultiCurve::line((0.0, 1.0), (0.0, 0.0));
        assert_eq!(square.side_boundaries().len(), 5);
        let round = shapes::smooth(&square, 1.0);
        assert!(round.is_closed());
        assert_eq!(round.side_boundaries(), &[0, 4]);
        let half = shapes::smooth(&square, 0.5);
        assert_eq!(half.side_boundaries().len(), 5);
    }

    #[test]
    fn repeat_motif() {
        let support = MultiCurve::line((0.0, 0.0), (10.0, 0.0));
        let bump = MultiCurve::raw((0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0));
        let waves = shapes::repeat_along(&support, &bump, 5).unwrap();
        assert_eq!(waves.segment_count(), 5);
        assert_near(waves.first_point(), Point::new(0.0, 0.0));
        assert_near(waves.last_point(), Point::new(10.0, 0.0));
        assert_near(waves.segments()[1].start(), Point::new(2.0, 0.0));
        assert_near(waves.segments()[1].points()[1], Point::new(2.0, 2.0));
        assert!(matches!(
            shapes::repeat_along(&support, &bump, 0),
            Err(CurveError::OutOfDomain { parameter: "count", .. })
        ));
        let closed = shapes::circle(Point::ORIGIN, 1.0);
        assert!(shapes::repeat_along(&support, &closed, 2).is_err());
    }
}
