// Copyright 2018 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common mathematical operations

#![allow(missing_docs)]

use arrayvec::ArrayVec;
use smallvec::SmallVec;

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("curvine requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs;
    fn atan2(self, other: Self) -> Self => atan2;
    fn copysign(self, sign: Self) -> Self => copysign;
    fn floor(self) -> Self => floor;
    fn hypot(self, other: Self) -> Self => hypot;
    fn powi(self, n: i32) -> Self => pow;
    fn sin_cos(self) -> (Self, Self) => sincos;
    fn sqrt(self) -> Self => sqrt;
}

/// Default tolerance for comparing points, as used by closedness checks.
pub const POINT_EPSILON: f64 = 1e-9;

/// Find real roots of quadratic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² = 0.
///
/// If the equation is nearly linear, the root of the linear part is
/// returned. When all coefficients are zero, so that every x is a
/// solution, a single `0.0` is returned.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    let mut result = ArrayVec::new();
    let sc0 = c0 * c2.recip();
    let sc1 = c1 * c2.recip();
    if !sc0.is_finite() || !sc1.is_finite() {
        // c2 is zero or very small, treat as linear eqn
        let root = -c0 / c1;
        if root.is_finite() {
            result.push(root);
        } else if c0 == 0.0 && c1 == 0.0 {
            result.push(0.0);
        }
        return result;
    }
    let arg = sc1 * sc1 - 4. * sc0;
    let root1 = if !arg.is_finite() {
        // sc1 * sc1 overflowed; take one root from sc1 x + x² = 0.
        -sc1
    } else {
        if arg < 0.0 {
            return result;
        } else if arg == 0.0 {
            result.push(-0.5 * sc1);
            return result;
        }
        // See https://math.stackexchange.com/questions/866331
        -0.5 * (sc1 + arg.sqrt().copysign(sc1))
    };
    let root2 = sc0 / root1;
    if root2.is_finite() {
        if root2 > root1 {
            result.push(root1);
            result.push(root2);
        } else {
            result.push(root2);
            result.push(root1);
        }
    } else {
        result.push(root1);
    }
    result
}

/// Solve the symmetric-or-not 2×2 linear system
///
/// ```text
/// | a11 a12 | |x|   |r1|
/// | a21 a22 | |y| = |r2|
/// ```
///
/// by Cramer's rule.
///
/// Returns `None` when the determinant is negligible relative to the
/// magnitude of the diagonal and off-diagonal products, which covers both
/// singular and badly conditioned systems.
pub fn solve_2x2(a11: f64, a12: f64, a21: f64, a22: f64, r1: f64, r2: f64) -> Option<(f64, f64)> {
    let det = a11 * a22 - a12 * a21;
    let scale = (a11 * a22).abs().max((a12 * a21).abs());
    if scale == 0.0 || det.abs() <= 1e-12 * scale {
        return None;
    }
    let x = (r1 * a22 - a12 * r2) / det;
    let y = (a11 * r2 - a21 * r1) / det;
    if x.is_finite() && y.is_finite() {
        Some((x, y))
    } else {
        None
    }
}

/// Wrap `value` into `[min, max)` with period `max - min`.
///
/// A zero-sized interval maps everything onto `min`.
pub fn wrap(value: f64, min: f64, max: f64) -> f64 {
    let size = max - min;
    if size <= 0.0 {
        return min;
    }
    let r = (value - min) % size;
    let wrapped = if r < 0.0 { r + size + min } else { r + min };
    // A tiny negative remainder can round up onto `max`.
    if wrapped >= max {
        min
    } else {
        wrapped
    }
}

/// Split an increasing range `lo..hi` against the periodic domain
/// `min..max` into the ordered list of in-domain sub-ranges it covers.
///
/// ```
/// use curvine::common::wrap_range;
///
/// let pieces = wrap_range(-0.25, 1.5, 0.0, 1.0);
/// assert_eq!(pieces.as_slice(), &[(0.75, 1.0), (0.0, 1.0), (0.0, 0.5)]);
/// ```
pub fn wrap_range(lo: f64, hi: f64, min: f64, max: f64) -> SmallVec<[(f64, f64); 3]> {
    let size = max - min;
    let mut result = SmallVec::new();
    if size <= 0.0 {
        result.push((min, min));
        return result;
    }
    let t1 = wrap(lo, min, max);
    let t2 = wrap(hi, min, max);
    // A bound just below a period boundary wraps onto it; count it in the
    // next period.
    let period = |x: f64, t: f64| {
        let s = ((x - min) / size).floor();
        if t == min && x - min > (s + 0.5) * size {
            s + 1.0
        } else {
            s
        }
    };
    let s1 = period(lo, t1);
    let s2 = period(hi, t2);
    if s1 == s2 {
        result.push((t1, t2));
    } else {
        result.push((t1, max));
        let full_turns = s2 - s1 - 1.0;
        let mut k = 0.0;
        while k < full_turns {
            result.push((min, max));
            k += 1.0;
        }
        if t2 > min {
            result.push((min, t2));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::common::*;
    use arrayvec::ArrayVec;

    fn verify<const N: usize>(mut roots: ArrayVec<f64, N>, expected: &[f64]) {
        assert_eq!(expected.len(), roots.len());
        let epsilon = 1e-12;
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for i in 0..expected.len() {
            assert!((roots[i] - expected[i]).abs() < epsilon);
        }
    }

    #[test]
    fn test_solve_quadratic() {
        verify(
            solve_quadratic(-5.0, 0.0, 1.0),
            &[-(5.0f64.sqrt()), 5.0f64.sqrt()],
        );
        verify(solve_quadratic(5.0, 0.0, 1.0), &[]);
        verify(solve_quadratic(5.0, 1.0, 0.0), &[-5.0]);
        verify(solve_quadratic(1.0, 2.0, 1.0), &[-1.0]);
    }

    #[test]
    fn test_solve_2x2() {
        let (x, y) = solve_2x2(2.0, 1.0, 1.0, 3.0, 5.0, 10.0).unwrap();
        assert!((x - 1.0).abs() < 1e-12);
        assert!((y - 3.0).abs() < 1e-12);
        assert!(solve_2x2(1.0, 2.0, 2.0, 4.0, 1.0, 1.0).is_none());
        assert!(solve_2x2(0.0, 0.0, 0.0, 0.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(1.25, 0.0, 1.0), 0.25);
        assert_eq!(wrap(-0.25, 0.0, 1.0), 0.75);
        assert_eq!(wrap(1.5, -1.0, 1.5), -1.0);
        assert_eq!(wrap(3.0, 2.0, 2.0), 2.0);
        assert_eq!(wrap(-1e-17, 0.0, 1.0), 0.0);
        assert_eq!(wrap(-1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_wrap_range() {
        assert_eq!(wrap_range(0.2, 0.7, 0.0, 1.0).as_slice(), &[(0.2, 0.7)]);
        assert_eq!(
            wrap_range(0.5, 1.25, 0.0, 1.0).as_slice(),
            &[(0.5, 1.0), (0.0, 0.25)]
        );
        // A range ending exactly on the period boundary stays in one piece.
        assert_eq!(wrap_range(0.0, 1.0, 0.0, 1.0).as_slice(), &[(0.0, 1.0)]);
        // Just below the boundary, `lo` folds onto it instead of leaving an
        // empty piece at the period end.
        assert_eq!(wrap_range(-1e-17, 0.25, 0.0, 1.0).as_slice(), &[(0.0, 0.25)]);
        assert_eq!(
            wrap_range(-1.0, 0.25, 0.0, 1.0).as_slice(),
            &[(0.0, 1.0), (0.0, 0.25)]
        );
        assert_eq!(wrap_range(-0.5, -1e-17, 0.0, 1.0).as_slice(), &[(0.5, 1.0)]);
        let expected = [(1.3, 1.5), (-1.0, 1.5), (-1.0, -0.1)];
        let pieces = wrap_range(-1.2, 2.4, -1.0, 1.5);
        assert_eq!(pieces.len(), expected.len());
        for (&(a, b), &(c, d)) in pieces.iter().zip(&expected) {
            assert!((a - c).abs() < 1e-12 && (b - d).abs() < 1e-12);
        }
    }
}
