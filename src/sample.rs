// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous sampling over normalized positions.
//!
//! Anything that can be evaluated at a position in `[0, 1]` implements
//! [`Samplable`]. A [`MultiCurve`] samples its points by normalized arc
//! length; [`MultiCurve::sampler`] picks another quantity and chains
//! post-processing stages onto it.

use core::fmt;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{CurveError, MultiCurve, ParamMode, Point, Vec2};

/// A value that can be evaluated at normalized positions in `[0, 1]`.
pub trait Samplable {
    /// The sampled value.
    type Output;

    /// Evaluate at position `x`.
    ///
    /// # Errors
    ///
    /// Implementation specific; typically [`CurveError::NonFinite`] for a
    /// NaN position.
    fn sample(&self, x: f64) -> Result<Self::Output, CurveError>;

    /// Evaluate at `n` evenly spaced positions from 0 to 1, both included.
    ///
    /// A single sample is taken at 0.
    ///
    /// # Errors
    ///
    /// The first error raised by [`sample`](Self::sample).
    fn samples(&self, n: usize) -> Result<Vec<Self::Output>, CurveError> {
        let step = if n > 1 { ((n - 1) as f64).recip() } else { 0.0 };
        (0..n).map(|i| self.sample(i as f64 * step)).collect()
    }

    /// Evaluate at each of `positions`.
    ///
    /// # Errors
    ///
    /// The first error raised by [`sample`](Self::sample).
    fn samples_at(&self, positions: &[f64]) -> Result<Vec<Self::Output>, CurveError> {
        positions.iter().map(|&x| self.sample(x)).collect()
    }
}

impl Samplable for MultiCurve {
    type Output = Point;

    fn sample(&self, x: f64) -> Result<Point, CurveError> {
        self.point_at(x, ParamMode::Length)
    }
}

/// A user supplied sampling function.
pub type SampleFn = dyn Fn(&MultiCurve, f64) -> Result<Vec2, CurveError> + Send + Sync;

/// The quantity a [`CurveSampler`] reads off its curve.
#[non_exhaustive]
pub enum Sampler {
    /// The position, as a vector from the origin.
    Point,
    /// One third of the derivative.
    Tangent,
    /// One third of the second derivative.
    Acceleration,
    /// An arbitrary function of the curve and a normalized length.
    Custom(Box<SampleFn>),
}

impl Sampler {
    /// Wrap a closure as a custom sampler.
    pub fn custom<F>(f: F) -> Sampler
    where
        F: Fn(&MultiCurve, f64) -> Result<Vec2, CurveError> + Send + Sync + 'static,
    {
        Sampler::Custom(Box::new(f))
    }

    fn eval(&self, curve: &MultiCurve, x: f64) -> Result<Vec2, CurveError> {
        match self {
            Sampler::Point => Ok(curve.point_at(x, ParamMode::Length)?.to_vec2()),
            Sampler::Tangent => curve.tangent_at(x, ParamMode::Length),
            Sampler::Acceleration => curve.acceleration_at(x, ParamMode::Length),
            Sampler::Custom(f) => f(curve, x),
        }
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sampler::Point => f.write_str("Point"),
            Sampler::Tangent => f.write_str("Tangent"),
            Sampler::Acceleration => f.write_str("Acceleration"),
            Sampler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// An ordered chain of transformations applied to each sample.
pub struct Pipeline<T> {
    stages: Vec<Box<dyn Fn(T) -> T + Send + Sync>>,
}

impl<T> Pipeline<T> {
    /// The empty pipeline, which passes values through unchanged.
    pub fn new() -> Self {
        Pipeline { stages: Vec::new() }
    }

    /// Append a stage, run after all the existing ones.
    #[must_use]
    pub fn then<F>(mut self, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.stages.push(Box::new(f));
        self
    }

    /// Run `value` through every stage in insertion order.
    pub fn apply(&self, value: T) -> T {
        self.stages.iter().fold(value, |v, stage| stage(v))
    }

    /// The number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Pipeline::new()
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// A [`Sampler`] bound to a curve, followed by a [`Pipeline`].
#[derive(Debug)]
pub struct CurveSampler<'a> {
    curve: &'a MultiCurve,
    sampler: Sampler,
    pipeline: Pipeline<Vec2>,
}

impl CurveSampler<'_> {
    /// Append a post-processing stage.
    #[must_use]
    pub fn then<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec2) -> Vec2 + Send + Sync + 'static,
    {
        self.pipeline = self.pipeline.then(f);
        self
    }
}

impl Samplable for CurveSampler<'_> {
    type Output = Vec2;

    fn sample(&self, x: f64) -> Result<Vec2, CurveError> {
        let v = self.sampler.eval(self.curve, x)?;
        Ok(self.pipeline.apply(v))
    }
}

impl MultiCurve {
    /// Sample `sampler` along the curve by normalized arc length.
    pub fn sampler(&self, sampler: Sampler) -> CurveSampler<'_> {
        CurveSampler {
            curve: self,
            sampler,
            pipeline: Pipeline::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{shapes, MultiCurve, ParamMode, Pipeline, Point, Samplable, Sampler, Vec2};

    #[test]
    fn curve_samples() {
        let line = MultiCurve::line((0.0, 0.0), (8.0, 0.0));
        let pts = line.samples(5).unwrap();
        assert_eq!(pts.len(), 5);
        for (i, p) in pts.iter().enumerate() {
            assert!((p.x - 2.0 * i as f64).abs() < 1e-9);
        }
        assert_eq!(line.samples(1).unwrap(), [Point::new(0.0, 0.0)]);
        assert!(line.samples(0).unwrap().is_empty());
        let at = line.samples_at(&[0.5, 2.0]).unwrap();
        assert!((at[0].x - 4.0).abs() < 1e-9);
        assert!(at[1].distance(Point::new(8.0, 0.0)) < 1e-12);
        assert!(line.samples_at(&[f64::NAN]).is_err());
    }

    #[test]
    fn sampler_kinds() {
        let line = MultiCurve::line((0.0, 0.0), (3.0, 0.0));
        let tangents = line.sampler(Sampler::Tangent).samples(3).unwrap();
        assert!(tangents.iter().all(|t| (*t - Vec2::new(1.0, 0.0)).hypot() < 1e-12));
        let acc = line.sampler(Sampler::Acceleration).sample(0.5).unwrap();
        assert!(acc.hypot() < 1e-12);
        let pos = line.sampler(Sampler::Point).sample(1.0).unwrap();
        assert!((pos - Vec2::new(3.0, 0.0)).hypot() < 1e-12);
    }

    #[test]
    fn custom_sampler_and_pipeline() {
        let circle = shapes::circle(Point::ORIGIN, 2.0);
        let normals = circle
            .sampler(Sampler::custom(|c, x| {
                Ok(c.frame(x, ParamMode::Length)?.normal())
            }))
            .then(|v| v * 2.0)
            .then(|v| v + Vec2::new(1.0, 0.0));
        // Inward normal at the start of an anticlockwise circle.
        let n0 = normals.sample(0.0).unwrap();
        assert!((n0 - Vec2::new(-1.0, 0.0)).hypot() < 1e-9);
    }

    #[test]
    fn pipeline_order() {
        let p = Pipeline::new().then(|x: f64| x + 1.0).then(|x| x * 10.0);
        assert_eq!(p.apply(1.0), 20.0);
        assert_eq!(p.len(), 2);
        assert!(Pipeline::<f64>::default().is_empty());
    }
}
