// Copyright 2024 the Curvine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Piecewise cubic curves in 2D, parametrized by index or by arc length.
//!
//! The curvine library builds curves out of cubic [`CurveSegment`]s joined
//! end to end into a [`MultiCurve`]. A curve can be evaluated at a raw
//! segment parameter or at a fraction of its total length; the mapping
//! between the two is an [`ArcLengthMap`], built lazily by adaptive
//! flattening and queried through a [`MonotonicInterpolator`].
//!
//! On top of that sit subcurve extraction, reversal, affine transforms,
//! smooth-side detection, intersection, sampling pipelines, and least
//! squares fitting of point sequences ([`adaptive_fit`]).
//!
//! # Examples
//!
//! Evaluating by length:
//! ```
//! use curvine::{MultiCurve, ParamMode, Point};
//!
//! let l = MultiCurve::line((0.0, 0.0), (2.0, 0.0)) + MultiCurve::line((2.0, 0.0), (2.0, 8.0));
//! assert!((l.length().unwrap() - 10.0).abs() < 1e-9);
//!
//! // Halfway along the parameter is the corner, halfway along the length is not.
//! assert_eq!(l.point_at(0.5, ParamMode::Parameter).unwrap(), Point::new(2.0, 0.0));
//! let mid = l.point_at(0.5, ParamMode::Length).unwrap();
//! assert!(mid.distance(Point::new(2.0, 3.0)) < 1e-6);
//! ```
//!
//! Fitting a cubic to points:
//! ```
//! use curvine::{adaptive_fit, FitOptions, Point};
//!
//! let pts: Vec<Point> = (0..=20)
//!     .map(|i| {
//!         let x = i as f64 / 20.0;
//!         Point::new(x, x * x)
//!     })
//!     .collect();
//! let result = adaptive_fit(&pts, &FitOptions::default()).unwrap();
//! assert!(result.error < 1e-2);
//! assert_eq!(result.curve.first_point(), pts[0]);
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments. The `alloc` crate is used regardless.
//!
//! The `serde` feature derives serialization for the geometry types and
//! curves.
//!
//! [`libm`]: https://docs.rs/libm

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    reason = "numeric code reads closer to the math this way"
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("curvine requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

extern crate alloc;

mod affine;
mod arclen;
mod bezpath;
pub mod common;
mod error;
mod fit;
mod interpolate;
mod multicurve;
mod param_curve;
mod point;
mod rect;
mod sample;
mod segment;
pub mod shapes;
mod svg;
mod vec2;

pub use crate::affine::*;
pub use crate::arclen::*;
pub use crate::bezpath::*;
pub use crate::error::*;
pub use crate::fit::*;
pub use crate::interpolate::*;
pub use crate::multicurve::*;
pub use crate::param_curve::*;
pub use crate::point::*;
pub use crate::rect::*;
pub use crate::sample::*;
pub use crate::segment::*;
pub use crate::svg::*;
pub use crate::vec2::*;
