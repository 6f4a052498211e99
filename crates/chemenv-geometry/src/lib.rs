//! # chemenv geometry
//!
//! Geometric primitives for coordination-environment analysis. This crate
//! provides:
//!
//! - **Planes** ([`plane`]): exact planes through three points or from
//!   coefficients, least-squares and minimax fits through point clouds,
//!   signed distances, classification of points relative to a plane,
//!   orthogonal projection and in-plane 2D coordinates.
//! - **Separations** ([`separation`]): how a plane splits a set of points,
//!   with canonical ordering and de-duplication.
//! - **Point helpers** ([`points`]): centroids and collinearity tests.
//!
//! Points are plain `[f64; 3]` arrays in whatever length unit the caller
//! uses; tolerances are absolute, in the same unit.
//!
//! ```
//! use chemenv_geometry::plane::Plane;
//!
//! let plane = Plane::from_coefficients(4.0, 2.0, -4.0, 3.0).unwrap();
//! assert!((plane.signed_distance(&[0.0, 0.0, 0.0]) - 0.5).abs() < 1e-12);
//! ```

mod hull;
pub mod plane;
pub mod points;
pub mod separation;

pub use plane::{FitStrategy, Plane, PlaneError, ProjectionOrigin};
pub use separation::Separation;
