//! Planes in 3D space.
//!
//! A [`Plane`] is the set of points satisfying `a·x + b·y + c·z + d = 0`.
//! Planes are immutable values built either exactly (from three points or
//! from coefficients) or by fitting a point cloud (see [`FitStrategy`]).
//!
//! Coefficients are stored in a canonical scale: `(a, b, c)` is the unit
//! normal and the first non-zero of `a, b, c` is positive. Two coefficient
//! tuples that differ by a non-zero factor therefore produce the same stored
//! plane, up to rounding.
//!
//! Every plane also carries three reference points lying on it. For planes
//! built from three points these are the input points; otherwise they are
//! synthesised deterministically from the coefficients.

mod distance;
mod fit;
mod projection;

pub use distance::{DistanceGroups, Grouping, SignedDistanceGroups, SignedIndex};
pub use projection::ProjectionOrigin;

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::points::{to_array, to_vector};

/// Relative threshold below which the cross product of two edge vectors is
/// considered zero, i.e. the three points are collinear.
const COLLINEAR_RTOL: f64 = 1e-12;

/// Absolute and relative tolerances used when comparing canonical
/// coefficients.
const SAME_PLANE_ATOL: f64 = 1e-8;
const SAME_PLANE_RTOL: f64 = 1e-5;

/// Errors raised when building or fitting a plane.
#[derive(Debug, Error)]
pub enum PlaneError {
    #[error("Degenerate plane: {0}")]
    Degenerate(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Objective used to fit a plane through more than three points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// Minimise the sum of squared perpendicular distances.
    #[default]
    LeastSquareDistance,
    /// Minimise the largest perpendicular distance (minimax / Chebyshev fit).
    MaximumDistance,
}

impl FitStrategy {
    /// All available strategies.
    pub const ALL: [FitStrategy; 2] = [
        FitStrategy::LeastSquareDistance,
        FitStrategy::MaximumDistance,
    ];

    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            FitStrategy::LeastSquareDistance => "least_square_distance",
            FitStrategy::MaximumDistance => "maximum_distance",
        }
    }
}

impl fmt::Display for FitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitStrategy {
    type Err = PlaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                PlaneError::InvalidArgument(format!(
                    "unknown fit strategy '{}' (expected one of: {})",
                    s,
                    FitStrategy::ALL.map(|st| st.name()).join(", ")
                ))
            })
    }
}

/// A plane `a·x + b·y + c·z + d = 0` with three reference points on it.
#[derive(Debug, Clone, Serialize)]
pub struct Plane {
    coefficients: [f64; 4],
    normal_vector: [f64; 3],
    p1: [f64; 3],
    p2: [f64; 3],
    p3: [f64; 3],
}

impl Plane {
    /// Exact plane through three points.
    ///
    /// The normal is `(p2 - p1) × (p3 - p1)`, so the input points are kept as
    /// reference points. Fails with [`PlaneError::Degenerate`] when the points
    /// are collinear or coincident.
    pub fn from_3points(p1: [f64; 3], p2: [f64; 3], p3: [f64; 3]) -> Result<Self, PlaneError> {
        let v1 = to_vector(&p1);
        let e1 = to_vector(&p2) - v1;
        let e2 = to_vector(&p3) - v1;
        let normal = e1.cross(&e2);

        let scale = e1.norm() * e2.norm();
        if !(normal.norm() > COLLINEAR_RTOL * scale) {
            return Err(PlaneError::Degenerate(format!(
                "points {:?}, {:?} and {:?} are collinear",
                p1, p2, p3
            )));
        }

        let d = -normal.dot(&v1);
        Self::build([normal.x, normal.y, normal.z, d], Some([p1, p2, p3]))
    }

    /// Plane with the given equation coefficients.
    ///
    /// Three reference points are synthesised on the plane: the foot of the
    /// perpendicular from the origin, plus one unit step along each of two
    /// orthonormal in-plane directions.
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64) -> Result<Self, PlaneError> {
        Self::build([a, b, c, d], None)
    }

    fn build(raw: [f64; 4], reference: Option<[[f64; 3]; 3]>) -> Result<Self, PlaneError> {
        if raw.iter().any(|x| !x.is_finite()) {
            return Err(PlaneError::Degenerate(format!(
                "non-finite plane coefficients {:?}",
                raw
            )));
        }
        let norm = (raw[0] * raw[0] + raw[1] * raw[1] + raw[2] * raw[2]).sqrt();
        if norm == 0.0 {
            return Err(PlaneError::Degenerate("normal vector is zero".into()));
        }

        let leading = raw[..3].iter().copied().find(|&x| x != 0.0).unwrap_or(0.0);
        let scale = if leading < 0.0 { -1.0 / norm } else { 1.0 / norm };
        let coefficients = raw.map(|x| x * scale);
        let normal = Vector3::new(coefficients[0], coefficients[1], coefficients[2]);

        let [p1, p2, p3] = match reference {
            Some(points) => points,
            None => synthesise_reference_points(&normal, coefficients[3]),
        };

        Ok(Self {
            coefficients,
            normal_vector: to_array(&normal),
            p1,
            p2,
            p3,
        })
    }

    /// Canonical coefficients `[a, b, c, d]`.
    pub fn coefficients(&self) -> [f64; 4] {
        self.coefficients
    }

    pub fn a(&self) -> f64 {
        self.coefficients[0]
    }

    pub fn b(&self) -> f64 {
        self.coefficients[1]
    }

    pub fn c(&self) -> f64 {
        self.coefficients[2]
    }

    pub fn d(&self) -> f64 {
        self.coefficients[3]
    }

    /// Unit normal vector `(a, b, c) / ‖(a, b, c)‖`.
    pub fn normal_vector(&self) -> [f64; 3] {
        self.normal_vector
    }

    pub fn p1(&self) -> [f64; 3] {
        self.p1
    }

    pub fn p2(&self) -> [f64; 3] {
        self.p2
    }

    pub fn p3(&self) -> [f64; 3] {
        self.p3
    }

    /// The three reference points lying on the plane.
    pub fn reference_points(&self) -> [[f64; 3]; 3] {
        [self.p1, self.p2, self.p3]
    }

    pub(crate) fn normal(&self) -> Vector3<f64> {
        to_vector(&self.normal_vector)
    }

    /// Whether `other` describes the same set of points.
    ///
    /// Coefficients are compared in canonical scale, against both signs of
    /// `other` so that a leading coefficient that is zero up to rounding does
    /// not flip the comparison.
    pub fn is_same_plane_as(&self, other: &Plane) -> bool {
        let negated = other.coefficients.map(|x| -x);
        allclose(&self.coefficients, &other.coefficients)
            || allclose(&self.coefficients, &negated)
    }

    /// Whether any plane of `planes` is the same plane as this one.
    pub fn is_in_list(&self, planes: &[Plane]) -> bool {
        planes.iter().any(|plane| self.is_same_plane_as(plane))
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.coefficients;
        writeln!(f, "Plane")?;
        writeln!(
            f,
            "  normal vector : [{:.6}, {:.6}, {:.6}]",
            self.normal_vector[0], self.normal_vector[1], self.normal_vector[2]
        )?;
        write!(
            f,
            "  equation      : {:.6}x {} {:.6}y {} {:.6}z {} {:.6} = 0",
            a,
            sign_char(b),
            b.abs(),
            sign_char(c),
            c.abs(),
            sign_char(d),
            d.abs()
        )
    }
}

fn sign_char(x: f64) -> char {
    if x < 0.0 {
        '-'
    } else {
        '+'
    }
}

fn allclose(lhs: &[f64; 4], rhs: &[f64; 4]) -> bool {
    lhs.iter()
        .zip(rhs)
        .all(|(x, y)| (x - y).abs() <= SAME_PLANE_ATOL + SAME_PLANE_RTOL * x.abs().max(y.abs()))
}

/// Three points on the plane `n·x + d = 0`, for a unit normal `n`.
fn synthesise_reference_points(normal: &Vector3<f64>, d: f64) -> [[f64; 3]; 3] {
    let foot = -normal * d;

    // Cross with the axis the normal is least aligned with.
    let mut axis = 0;
    for k in 1..3 {
        if normal[k].abs() < normal[axis].abs() {
            axis = k;
        }
    }
    let u = normal.cross(&Vector3::ith(axis, 1.0)).normalize();
    let v = normal.cross(&u);

    [to_array(&foot), to_array(&(foot + u)), to_array(&(foot + v))]
}
