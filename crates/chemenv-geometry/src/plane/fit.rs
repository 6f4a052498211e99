//! Best-fit planes through point clouds.
//!
//! Two objectives are supported (see [`FitStrategy`]):
//!
//! - **Least squares**: minimise $\sum_i d_i^2$ over perpendicular distances
//!   $d_i$. The optimal plane passes through the centroid and its normal is
//!   the eigenvector of the smallest eigenvalue of the centred scatter matrix.
//! - **Minimax**: minimise $\max_i |d_i|$. This is the mid-plane of the
//!   thinnest slab containing all points. The thinnest slab touches the
//!   convex hull either on a facet and a vertex or on two skew edges, so its
//!   normal is a facet normal or the cross product of two hull edges. Only
//!   hull features are enumerated; ties go to the earliest candidate.

use log::{debug, warn};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use rayon::prelude::*;

use super::{FitStrategy, Plane, PlaneError};
use crate::hull::{ConvexHull, HullShape};
use crate::points::to_vector;

/// Relative size below which an eigenvalue or cross product counts as zero.
const DEGENERATE_RTOL: f64 = 1e-12;

/// Relative size of the middle eigenvalue below which the least-squares
/// normal is poorly determined (points almost collinear).
const ILL_CONDITIONED_RTOL: f64 = 1e-8;

impl Plane {
    /// Best-fit plane through `points` (at least three).
    ///
    /// Exactly three points give the exact plane through them, whatever the
    /// strategy.
    pub fn from_npoints(points: &[[f64; 3]], strategy: FitStrategy) -> Result<Self, PlaneError> {
        match points.len() {
            n if n < 3 => Err(PlaneError::InvalidArgument(format!(
                "at least 3 points are needed to fit a plane, got {}",
                n
            ))),
            3 => Self::from_3points(points[0], points[1], points[2]),
            _ => match strategy {
                FitStrategy::LeastSquareDistance => Self::from_npoints_least_square_distance(points),
                FitStrategy::MaximumDistance => Self::from_npoints_maximum_distance(points),
            },
        }
    }

    /// Plane minimising the sum of squared distances to `points`.
    pub fn from_npoints_least_square_distance(points: &[[f64; 3]]) -> Result<Self, PlaneError> {
        if points.is_empty() {
            return Err(PlaneError::InvalidArgument("no points to fit".into()));
        }
        let vectors: Vec<Vector3<f64>> = points.iter().map(to_vector).collect();
        let centre = vectors.iter().sum::<Vector3<f64>>() / vectors.len() as f64;

        let mut scatter = Matrix3::<f64>::zeros();
        for v in &vectors {
            let r = v - centre;
            scatter += r * r.transpose();
        }

        let eigen = SymmetricEigen::new(scatter);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));
        let [smallest, middle, largest] = order.map(|i| eigen.eigenvalues[i]);

        if !(largest > 0.0) {
            return Err(PlaneError::Degenerate(format!(
                "all {} points coincide",
                points.len()
            )));
        }
        if middle <= DEGENERATE_RTOL * largest {
            return Err(PlaneError::Degenerate(format!(
                "all {} points are collinear",
                points.len()
            )));
        }
        if middle <= ILL_CONDITIONED_RTOL * largest {
            warn!(
                "Least-squares plane fit is ill-conditioned: eigenvalues {:.3e}, {:.3e}, {:.3e}",
                smallest, middle, largest
            );
        }

        let normal: Vector3<f64> = eigen.eigenvectors.column(order[0]).into_owned();
        let d = -normal.dot(&centre);
        debug!(
            "Least-squares plane through {} points: residual sum of squares {:.3e}",
            points.len(),
            smallest.max(0.0)
        );
        Self::build([normal.x, normal.y, normal.z, d], None)
    }

    /// Plane minimising the largest distance to `points`.
    pub fn from_npoints_maximum_distance(points: &[[f64; 3]]) -> Result<Self, PlaneError> {
        let vectors: Vec<Vector3<f64>> = points.iter().map(to_vector).collect();
        let normal = match ConvexHull::build(&vectors) {
            HullShape::Linear => {
                return Err(PlaneError::Degenerate(format!(
                    "{} points do not span a plane",
                    points.len()
                )))
            }
            HullShape::Flat([i, j, k]) => (vectors[j] - vectors[i])
                .cross(&(vectors[k] - vectors[i]))
                .normalize(),
            HullShape::Solid(hull) => thinnest_direction(&hull, &vectors),
        };

        let (low, high) = extent(&normal, &vectors);
        debug!(
            "Minimax plane through {} points: half-width {:.3e}",
            points.len(),
            0.5 * (high - low)
        );
        Self::build([normal.x, normal.y, normal.z, -0.5 * (low + high)], None)
    }

    /// Value of the fit objective of `strategy` for this plane.
    ///
    /// Distances use the normalised equation, so the result does not depend on
    /// the scale (or sign) of the coefficients the plane was built from.
    pub fn fit_error(&self, points: &[[f64; 3]], strategy: FitStrategy) -> f64 {
        match strategy {
            FitStrategy::LeastSquareDistance => self.fit_least_square_distance_error(points),
            FitStrategy::MaximumDistance => self.fit_maximum_distance_error(points),
        }
    }

    /// Sum of squared distances.
    pub fn fit_least_square_distance_error(&self, points: &[[f64; 3]]) -> f64 {
        points
            .iter()
            .map(|p| self.signed_distance(p).powi(2))
            .sum()
    }

    /// Largest distance (0 for an empty set).
    pub fn fit_maximum_distance_error(&self, points: &[[f64; 3]]) -> f64 {
        points
            .iter()
            .map(|p| self.distance_to_point(p))
            .fold(0.0, f64::max)
    }
}

/// Normal of the thinnest slab containing the hull.
///
/// Facets are tried first; their best width bounds the edge-pair search, and
/// each edge-pair candidate stops scanning vertices as soon as it is no
/// thinner than the best found so far.
fn thinnest_direction(hull: &ConvexHull, vectors: &[Vector3<f64>]) -> Vector3<f64> {
    let support: Vec<Vector3<f64>> = hull.vertices().into_iter().map(|i| vectors[i]).collect();

    let (facet_width, facet_normal) = hull
        .faces()
        .par_iter()
        .map(|face| {
            let (low, high) = extent(&face.normal, &support);
            (high - low, face.normal)
        })
        .reduce(
            || (f64::INFINITY, Vector3::z()),
            |a, b| if b.0 < a.0 { b } else { a },
        );

    let edges: Vec<Vector3<f64>> = hull
        .edges()
        .into_iter()
        .map(|(u, v)| vectors[v] - vectors[u])
        .collect();
    let edge_pair = (0..edges.len())
        .into_par_iter()
        .filter_map(|a| {
            let mut bound = facet_width;
            let mut best = None;
            for e2 in &edges[a + 1..] {
                let normal = edges[a].cross(e2);
                let norm = normal.norm();
                if !(norm > DEGENERATE_RTOL * edges[a].norm() * e2.norm()) {
                    continue;
                }
                let normal = normal / norm;
                if let Some(width) = width_below(&normal, &support, bound) {
                    bound = width;
                    best = Some((width, normal));
                }
            }
            best
        })
        .reduce_with(|a, b| if b.0 < a.0 { b } else { a });

    edge_pair.map_or(facet_normal, |(_, normal)| normal)
}

/// Width of the points along `normal`, if strictly below `bound`.
fn width_below(normal: &Vector3<f64>, vectors: &[Vector3<f64>], bound: f64) -> Option<f64> {
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for v in vectors {
        let x = normal.dot(v);
        low = low.min(x);
        high = high.max(x);
        if high - low >= bound {
            return None;
        }
    }
    Some(high - low)
}

/// Smallest and largest projection of the points on `normal`.
fn extent(normal: &Vector3<f64>, vectors: &[Vector3<f64>]) -> (f64, f64) {
    vectors
        .iter()
        .map(|v| normal.dot(v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        })
}
