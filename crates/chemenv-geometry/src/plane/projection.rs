//! Orthogonal projection onto a plane and in-plane 2D coordinates.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::Plane;
use crate::points::{centroid, to_array, to_vector};

/// Origin of the 2D coordinate system used by [`Plane::project_and_to2dim`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OriginRepr", into = "OriginRepr")]
pub enum ProjectionOrigin {
    /// Centroid of the projected points. Written `"mean"` in configuration.
    #[default]
    Centroid,
    /// An explicit point, projected onto the plane first.
    Point([f64; 3]),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum OriginRepr {
    Marker(String),
    Point([f64; 3]),
}

const CENTROID_MARKER: &str = "mean";

impl TryFrom<OriginRepr> for ProjectionOrigin {
    type Error = String;

    fn try_from(repr: OriginRepr) -> Result<Self, Self::Error> {
        match repr {
            OriginRepr::Marker(marker) if marker == CENTROID_MARKER => Ok(ProjectionOrigin::Centroid),
            OriginRepr::Marker(marker) => Err(format!(
                "unknown projection origin '{}' (expected \"{}\" or [x, y, z])",
                marker, CENTROID_MARKER
            )),
            OriginRepr::Point(p) => Ok(ProjectionOrigin::Point(p)),
        }
    }
}

impl From<ProjectionOrigin> for OriginRepr {
    fn from(origin: ProjectionOrigin) -> Self {
        match origin {
            ProjectionOrigin::Centroid => OriginRepr::Marker(CENTROID_MARKER.into()),
            ProjectionOrigin::Point(p) => OriginRepr::Point(p),
        }
    }
}

impl Plane {
    /// Orthogonal projection of a single point onto the plane.
    pub fn project_point(&self, point: &[f64; 3]) -> [f64; 3] {
        to_array(&self.project_vector(&to_vector(point)))
    }

    /// Orthogonal projections of `points` onto the plane.
    pub fn projectionpoints(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        points.iter().map(|p| self.project_point(p)).collect()
    }

    fn project_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let n = self.normal();
        v - n * (n.dot(v) + self.d())
    }

    /// Right-handed orthonormal basis `[u, v, n]`.
    ///
    /// `u` points from the first to the second reference point, `n` is the
    /// unit normal and `v = n × u`, so that `u × v = n`.
    pub fn orthonormal_vectors(&self) -> [[f64; 3]; 3] {
        let (u, v) = self.in_plane_basis();
        [to_array(&u), to_array(&v), self.normal_vector()]
    }

    fn in_plane_basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal();
        let u = (to_vector(&self.p2()) - to_vector(&self.p1())).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// Project `points` onto the plane and express them in the in-plane basis
    /// of [`Plane::orthonormal_vectors`], relative to `origin`.
    ///
    /// Distances between the returned 2D points equal the distances between
    /// the projected 3D points, whatever the origin.
    pub fn project_and_to2dim(&self, points: &[[f64; 3]], origin: ProjectionOrigin) -> Vec<[f64; 2]> {
        let origin = match origin {
            ProjectionOrigin::Point(p) => p,
            ProjectionOrigin::Centroid => match centroid(points) {
                Some(c) => c,
                None => return Vec::new(),
            },
        };
        let (u, v) = self.in_plane_basis();
        let o = self.project_vector(&to_vector(&origin));
        points
            .iter()
            .map(|p| {
                let r = self.project_vector(&to_vector(p)) - o;
                [r.dot(&u), r.dot(&v)]
            })
            .collect()
    }
}
