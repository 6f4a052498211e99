//! Distances from points to a plane and the classifications built on them.

use serde::{Deserialize, Serialize};

use super::{Plane, PlaneError};
use crate::points::{to_array, to_vector};
use crate::separation::Separation;

/// A point index paired with the sign of its signed distance to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedIndex {
    pub index: usize,
    /// `1` above the plane, `-1` below it, `0` exactly on it.
    pub sign: i8,
}

/// How far apart two consecutive sorted distances may be while still
/// belonging to the same group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Absolute gap, in the units of the coordinates.
    Delta(f64),
    /// Gap relative to the largest unsigned distance of the point set.
    DeltaFactor(f64),
}

impl Default for Grouping {
    fn default() -> Self {
        Grouping::DeltaFactor(0.05)
    }
}

impl Grouping {
    /// Absolute gap for a given set of signed distances.
    fn resolve(&self, distances: &[f64]) -> Result<f64, PlaneError> {
        let (value, name) = match *self {
            Grouping::Delta(delta) => (delta, "delta"),
            Grouping::DeltaFactor(factor) => (factor, "delta_factor"),
        };
        if !value.is_finite() || value < 0.0 {
            return Err(PlaneError::InvalidArgument(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
        Ok(match self {
            Grouping::Delta(_) => value,
            Grouping::DeltaFactor(_) => {
                value * distances.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()))
            }
        })
    }
}

/// Unsigned distances, sorted indices and proximity groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceGroups {
    /// Unsigned distances, in input order.
    pub distances: Vec<f64>,
    /// Input indices sorted by increasing distance.
    pub sorted: Vec<usize>,
    /// Consecutive runs of `sorted` with near-equal distances.
    pub groups: Vec<Vec<usize>>,
}

/// Signed counterpart of [`DistanceGroups`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedDistanceGroups {
    /// Signed distances, in input order.
    pub distances: Vec<f64>,
    /// Input indices sorted by increasing unsigned distance, with their sign.
    pub sorted: Vec<SignedIndex>,
    pub groups: Vec<Vec<SignedIndex>>,
}

impl Plane {
    /// Signed perpendicular distance, positive on the side the normal points to.
    pub fn signed_distance(&self, point: &[f64; 3]) -> f64 {
        self.normal().dot(&to_vector(point)) + self.d()
    }

    /// Unsigned perpendicular distance.
    pub fn distance_to_point(&self, point: &[f64; 3]) -> f64 {
        self.signed_distance(point).abs()
    }

    /// Signed distances of all points, in input order.
    pub fn distances(&self, points: &[[f64; 3]]) -> Vec<f64> {
        points.iter().map(|p| self.signed_distance(p)).collect()
    }

    /// Whether `point` lies within `tolerance` of the plane.
    pub fn is_in_plane(&self, point: &[f64; 3], tolerance: f64) -> bool {
        self.distance_to_point(point) <= tolerance
    }

    /// Distance from the origin to the plane.
    pub fn distance_to_origin(&self) -> f64 {
        self.d().abs()
    }

    /// Vector from the origin to its orthogonal projection on the plane.
    pub fn vector_to_origin(&self) -> [f64; 3] {
        to_array(&(self.normal() * -self.d()))
    }

    pub fn crosses_origin(&self, tolerance: f64) -> bool {
        self.distance_to_origin() <= tolerance
    }

    /// Split point indices into those below, in, and above the plane.
    ///
    /// A point is in the plane when its distance is at most `tolerance`;
    /// otherwise the sign of its signed distance decides. Input order is kept
    /// within each group.
    pub fn indices_separate(&self, points: &[[f64; 3]], tolerance: f64) -> Separation {
        let mut separation = Separation::default();
        for (index, point) in points.iter().enumerate() {
            let distance = self.signed_distance(point);
            if distance.abs() <= tolerance {
                separation.in_plane.push(index);
            } else if distance < 0.0 {
                separation.below.push(index);
            } else {
                separation.above.push(index);
            }
        }
        separation
    }

    /// Unsigned distances (input order) and indices sorted by distance.
    ///
    /// Ties keep their input order.
    pub fn distances_indices_sorted(&self, points: &[[f64; 3]]) -> (Vec<f64>, Vec<usize>) {
        let signed = self.distances(points);
        let sorted = sort_by_distance(&signed);
        (signed.into_iter().map(f64::abs).collect(), sorted)
    }

    /// Signed distances (input order) and indices sorted by unsigned distance,
    /// each tagged with the sign of its distance.
    pub fn signed_distances_indices_sorted(
        &self,
        points: &[[f64; 3]],
    ) -> (Vec<f64>, Vec<SignedIndex>) {
        let signed = self.distances(points);
        let sorted = sort_by_distance(&signed)
            .into_iter()
            .map(|index| signed_index(index, &signed))
            .collect();
        (signed, sorted)
    }

    /// Sort points by distance and chain near-equal distances into groups.
    pub fn distances_indices_groups(
        &self,
        points: &[[f64; 3]],
        grouping: Grouping,
    ) -> Result<DistanceGroups, PlaneError> {
        let signed = self.distances(points);
        let delta = grouping.resolve(&signed)?;
        let sorted = sort_by_distance(&signed);
        let groups = chain_groups(&sorted, &signed, delta, |index| index);
        Ok(DistanceGroups {
            distances: signed.into_iter().map(f64::abs).collect(),
            sorted,
            groups,
        })
    }

    /// Signed variant of [`Plane::distances_indices_groups`].
    pub fn signed_distances_indices_groups(
        &self,
        points: &[[f64; 3]],
        grouping: Grouping,
    ) -> Result<SignedDistanceGroups, PlaneError> {
        let signed = self.distances(points);
        let delta = grouping.resolve(&signed)?;
        let order = sort_by_distance(&signed);
        let groups = chain_groups(&order, &signed, delta, |index| signed_index(index, &signed));
        let sorted = order
            .into_iter()
            .map(|index| signed_index(index, &signed))
            .collect();
        Ok(SignedDistanceGroups {
            distances: signed,
            sorted,
            groups,
        })
    }
}

fn signed_index(index: usize, signed: &[f64]) -> SignedIndex {
    let d = signed[index];
    let sign = if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    };
    SignedIndex { index, sign }
}

/// Stable sort of indices by unsigned distance.
fn sort_by_distance(signed: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..signed.len()).collect();
    order.sort_by(|&i, &j| signed[i].abs().total_cmp(&signed[j].abs()));
    order
}

/// Walk the sorted indices, closing the current group whenever the next
/// unsigned distance exceeds the previous one by more than `delta`.
fn chain_groups<T>(
    order: &[usize],
    signed: &[f64],
    delta: f64,
    tag: impl Fn(usize) -> T,
) -> Vec<Vec<T>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut previous: Option<f64> = None;
    for &index in order {
        let distance = signed[index].abs();
        if let Some(prev) = previous {
            if distance - prev > delta {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(tag(index));
        previous = Some(distance);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
