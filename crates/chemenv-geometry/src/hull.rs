//! Incremental 3D convex hull.
//!
//! Faces are triangles stored with outward unit normals; coplanar hull facets
//! come out triangulated. Points closer than `HULL_RTOL × extent` to the
//! current hull are treated as inside, so near-degenerate input never yields
//! flipped or zero-area faces.

use std::collections::{BTreeSet, HashSet};

use nalgebra::Vector3;

/// Visibility threshold relative to the size of the point set.
const HULL_RTOL: f64 = 1e-10;

/// A triangular face with its outward unit normal and offset, such that
/// `normal · p - offset` is the signed distance of `p` from the face plane.
#[derive(Debug, Clone)]
pub(crate) struct Face {
    pub vertices: [usize; 3],
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Face {
    fn new(vertices: [usize; 3], points: &[Vector3<f64>]) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        let normal = (b - a).cross(&(c - a)).normalize();
        Self {
            vertices,
            offset: normal.dot(&a),
            normal,
        }
    }

    fn height(&self, point: &Vector3<f64>) -> f64 {
        self.normal.dot(point) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Convex hull of a point set spanning three dimensions.
#[derive(Debug, Clone)]
pub(crate) struct ConvexHull {
    faces: Vec<Face>,
}

/// Dimension of a point set, up to the hull tolerance.
#[derive(Debug, Clone)]
pub(crate) enum HullShape {
    /// The points span 3D space.
    Solid(ConvexHull),
    /// All points lie in the plane of the three given points.
    Flat([usize; 3]),
    /// All points lie on a line, or coincide.
    Linear,
}

impl ConvexHull {
    /// Build the hull of `points`, or report the lower dimension they span.
    pub fn build(points: &[Vector3<f64>]) -> HullShape {
        // Initial simplex: extreme point, farthest point, farthest from the
        // line, farthest from the plane.
        let Some(i0) = farthest(points, |p| -p.x) else {
            return HullShape::Linear;
        };
        let Some(i1) = farthest(points, |p| (p - points[i0]).norm()) else {
            return HullShape::Linear;
        };
        let extent = (points[i1] - points[i0]).norm();
        let scale = points.iter().map(|p| p.norm()).fold(extent, f64::max);
        if !(extent > HULL_RTOL * scale) {
            return HullShape::Linear;
        }
        let eps = HULL_RTOL * extent;

        let axis = (points[i1] - points[i0]).normalize();
        let line_distance = |p: &Vector3<f64>| (p - points[i0]).cross(&axis).norm();
        let Some(i2) = farthest(points, line_distance) else {
            return HullShape::Linear;
        };
        if line_distance(&points[i2]) <= eps {
            return HullShape::Linear;
        }

        let base = Face::new([i0, i1, i2], points);
        let Some(i3) = farthest(points, |p| base.height(p).abs()) else {
            return HullShape::Flat([i0, i1, i2]);
        };
        if base.height(&points[i3]).abs() <= eps {
            return HullShape::Flat([i0, i1, i2]);
        }

        // Orient the base so the fourth point lies behind it.
        let base = if base.height(&points[i3]) > 0.0 {
            [i0, i2, i1]
        } else {
            [i0, i1, i2]
        };
        let [a, b, c] = base;
        let mut faces: Vec<Face> = [[a, b, c], [a, i3, b], [b, i3, c], [c, i3, a]]
            .into_iter()
            .map(|vertices| Face::new(vertices, points))
            .collect();

        let seeds = [i0, i1, i2, i3];
        for (index, point) in points.iter().enumerate() {
            if seeds.contains(&index) {
                continue;
            }
            let visible: Vec<bool> = faces.iter().map(|f| f.height(point) > eps).collect();
            if !visible.contains(&true) {
                continue;
            }

            let visible_edges: HashSet<(usize, usize)> = faces
                .iter()
                .zip(&visible)
                .filter(|&(_, &v)| v)
                .flat_map(|(f, _)| f.edges())
                .collect();

            let mut kept = Vec::with_capacity(faces.len() + 2);
            let mut horizon = Vec::new();
            for (face, is_visible) in faces.into_iter().zip(visible) {
                if !is_visible {
                    kept.push(face);
                    continue;
                }
                for (u, v) in face.edges() {
                    if !visible_edges.contains(&(v, u)) {
                        horizon.push((u, v));
                    }
                }
            }
            kept.extend(
                horizon
                    .into_iter()
                    .map(|(u, v)| Face::new([u, v, index], points)),
            );
            faces = kept;
        }

        HullShape::Solid(ConvexHull { faces })
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Indices of the hull vertices, ascending.
    pub fn vertices(&self) -> Vec<usize> {
        let set: BTreeSet<usize> = self.faces.iter().flat_map(|f| f.vertices).collect();
        set.into_iter().collect()
    }

    /// Undirected hull edges `(low, high)`, ascending.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let set: BTreeSet<(usize, usize)> = self
            .faces
            .iter()
            .flat_map(|f| f.edges())
            .map(|(u, v)| (u.min(v), u.max(v)))
            .collect();
        set.into_iter().collect()
    }
}

/// Index maximising `key`, first one on ties.
fn farthest(points: &[Vector3<f64>], key: impl Fn(&Vector3<f64>) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let value = key(p);
        if best.map_or(true, |(_, b)| value > b) {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors(points: &[[f64; 3]]) -> Vec<Vector3<f64>> {
        points.iter().map(|p| Vector3::new(p[0], p[1], p[2])).collect()
    }

    fn solid(points: &[Vector3<f64>]) -> ConvexHull {
        match ConvexHull::build(points) {
            HullShape::Solid(hull) => hull,
            other => panic!("expected a solid hull, got {:?}", other),
        }
    }

    #[test]
    fn test_cube_with_interior_points() {
        let mut points = Vec::new();
        for i in 0..8 {
            points.push([(i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64]);
        }
        points.push([0.5, 0.5, 0.5]);
        points.push([0.25, 0.7, 0.1]);
        let points = vectors(&points);
        let hull = solid(&points);

        assert_eq!(hull.vertices(), (0..8).collect::<Vec<_>>());
        // Each square facet is split into two triangles.
        assert_eq!(hull.faces().len(), 12);
        assert_eq!(hull.edges().len(), 18);
        for face in hull.faces() {
            for p in &points {
                assert!(face.height(p) <= 1e-12, "point outside face {:?}", face.vertices);
            }
        }
    }

    #[test]
    fn test_euler_characteristic_of_scattered_points() {
        let points: Vec<Vector3<f64>> = (0..60)
            .map(|i| {
                let t = i as f64;
                Vector3::new((t * 1.7).sin() * 3.0, (t * 0.9).cos() * 2.0, (t * 2.3).sin() * (t * 0.4).cos())
            })
            .collect();
        let hull = solid(&points);
        let (v, e, f) = (hull.vertices().len(), hull.edges().len(), hull.faces().len());
        assert_eq!(v + f, e + 2);
        assert_eq!(2 * e, 3 * f);
        for face in hull.faces() {
            for p in &points {
                assert!(face.height(p) <= 1e-9);
            }
        }
    }

    #[test]
    fn test_lower_dimensional_sets() {
        let flat = vectors(&[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.3, 0.3, 1.0]]);
        assert!(matches!(ConvexHull::build(&flat), HullShape::Flat(_)));

        let line = vectors(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [2.0, 4.0, 6.0]]);
        assert!(matches!(ConvexHull::build(&line), HullShape::Linear));

        assert!(matches!(ConvexHull::build(&vectors(&[[1.0, 1.0, 1.0]; 4])), HullShape::Linear));
        assert!(matches!(ConvexHull::build(&[]), HullShape::Linear));
    }
}
