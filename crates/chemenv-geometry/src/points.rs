//! Small vector helpers shared by the plane routines.
//!
//! Points cross the public API as plain `[f64; 3]` arrays; the arithmetic is
//! done on nalgebra vectors.

use nalgebra::Vector3;

/// Convert a coordinate triple into a nalgebra vector.
#[inline]
pub fn to_vector(p: &[f64; 3]) -> Vector3<f64> {
    Vector3::new(p[0], p[1], p[2])
}

/// Convert a nalgebra vector back into a coordinate triple.
#[inline]
pub fn to_array(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Arithmetic mean of a set of points, or `None` for an empty set.
pub fn centroid(points: &[[f64; 3]]) -> Option<[f64; 3]> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(to_vector).sum();
    Some(to_array(&(sum / points.len() as f64)))
}

/// Check whether three points are collinear.
///
/// The test is on the area of the triangle they span: the points are
/// collinear when that area does not exceed `tolerance`.
pub fn collinear(p1: &[f64; 3], p2: &[f64; 3], p3: &[f64; 3], tolerance: f64) -> bool {
    triangle_area(p1, p2, p3) <= tolerance
}

/// Area of the triangle spanned by three points.
pub fn triangle_area(p1: &[f64; 3], p2: &[f64; 3], p3: &[f64; 3]) -> f64 {
    let a = to_vector(p1);
    0.5 * (to_vector(p2) - a).cross(&(to_vector(p3) - a)).norm()
}
