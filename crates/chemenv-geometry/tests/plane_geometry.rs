//! Integration tests for plane construction, classification and projection.
//!
//! Most cases use the plane `4x + 2y - 4z + 3 = 0`, built from the three
//! points where it crosses the coordinate axes.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use chemenv_geometry::plane::{FitStrategy, Plane, ProjectionOrigin};

// ─────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────

const P1: [f64; 3] = [0.0, 0.0, 0.75];
const P2: [f64; 3] = [-0.75, 0.0, 0.0];
const P3: [f64; 3] = [0.0, -1.5, 0.0];

fn reference_plane() -> Plane {
    Plane::from_3points(P1, P2, P3).unwrap()
}

/// Origin, the three axis crossings and four points away from the plane.
fn classification_points() -> Vec<[f64; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 0.75],
        [-0.75, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, -1.5, 0.0],
        [10.0, 2.0, -20.0],
        [10.0, 10.0, 10.0],
        [100.0, 0.0, 0.0],
    ]
}

fn scattered_points() -> Vec<[f64; 3]> {
    vec![
        [5.1, 0.3, -2.3],
        [-2.0, 4.3, -6.3],
        [3.1, 2.3, -21.3],
        [-2.0, -0.5, 0.05],
        [11.0, 12.0, -13.0],
        [10.0, 8.3, -6.32],
    ]
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

fn scaled(plane: &Plane, factors: [f64; 4]) -> Plane {
    let c = plane.coefficients();
    Plane::from_coefficients(
        c[0] * factors[0],
        c[1] * factors[1],
        c[2] * factors[2],
        c[3] * factors[3],
    )
    .unwrap()
}

// ─────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────

#[test]
fn test_three_points_lie_on_plane_with_unit_normal() {
    let plane = reference_plane();
    for p in [P1, P2, P3] {
        assert!(plane.is_in_plane(&p, 1e-12));
    }
    for p in plane.reference_points() {
        assert!(plane.is_in_plane(&p, 1e-5));
    }
    let n = plane.normal_vector();
    assert_relative_eq!((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_fit_through_three_points_is_exact() {
    let plane = reference_plane();
    for strategy in FitStrategy::ALL {
        let fitted = Plane::from_npoints(&[P1, P2, P3], strategy).unwrap();
        assert!(plane.is_same_plane_as(&fitted), "{}", strategy);
    }
}

#[test]
fn test_fit_error_is_minimal_at_fitted_plane() {
    let points = scattered_points();
    let delta = 1e-4;
    let perturbations = [
        [1.0 + delta, 1.0, 1.0, 1.0],
        [1.0, 1.0 + delta, 1.0, 1.0],
        [1.0, 1.0, 1.0 + delta, 1.0],
        [1.0, 1.0, 1.0, 1.0 + delta],
        [1.0 - delta, 1.0 + delta, 1.0 - delta, 1.0 + delta],
    ];
    for strategy in FitStrategy::ALL {
        let plane = Plane::from_npoints(&points, strategy).unwrap();
        let best = plane.fit_error(&points, strategy);

        for factors in perturbations {
            let changed = scaled(&plane, factors);
            let error = changed.fit_error(&points, strategy);
            assert!(
                error > best,
                "{}: perturbation {:?} gave {:.12e} <= {:.12e}",
                strategy,
                factors,
                error,
                best
            );
        }

        let rescaled = scaled(&plane, [-2.1; 4]);
        assert_relative_eq!(rescaled.fit_error(&points, strategy), best, max_relative = 1e-10);
        assert!(rescaled.is_same_plane_as(&plane));
    }
}

#[test]
fn test_minimax_beats_least_squares_on_maximum_distance() {
    let points = scattered_points();
    let minimax = Plane::from_npoints(&points, FitStrategy::MaximumDistance).unwrap();
    let least = Plane::from_npoints(&points, FitStrategy::LeastSquareDistance).unwrap();
    assert!(
        minimax.fit_error(&points, FitStrategy::MaximumDistance)
            <= least.fit_error(&points, FitStrategy::MaximumDistance)
    );
    assert!(
        least.fit_error(&points, FitStrategy::LeastSquareDistance)
            <= minimax.fit_error(&points, FitStrategy::LeastSquareDistance)
    );
}

// ─────────────────────────────────────────────────────────────
// Distances and classification
// ─────────────────────────────────────────────────────────────

#[test]
fn test_is_in_plane_tolerances() {
    let plane = reference_plane();
    let n = plane.normal_vector();
    let shifted = |t: f64| [P1[0] + n[0] * t, P1[1] + n[1] * t, P1[2] + n[2] * t];

    assert!(!plane.is_in_plane(&[0.0, 0.0, 0.0], 0.001));
    assert!(plane.is_in_plane(&[1.0, 1.0, 2.25], 0.001));
    assert!(plane.is_in_plane(&[1.0, 1.0, 2.22], 0.1));
    assert!(!plane.is_in_plane(&[1.0, 1.0, 2.22], 0.001));
    assert!(plane.is_in_plane(&shifted(1.0), 1.000001));
    assert!(!plane.is_in_plane(&shifted(1.00001), 1.0));
    assert!(!plane.is_in_plane(&shifted(1.0), 0.999999));
}

#[test]
fn test_indices_separate_reference_plane() {
    let plane = reference_plane();
    let points = classification_points();

    let sep = plane.indices_separate(&points, 1e-6);
    assert_eq!((sep.below.len(), sep.in_plane.len(), sep.above.len()), (0, 3, 5));
    assert_eq!(sep.in_plane, vec![1, 2, 4]);
    assert_eq!(sep.above, vec![0, 3, 5, 6, 7]);

    let sep = plane.indices_separate(&points, 10.0);
    assert!(sep.below.is_empty());
    assert_eq!(sep.in_plane, vec![0, 1, 2, 3, 4, 6]);
    assert_eq!(sep.above, vec![5, 7]);

    let sep = plane.indices_separate(&points, 100000.0);
    assert_eq!(sep.in_plane.len(), 8);
}

#[test]
fn test_indices_separate_axis_and_oblique_planes() {
    let points = classification_points();
    let cases: [([f64; 4], f64, [&[usize]; 3]); 10] = [
        ([-4.0, 0.0, 0.0, 8.0], 1e-5, [&[0, 1, 2, 3, 4], &[], &[5, 6, 7]]),
        ([-4.0, 0.0, 0.0, 8.0], 1.0, [&[0, 1, 2, 4], &[3], &[5, 6, 7]]),
        ([0.0, 2.0, 0.0, 1.0], 1e-5, [&[4], &[], &[0, 1, 2, 3, 5, 6, 7]]),
        ([0.0, 2.0, 0.0, 1.0], 1.0, [&[], &[0, 1, 2, 3, 4, 7], &[5, 6]]),
        ([0.0, 0.0, -4.0, 3.0], 1e-5, [&[0, 2, 3, 4, 5, 7], &[1], &[6]]),
        ([0.0, 0.0, -4.0, 3.0], 0.75, [&[5], &[0, 1, 2, 3, 4, 7], &[6]]),
        ([0.0, 2.0, -1.0, 0.0], 1e-5, [&[1, 4], &[0, 2, 3, 7], &[5, 6]]),
        ([0.0, 2.0, -1.0, 0.0], 0.75, [&[4], &[0, 1, 2, 3, 7], &[5, 6]]),
        ([4.0, 0.0, -2.0, -20.0], 1e-5, [&[0, 1, 2, 3, 4], &[6], &[5, 7]]),
        ([-2.0, 9.0, 0.0, 2.0], 1e-5, [&[0, 1, 2, 6], &[3, 5], &[4, 7]]),
    ];
    for ([a, b, c, d], tolerance, [below, in_plane, above]) in cases {
        let plane = Plane::from_coefficients(a, b, c, d).unwrap();
        let sep = plane.indices_separate(&points, tolerance);
        let label = format!("plane {:?}, tolerance {}", [a, b, c, d], tolerance);
        assert_eq!(sep.below, below, "{}", label);
        assert_eq!(sep.in_plane, in_plane, "{}", label);
        assert_eq!(sep.above, above, "{}", label);
        assert_eq!(sep.len(), points.len(), "{}", label);
    }
}

#[test]
fn test_distances_indices_sorted() {
    let plane = reference_plane();
    let all = classification_points();
    let points = [all[0], all[1], all[3], all[5], all[6], all[7]];

    let (distances, sorted) = plane.distances_indices_sorted(&points);
    let expected = [0.5, 0.0, 7.0 / 6.0, 127.0 / 6.0, 23.0 / 6.0, 403.0 / 6.0];
    for (d, e) in distances.iter().zip(expected) {
        assert_abs_diff_eq!(*d, e, epsilon = 1e-9);
    }
    assert_eq!(sorted, vec![1, 0, 2, 4, 3, 5]);
    for pair in sorted.windows(2) {
        assert!(distances[pair[0]] <= distances[pair[1]]);
    }
}

#[test]
fn test_signed_distances_indices_sorted() {
    let plane = Plane::from_coefficients(0.0, 2.0, 0.0, 1.0).unwrap();
    let all = classification_points();
    let points = [all[0], all[4], all[5], all[6]];

    let (distances, sorted) = plane.distances_indices_sorted(&points);
    assert_eq!(sorted, vec![0, 1, 2, 3]);
    assert_abs_diff_eq!(distances[1], 1.0, epsilon = 1e-12);

    let (signed, sorted) = plane.signed_distances_indices_sorted(&points);
    for (d, e) in signed.iter().zip([0.5, -1.0, 2.5, 10.5]) {
        assert_abs_diff_eq!(*d, e, epsilon = 1e-12);
    }
    let pairs: Vec<(usize, i8)> = sorted.iter().map(|s| (s.index, s.sign)).collect();
    assert_eq!(pairs, vec![(0, 1), (1, -1), (2, 1), (3, 1)]);

    // Four points share the smallest distance with index 7.
    let (_, sorted) = plane.distances_indices_sorted(&all);
    let mut first: Vec<usize> = sorted[..5].to_vec();
    first.sort_unstable();
    assert_eq!(first, vec![0, 1, 2, 3, 7]);
}

// ─────────────────────────────────────────────────────────────
// Projections
// ─────────────────────────────────────────────────────────────

#[test]
fn test_points_on_plane_project_to_themselves() {
    let plane = reference_plane();
    let mut points = vec![P1, P2, P3];
    points.extend(plane.reference_points());

    let projected = plane.projectionpoints(&points);
    for (p, q) in points.iter().zip(&projected) {
        assert_abs_diff_eq!(distance(p, q), 0.0, epsilon = 1e-9);
    }

    let flat = plane.project_and_to2dim(&points, ProjectionOrigin::Centroid);
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            assert_relative_eq!(
                distance(&points[i], &points[j]),
                distance(&flat[i], &flat[j]),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn test_known_projections() {
    let plane = reference_plane();
    let points = [
        [0.0, 0.0, 0.0],
        [10.0, 10.0, 10.0],
        [1.2, 2.3, 3.4],
        [-1.0, -2.0, -3.0],
        [-1.0, 1.0, -1.0],
    ];
    let expected = [
        [-0.33333333, -0.16666667, 0.33333333],
        [7.44444444, 8.72222222, 12.55555556],
        [1.33333333, 2.36666667, 3.26666667],
        [-1.77777778, -2.38888889, -2.22222222],
        [-1.55555556, 0.72222222, -0.44444444],
    ];
    let projected = plane.projectionpoints(&points);
    for (p, e) in projected.iter().zip(expected) {
        for k in 0..3 {
            assert_abs_diff_eq!(p[k], e[k], epsilon = 1e-7);
        }
        assert!(plane.is_in_plane(p, 1e-7));
    }

    let from_zero = plane.project_and_to2dim(&points, ProjectionOrigin::Point([0.0; 3]));
    let from_mean = plane.project_and_to2dim(&points, ProjectionOrigin::Centroid);
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d3 = distance(&projected[i], &projected[j]);
            assert_relative_eq!(distance(&from_zero[i], &from_zero[j]), d3, epsilon = 1e-9);
            assert_relative_eq!(distance(&from_mean[i], &from_mean[j]), d3, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_centroid_origin_matches_explicit_mean() {
    let plane = reference_plane();
    let points = scattered_points();
    let n = points.len() as f64;
    let mean = [0, 1, 2].map(|k| points.iter().map(|p| p[k]).sum::<f64>() / n);

    let by_marker = plane.project_and_to2dim(&points, ProjectionOrigin::Centroid);
    let by_point = plane.project_and_to2dim(&points, ProjectionOrigin::Point(mean));
    for (a, b) in by_marker.iter().zip(&by_point) {
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-9);
        assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-9);
    }

    for p in &points {
        let xy = plane.project_and_to2dim(&[*p], ProjectionOrigin::Point(*p));
        assert_abs_diff_eq!(xy[0][0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xy[0][1], 0.0, epsilon = 1e-9);
    }
}

// ─────────────────────────────────────────────────────────────
// Equivalence
// ─────────────────────────────────────────────────────────────

#[test]
fn test_plane_comparison() {
    let plane = reference_plane();
    assert!(plane.is_same_plane_as(&Plane::from_coefficients(4.0, 2.0, -4.0, 3.0).unwrap()));
    assert!(plane.is_same_plane_as(&Plane::from_coefficients(-4.0, -2.0, 4.0, -3.0).unwrap()));
    assert!(plane.is_same_plane_as(&Plane::from_coefficients(-12.0, -6.0, 12.0, -9.0).unwrap()));
    assert!(!plane.is_same_plane_as(&Plane::from_coefficients(3.0, 0.0, 2.0, 4.0).unwrap()));
}

#[test]
fn test_plane_serialises_to_json() {
    let plane = Plane::from_coefficients(0.0, 0.0, 2.0, -1.0).unwrap();
    let json = serde_json::to_value(&plane).unwrap();
    assert_eq!(json["coefficients"][2], 1.0);
    assert_eq!(json["coefficients"][3], -0.5);
    assert_eq!(json["normal_vector"].as_array().unwrap().len(), 3);
}
