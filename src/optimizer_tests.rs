use super::*;
use crate::predicates::{twice_contour_area, twice_signed_area};
use approx::assert_relative_eq;

fn coords(pts: &[(f64, f64)]) -> Vec<Coord<f64>> {
    pts.iter().map(|&(x, y)| Coord { x, y }).collect()
}

fn total_twice_area(points: &[Coord<f64>], tris: &[Triangle]) -> f64 {
    tris.iter()
        .map(|t| twice_signed_area(points[t[0]], points[t[1]], points[t[2]]))
        .sum()
}

fn has_edge(tris: &[Triangle], a: usize, b: usize) -> bool {
    tris.iter().any(|t| {
        (0..3).any(|k| {
            let (u, v) = (t[k], t[(k + 1) % 3]);
            (u, v) == (a, b) || (u, v) == (b, a)
        })
    })
}

fn min_comfort(points: &[Coord<f64>], tris: &[Triangle]) -> Option<f64> {
    let graph = EdgeGraph::build(tris).unwrap();
    graph
        .canonical_internal_edges()
        .filter_map(|e| edge_comfort(points, tris, &graph, e))
        .reduce(f64::min)
}

#[test]
fn test_square_terminates_without_flipping() {
    let points = coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    let mut tris: Vec<Triangle> = vec![[0, 1, 2], [0, 2, 3]];

    let report = optimize_projected(&points, &mut tris, 1e-10, true).unwrap();
    assert_eq!(report, OptimizeReport { internal_edges: 1, flips: 0 });
    assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(min_comfort(&points, &tris), Some(0.0));
}

#[test]
fn test_sliver_diagonal_is_flipped() {
    let points = coords(&[(0.0, 0.0), (1.0, -0.1), (2.0, 0.0), (1.0, 0.1)]);
    let mut tris: Vec<Triangle> = vec![[0, 1, 2], [0, 2, 3]];

    let graph = EdgeGraph::build(&tris).unwrap();
    let diagonal = graph.canonical_internal_edges().next().unwrap();
    assert!(edge_comfort(&points, &tris, &graph, diagonal).unwrap() < 0.0);

    let report = optimize_projected(&points, &mut tris, 1e-10, true).unwrap();
    assert_eq!(report.flips, 1);
    assert!(has_edge(&tris, 1, 3));
    assert!(!has_edge(&tris, 0, 2));
    assert!(min_comfort(&points, &tris).unwrap() > 0.0);
    for t in &tris {
        assert!(twice_signed_area(points[t[0]], points[t[1]], points[t[2]]) > 0.0);
    }
}

#[test]
fn test_flip_threshold_scales_with_fourth_power_of_eps() {
    let points = coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.01, 0.99)]);
    let initial: Vec<Triangle> = vec![[0, 1, 2], [0, 2, 3]];

    // Comfort of diagonal 0-2, as seen from its canonical direction.
    let c = quad_comfort(points[2], points[3], points[0], points[1]);
    assert!(c < 0.0);

    let mut tris = initial.clone();
    let loose = (2.0 * c.abs()).powf(0.25);
    let report = optimize_projected(&points, &mut tris, loose, true).unwrap();
    assert_eq!(report.flips, 0);
    assert_eq!(tris, initial);

    let mut tris = initial.clone();
    let tight = (0.5 * c.abs()).powf(0.25);
    let report = optimize_projected(&points, &mut tris, tight, true).unwrap();
    assert_eq!(report.flips, 1);
    assert!(has_edge(&tris, 1, 3));
}

fn convex_octagon() -> Vec<Coord<f64>> {
    coords(&[
        (0.0, 0.0),
        (4.0, -1.0),
        (7.0, 0.0),
        (9.0, 2.0),
        (8.0, 5.0),
        (5.0, 7.0),
        (1.0, 6.0),
        (-1.0, 3.0),
    ])
}

fn fan(n: usize) -> Vec<Triangle> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

#[test]
fn test_fan_converges_to_locally_delaunay() {
    let points = convex_octagon();
    let contour: Vec<usize> = (0..points.len()).collect();
    let mut tris = fan(points.len());

    let report = optimize_projected(&points, &mut tris, 1e-10, true).unwrap();
    assert_eq!(report.internal_edges, 5);
    assert!(report.flips > 0);
    assert_eq!(tris.len(), 6);

    for t in &tris {
        assert!(twice_signed_area(points[t[0]], points[t[1]], points[t[2]]) > 0.0);
    }
    assert_relative_eq!(
        total_twice_area(&points, &tris),
        twice_contour_area(&points, &contour)
    );
    assert!(min_comfort(&points, &tris).unwrap() >= 0.0);
}

#[test]
fn test_second_run_is_a_fixed_point() {
    let points = convex_octagon();
    let mut tris = fan(points.len());
    optimize_projected(&points, &mut tris, 1e-10, false).unwrap();

    let settled = tris.clone();
    let report = optimize_projected(&points, &mut tris, 1e-10, true).unwrap();
    assert_eq!(report.flips, 0);
    assert_eq!(tris, settled);
}

#[test]
fn test_empty_and_single_triangle() {
    let points = coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);

    let mut none: Vec<Triangle> = Vec::new();
    let report = optimize_projected(&points, &mut none, 1e-10, true).unwrap();
    assert_eq!(report, OptimizeReport::default());

    let mut one: Vec<Triangle> = vec![[0, 1, 2]];
    let report = optimize_projected(&points, &mut one, 1e-10, true).unwrap();
    assert_eq!(report, OptimizeReport { internal_edges: 0, flips: 0 });
}

#[test]
fn test_optimize_triangulation_in_plane() {
    // The sliver diamond lifted into the xz plane of 3-D space
    let verts = vec![
        [0.0, 5.0, 0.0],
        [1.0, 5.0, -0.1],
        [2.0, 5.0, 0.0],
        [1.0, 5.0, 0.1],
    ];
    let mut tris: Vec<Triangle> = vec![[0, 1, 2], [0, 2, 3]];
    let report =
        optimize_triangulation(&verts, &mut tris, WorkPlane::new(0, 2), 1e-10, true).unwrap();
    assert_eq!(report.flips, 1);
    assert!(has_edge(&tris, 1, 3));
}

#[test]
fn test_optimize_triangulation_rejects_bad_input() {
    let verts = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

    let mut tris: Vec<Triangle> = vec![[0, 1, 7]];
    let err = optimize_triangulation(&verts, &mut tris, WorkPlane::default(), 1e-10, false)
        .unwrap_err();
    assert!(matches!(err, TriangulationError::InvalidInput(_)));

    let mut tris: Vec<Triangle> = vec![[0, 1, 2]];
    let err = optimize_triangulation(&verts, &mut tris, WorkPlane::new(0, 2), 1e-10, false)
        .unwrap_err();
    assert!(matches!(err, TriangulationError::InvalidInput(_)));

    let err = optimize_triangulation(&verts, &mut tris, WorkPlane::default(), f64::NAN, false)
        .unwrap_err();
    assert!(matches!(err, TriangulationError::InvalidInput(_)));
}

#[test]
fn test_optimize_triangulation_rejects_malformed_vertices() {
    let ragged = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0]];
    let mut tris: Vec<Triangle> = vec![[0, 1, 2]];
    let err = optimize_triangulation(&ragged, &mut tris, WorkPlane::default(), 1e-10, false)
        .unwrap_err();
    assert!(matches!(err, TriangulationError::InvalidInput(_)));

    let with_nan = vec![[0.0, 0.0], [1.0, 0.0], [0.0, f64::NAN]];
    let err = optimize_triangulation(&with_nan, &mut tris, WorkPlane::default(), 1e-10, false)
        .unwrap_err();
    assert!(matches!(err, TriangulationError::InvalidInput(_)));
    assert_eq!(tris, vec![[0, 1, 2]]);
}
