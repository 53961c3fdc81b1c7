// Copyright 2025 Lars Brubaker
// End-to-end scenarios: build a boundary, edit it, check the result.

mod helpers;

use halfedge_cdt::geom::{is_left, segments_cross};
use halfedge_cdt::{EdgeFilter, EdgeKind, PointKind, Triangulation};
use helpers::*;

#[test]
fn square_boundary() {
    let mut tri = square(10.0);
    assert_eq!(tri.triangle_count(), 2);
    assert_eq!(tri.edges(EdgeFilter::Boundary).len(), 4);
    assert_eq!(tri.edges(EdgeFilter::All).len(), 5);
    assert_consistent(&mut tri);
}

#[test]
fn square_centroid() {
    let mut tri = square(10.0);
    let p = tri.add_interior_point(c(5.0, 5.0)).unwrap();
    assert_eq!(tri.triangle_count(), 4);
    for t in tri.triangle_handles() {
        assert!(t.contains(&p), "every triangle meets at the centroid: {t:?}");
    }
    assert_consistent(&mut tri);
}

#[test]
fn hexagon_split_by_constraint() {
    let hex = regular_polygon(6, 10.0);
    let mut tri = checked(&hex);
    let path = tri.add_constraint(0, 3).unwrap();
    assert_eq!(path, vec![0, 3]);

    let constrained = tri.edges(EdgeFilter::Constrained);
    assert_eq!(constrained.len(), 1);
    let [a, b] = constrained[0];
    for [u, w] in tri.edges(EdgeFilter::All) {
        assert!(!segments_cross(a, b, u, w, 1e-9), "edge {u:?}-{w:?} crosses the constraint");
    }

    // Two quadrilaterals of two triangles each.
    let (mut left, mut right) = (0, 0);
    for t in tri.triangles() {
        let centroid = c((t[0].x + t[1].x + t[2].x) / 3.0, (t[0].y + t[1].y + t[2].y) / 3.0);
        if is_left(a, b, centroid, 1e-9) {
            left += 1;
        } else {
            right += 1;
        }
    }
    assert_eq!((left, right), (2, 2));
    assert_consistent(&mut tri);
}

#[test]
fn insert_then_remove_is_legal() {
    let mut tri = checked(&regular_polygon(7, 10.0));
    for &(x, y) in &[(1.0, 2.0), (-3.0, 1.5), (2.5, -4.0)] {
        tri.add_interior_point(c(x, y)).unwrap();
    }
    let before = tri.triangle_count();
    let p = tri.add_interior_point(c(0.3, -0.7)).unwrap();
    tri.remove_interior_point(p).unwrap();
    assert_eq!(tri.triangle_count(), before);
    assert_consistent(&mut tri);
}

#[test]
fn convex_boundary_point_removal() {
    let mut tri = checked(&regular_polygon(6, 10.0));
    tri.add_interior_point(c(0.5, 0.5)).unwrap();
    tri.remove_boundary_point(1).unwrap();
    assert_eq!(tri.boundary_count(), 5);
    assert_eq!(tri.kind(1), None);
    assert_eq!(tri.boundary_points().unwrap(), vec![0, 2, 3, 4, 5]);
    assert_consistent(&mut tri);
}

#[test]
fn interactive_session() {
    let mut tri = checked(&regular_polygon(8, 20.0));
    let a = tri.add_interior_point(c(-10.0, 1.0)).unwrap();
    let b = tri.add_interior_point(c(10.0, -1.0)).unwrap();
    for &(x, y) in &[(0.0, 5.0), (0.0, -5.0), (-4.0, 3.0), (5.0, 4.0), (3.0, -8.0)] {
        tri.add_interior_point(c(x, y)).unwrap();
    }
    tri.add_constraint(a, b).unwrap();
    let e = tri.find_edge(a, b).expect("constraint edge");
    assert_eq!(tri.edge_kind(e), Some(EdgeKind::Constraint));
    assert_consistent(&mut tri);

    tri.update_interior_point(b, c(12.0, 6.0)).unwrap();
    assert!(tri.find_edge(a, b).is_some());
    assert_consistent(&mut tri);

    let q = tri.add_boundary_point_at(c(0.0, 21.0), 7).unwrap();
    assert_eq!(tri.kind(q), Some(PointKind::Boundary));
    assert_eq!(tri.boundary_count(), 9);
    assert_consistent(&mut tri);

    tri.remove_constraint(a, b).unwrap();
    assert!(tri.edges(EdgeFilter::Constrained).is_empty());
    assert_consistent(&mut tri);
}

#[test]
fn rebuild_discards_previous_mesh() {
    let mut tri = Triangulation::new();
    tri.start_with_boundary(&regular_polygon(5, 3.0), false).unwrap();
    tri.add_interior_point(c(0.0, 0.0)).unwrap();
    tri.start_with_boundary(&square_points(1.0), false).unwrap();
    assert_eq!(tri.point_count(), 4);
    assert_eq!(tri.triangle_count(), 2);
}
