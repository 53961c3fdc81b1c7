// Copyright 2025 Lars Brubaker
// Moving boundary and interior points.

mod helpers;

use halfedge_cdt::{PointKind, TriangulationError};
use helpers::*;

#[test]
fn corner_moves_outward() {
    let mut tri = square(10.0);
    tri.update_boundary_point(2, c(12.0, 12.0)).unwrap();
    assert_eq!(tri.position(2), Some(c(12.0, 12.0)));
    assert_eq!(tri.kind(2), Some(PointKind::Boundary));
    assert_eq!(tri.boundary_points().unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(tri.point_count(), 4);
    assert!((total_area(&mut tri) - 120.0).abs() < 1e-9);
    assert_consistent(&mut tri);
}

#[test]
fn corner_moves_inward_and_cuts_off_points() {
    let mut tri = square(10.0);
    let cut = tri.add_interior_point(c(9.0, 9.0)).unwrap();
    let kept = tri.add_interior_point(c(2.0, 2.0)).unwrap();
    tri.update_boundary_point(2, c(6.0, 6.0)).unwrap();
    assert_eq!(tri.position(2), Some(c(6.0, 6.0)));
    assert_eq!(tri.kind(cut), None);
    assert_eq!(tri.kind(kept), Some(PointKind::Interior));
    assert_eq!(tri.boundary_count(), 4);
    assert!((total_area(&mut tri) - 60.0).abs() < 1e-9);
    assert_consistent(&mut tri);
}

#[test]
fn inward_move_picks_up_points_on_the_new_edges() {
    let mut tri = square(10.0);
    // Lies on the new edge from (0, 10) to (6, 6).
    let on_edge = tri.add_interior_point(c(3.0, 8.0)).unwrap();
    tri.update_boundary_point(2, c(6.0, 6.0)).unwrap();
    assert_eq!(tri.kind(on_edge), Some(PointKind::Boundary));
    assert_eq!(tri.boundary_points().unwrap(), vec![0, 1, on_edge, 2, 3]);
    assert_consistent(&mut tri);
}

#[test]
fn point_slides_along_a_straight_side() {
    let mut tri = checked(&[c(0.0, 0.0), c(0.0, 10.0), c(10.0, 10.0), c(10.0, 5.0), c(10.0, 0.0)]);
    tri.update_boundary_point(3, c(10.0, 7.0)).unwrap();
    assert_eq!(tri.position(3), Some(c(10.0, 7.0)));
    assert_eq!(tri.boundary_points().unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(tri.triangle_count(), 3);
    assert_consistent(&mut tri);
}

#[test]
fn crossing_move_goes_through_the_chord() {
    let mut tri = square(10.0);
    // The new edge from (0, 10) meets the old edge (10, 10) -> (10, 0).
    tri.update_boundary_point(2, c(10.0, 5.0)).unwrap();
    assert_eq!(tri.position(2), Some(c(10.0, 5.0)));
    assert_eq!(tri.boundary_count(), 4);
    assert!((total_area(&mut tri) - 75.0).abs() < 1e-9);
    assert_consistent(&mut tri);
}

#[test]
fn self_intersecting_move_is_rejected() {
    let mut tri = square(10.0);
    assert!(matches!(
        tri.update_boundary_point(2, c(-5.0, 5.0)),
        Err(TriangulationError::IllegalPolygon(_))
    ));
    assert!(!tri.is_poisoned());
    assert_eq!(tri.position(2), Some(c(10.0, 10.0)));
    assert_eq!(
        tri.update_boundary_point(2, c(0.0, 0.0)),
        Err(TriangulationError::Coincident(2, 0))
    );
}

#[test]
fn moving_to_the_same_place_changes_nothing() {
    let mut tri = square(10.0);
    let before = tri.diagnostic_dump();
    tri.update_boundary_point(1, c(0.0, 10.0)).unwrap();
    assert_eq!(tri.diagnostic_dump(), before);
}

#[test]
fn interior_point_drags_across_the_domain() {
    let mut tri = checked(&regular_polygon(6, 10.0));
    let anchor = tri.add_interior_point(c(-5.0, 0.5)).unwrap();
    let p = tri.add_interior_point(c(1.0, 1.0)).unwrap();
    for &(x, y) in &[(2.0, -3.0), (-1.0, 4.0)] {
        tri.add_interior_point(c(x, y)).unwrap();
    }
    tri.add_constraint(anchor, p).unwrap();
    for &(x, y) in &[(3.0, 2.0), (4.5, 1.0), (5.0, -2.5), (0.5, -6.0)] {
        tri.update_interior_point(p, c(x, y)).unwrap();
        assert_eq!(tri.position(p), Some(c(x, y)));
        assert_consistent(&mut tri);
    }
    assert!(tri.find_edge(anchor, p).is_some());
}

#[test]
fn boundary_point_with_constraint_moves() {
    let mut tri = square(10.0);
    let inner = tri.add_interior_point(c(4.0, 5.0)).unwrap();
    tri.add_constraint(2, inner).unwrap();
    tri.update_boundary_point(2, c(13.0, 11.0)).unwrap();
    let e = tri.find_edge(2, inner).expect("constraint follows the corner");
    assert_eq!(tri.edge_kind(e), Some(halfedge_cdt::EdgeKind::Constraint));
    assert_consistent(&mut tri);
}

#[test]
fn constraint_endpoint_moves_across_the_domain() {
    let mut tri = checked(&regular_polygon(8, 50.0));
    for &(x, y) in &[(12.0, 6.0), (-16.0, 1.0), (-24.0, -7.0), (-8.0, 11.0)] {
        tri.add_interior_point(c(x, y)).unwrap();
    }
    tri.add_constraint(10, 11).unwrap();
    tri.update_interior_point(11, c(28.0, -15.0)).unwrap();
    let e = tri.find_edge(10, 11).expect("constraint follows the point");
    assert_eq!(tri.edge_kind(e), Some(halfedge_cdt::EdgeKind::Constraint));
    assert_consistent(&mut tri);
}

#[test]
fn removing_a_constraint_endpoint_keeps_the_mesh_delaunay() {
    let mut tri = checked(&regular_polygon(8, 50.0));
    let ids: Vec<_> = [(12.0, 6.0), (-16.0, 1.0), (-24.0, -7.0), (-8.0, 11.0), (3.0, -20.0)]
        .iter()
        .map(|&(x, y)| tri.add_interior_point(c(x, y)).unwrap())
        .collect();
    tri.add_constraint(ids[2], ids[3]).unwrap();
    tri.add_constraint(ids[3], ids[0]).unwrap();
    tri.remove_interior_point(ids[3]).unwrap();
    assert_eq!(tri.kind(ids[3]), None);
    assert!(tri.edges(halfedge_cdt::EdgeFilter::Constrained).is_empty());
    assert_consistent(&mut tri);
}
