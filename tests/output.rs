// Copyright 2025 Lars Brubaker
// Triangle and edge exports.

mod helpers;

use halfedge_cdt::geom::orient;
use halfedge_cdt::{EdgeFilter, TriangulationError};
use helpers::*;

#[test]
fn triangles_are_counter_clockwise() {
    let mut tri = checked(&regular_polygon(9, 5.0));
    tri.add_interior_point(c(0.5, 0.5)).unwrap();
    tri.add_interior_point(c(-1.0, 2.0)).unwrap();
    for t in tri.triangles() {
        assert!(orient(t[0], t[1], t[2]) > 0.0, "{t:?}");
    }
}

#[test]
fn exports_work_through_a_shared_reference() {
    let mut tri = square(4.0);
    tri.add_interior_point(c(1.0, 3.0)).unwrap();
    let view: &halfedge_cdt::Triangulation = &tri;
    let first = view.triangle_handles();
    let second = view.triangle_handles();
    assert_eq!(first, second);
    assert_eq!(view.triangles().len(), view.triangle_count());
    let flags: Vec<u8> = tri.mesh().edges.iter().map(|h| h.flags).collect();
    let _ = tri.triangles();
    assert_eq!(tri.mesh().edges.iter().map(|h| h.flags).collect::<Vec<_>>(), flags);
}

#[test]
fn triangle_indices_match_caller_points() {
    let boundary = regular_polygon(5, 2.0);
    let mut tri = checked(&boundary);
    let inner = c(0.1, -0.2);
    tri.add_interior_point(inner).unwrap();

    let mut points = boundary.clone();
    points.push(inner);
    let tris = tri.triangle_indices(&points, false).unwrap();
    assert_eq!(tris.len(), 5);
    for t in &tris {
        assert!(t.contains(&5));
        let [a, b, c] = t.map(|i| points[i as usize]);
        assert!(orient(a, b, c) > 0.0);
    }

    // Nearly equal coordinates still match.
    let nudged: Vec<_> = points.iter().map(|p| c(p.x + 1e-12, p.y)).collect();
    assert_eq!(tri.triangle_indices(&nudged, true).unwrap().len(), 5);

    assert_eq!(
        tri.triangle_indices(&points[..5], false).map(|_| ()),
        Err(TriangulationError::MissingPoint(5))
    );
}

#[test]
fn triangles_inside_selects_by_centroid() {
    let mut tri = square(10.0);
    for &(x, y) in &[(2.0, 2.0), (8.0, 2.0), (2.0, 8.0), (8.0, 8.0), (5.0, 5.0)] {
        tri.add_interior_point(c(x, y)).unwrap();
    }
    let all = tri.triangles().len();
    let everything = tri.triangles_inside(&[square_points(10.0)]);
    assert_eq!(everything.len(), all);
    let left_half = vec![c(0.0, 0.0), c(0.0, 10.0), c(5.0, 10.0), c(5.0, 0.0)];
    let picked = tri.triangles_inside(&[left_half]);
    assert!(!picked.is_empty() && picked.len() < all);
    assert!(tri.triangles_inside(&[]).is_empty());
}

#[test]
fn edge_filters_partition_the_edges() {
    let mut tri = square(10.0);
    let a = tri.add_interior_point(c(2.0, 5.0)).unwrap();
    let b = tri.add_interior_point(c(8.0, 5.0)).unwrap();
    tri.add_constraint(a, b).unwrap();

    let all = tri.edges(EdgeFilter::All).len();
    let boundary = tri.edges(EdgeFilter::Boundary).len();
    let constrained = tri.edges(EdgeFilter::Constrained).len();
    let free = tri.edges(EdgeFilter::Unconstrained).len();
    assert_eq!((boundary, constrained), (4, 1));
    assert_eq!(all, boundary + constrained + free);

    let points = [c(0.0, 0.0), c(0.0, 10.0), c(10.0, 10.0), c(10.0, 0.0), c(2.0, 5.0), c(8.0, 5.0)];
    assert_eq!(tri.edge_indices(EdgeFilter::Constrained, &points).unwrap().len(), 1);
    let pair = tri.edge_indices(EdgeFilter::Constrained, &points).unwrap()[0];
    assert!(pair == [4, 5] || pair == [5, 4]);
}
