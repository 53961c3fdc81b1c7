// Copyright 2025 Lars Brubaker
// Shared test utilities for halfedge-cdt tests.

#![allow(dead_code)]

use halfedge_cdt::geom::signed_area;
use halfedge_cdt::{Coord, PointKind, TriOption, Triangulation};

pub fn c(x: f64, y: f64) -> Coord {
    Coord::new(x, y)
}

/// Axis-aligned square with its lower-left corner at the origin, clockwise.
pub fn square_points(size: f64) -> Vec<Coord> {
    vec![c(0.0, 0.0), c(0.0, size), c(size, size), c(size, 0.0)]
}

/// Regular polygon around the origin, clockwise, first point straight up.
pub fn regular_polygon(n: usize, radius: f64) -> Vec<Coord> {
    (0..n)
        .map(|i| {
            let a = std::f64::consts::FRAC_PI_2 - i as f64 * std::f64::consts::TAU / n as f64;
            c(radius * a.cos(), radius * a.sin())
        })
        .collect()
}

/// Triangulation of `boundary` that validates itself after every edit.
pub fn checked(boundary: &[Coord]) -> Triangulation {
    let mut tri = Triangulation::new();
    tri.set_option(TriOption::ValidateAfterEdit, true);
    tri.start_with_boundary(boundary, false)
        .expect("boundary should be accepted");
    tri
}

pub fn square(size: f64) -> Triangulation {
    checked(&square_points(size))
}

/// Sum of the unsigned areas of all output triangles.
pub fn total_area(tri: &Triangulation) -> f64 {
    tri.triangles()
        .iter()
        .map(|t| signed_area(t).abs())
        .sum()
}

/// Structural checks every triangulation of a disk must pass.
pub fn assert_consistent(tri: &mut Triangulation) {
    tri.validate().expect("mesh invariants hold");
    let n = tri.point_count();
    let b = tri.boundary_count();
    // Euler: a triangulated disk with n points, b on the boundary.
    assert_eq!(tri.triangle_count(), 2 * n - b - 2);
    assert_eq!(tri.triangles().len(), tri.triangle_count());

    let outline = tri.boundary_polygon().expect("boundary walk");
    let expected = signed_area(&outline).abs();
    let area = total_area(tri);
    assert!(
        (area - expected).abs() <= 1e-9 * expected.max(1.0),
        "triangles cover {area}, boundary encloses {expected}"
    );

    for p in tri.points() {
        assert!(!tri.mesh().star(p).expect("star").is_empty(), "point {p} has no edges");
        let kind = tri.kind(p).expect("live point");
        assert!(kind == PointKind::Boundary || kind == PointKind::Interior);
    }
}
