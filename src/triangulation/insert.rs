// Copyright 2025 Lars Brubaker
// Boundary initialisation and point insertion.

use super::Triangulation;
use crate::error::{Result, TriangulationError};
use crate::geom::{
    between, coincident, in_triangle, orientation, polygon_is_simple, segments_touch, signed_area,
    strictly_in_triangle, Coord, Orientation,
};
use crate::mesh::{EdgeIdx, EdgeKind, Location, Mesh, PointIdx, PointKind, EXTERIOR};
use tracing::debug;

impl Triangulation {
    /// Replace the mesh with the triangulated interior of a simple polygon.
    /// The points must run clockwise, or anticlockwise with `reverse_order`.
    /// Point `i` of the (possibly reversed) input gets handle `i`.
    pub fn start_with_boundary(&mut self, points: &[Coord], reverse_order: bool) -> Result<Vec<PointIdx>> {
        // A fresh boundary discards any earlier failure.
        self.poisoned = false;
        self.begin()?;
        let r = self.build_boundary(points, reverse_order);
        self.finish("start_with_boundary", r)
    }

    fn build_boundary(&mut self, points: &[Coord], reverse_order: bool) -> Result<Vec<PointIdx>> {
        let eps = self.tolerance;
        let n = points.len();
        if n < 3 {
            return Err(TriangulationError::TooFewPoints(n));
        }
        let mut pts = points.to_vec();
        if reverse_order {
            pts.reverse();
        }
        for i in 0..n {
            let j = (i + 1) % n;
            if coincident(pts[i], pts[j], eps) {
                return Err(TriangulationError::Coincident(i as PointIdx, j as PointIdx));
            }
        }
        if signed_area(&pts) >= 0.0 {
            return Err(TriangulationError::IllegalPolygon("boundary must run clockwise"));
        }
        if !polygon_is_simple(&pts, eps) {
            return Err(TriangulationError::IllegalPolygon("boundary intersects itself"));
        }
        debug!(points = n, "start_with_boundary");

        self.editing = true;
        self.mesh = Mesh::new();
        self.boundary_count = 0;
        self.relocating = None;

        let verts: Vec<PointIdx> = pts
            .iter()
            .map(|&c| self.mesh.add_vertex(c, PointKind::Boundary))
            .collect();
        // Even halves p(i) -> p(i+1) form the outer face; odd halves the interior.
        let ext: Vec<EdgeIdx> = (0..n)
            .map(|i| self.mesh.make_edge_pair(verts[i], verts[(i + 1) % n], EdgeKind::Boundary))
            .collect();
        for i in 0..n {
            self.mesh.set_flag(ext[i], EXTERIOR);
            self.mesh.edges[ext[i] as usize].next = ext[(i + 1) % n];
            self.mesh.edges[(ext[i] ^ 1) as usize].next = ext[(i + n - 1) % n] ^ 1;
        }
        self.boundary_count = n;

        let interior = ext[0] ^ 1;
        self.mesh.ear_fill(interior, &mut self.legalize_queue, eps)?;
        for e in ext {
            self.enqueue(e ^ 1);
        }
        Ok(verts)
    }

    /// Insert a point inside the boundary. A point within tolerance of an
    /// existing point returns that point unchanged. A point on a boundary
    /// edge becomes a boundary point.
    pub fn add_interior_point(&mut self, c: Coord) -> Result<PointIdx> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.insert_interior(c));
        self.finish("add_interior_point", r)
    }

    pub(crate) fn insert_interior(&mut self, c: Coord) -> Result<PointIdx> {
        if let Some((v, d)) = self.mesh.nearest_vertex(c) {
            if d <= self.tolerance {
                return Ok(v);
            }
        }
        let loc = self.locate_point(c)?;
        if let Location::Vertex(e) = loc {
            return Ok(self.mesh.origin(e));
        }
        self.editing = true;
        let v = self.mesh.add_vertex(c, PointKind::Interior);
        self.place_vertex(v, loc)?;
        debug!(point = v, x = c.x, y = c.y, "inserted point");
        Ok(v)
    }

    /// Link the edge-less point `v` into the mesh at `loc`.
    pub(crate) fn place_vertex(&mut self, v: PointIdx, loc: Location) -> Result<()> {
        let eps = self.tolerance;
        match loc {
            Location::Face(e) => {
                self.mesh.split_triangle(e, v)?;
            }
            Location::Edge(e) if self.mesh.kind(e) == EdgeKind::Boundary => {
                let e = if self.mesh.is_exterior(e) { e ^ 1 } else { e };
                self.mesh.verts[v as usize].kind = PointKind::Boundary;
                self.mesh.split_boundary_edge(e, v)?;
                self.mesh.fill_quadrilateral(e, &mut self.legalize_queue, eps)?;
                self.boundary_count += 1;
            }
            Location::Edge(e) => {
                self.mesh.split_edge(e, v)?;
            }
            Location::Vertex(e) => {
                return Err(TriangulationError::Structure {
                    edge: e,
                    detail: "placing a point on top of another",
                });
            }
        }
        self.queue_around(v)
    }

    /// Insert a point on, inside or outside the boundary edge `on_edge`
    /// (either half). Within tolerance of an endpoint returns that endpoint.
    pub fn add_boundary_point(&mut self, c: Coord, on_edge: EdgeIdx) -> Result<PointIdx> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.insert_boundary(c, on_edge));
        self.finish("add_boundary_point", r)
    }

    /// As `add_boundary_point`, on the edge leaving `boundary_points()[index]`.
    pub fn add_boundary_point_at(&mut self, c: Coord, index: usize) -> Result<PointIdx> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| {
            let ring = self.boundary_points()?;
            let p = *ring
                .get(index)
                .ok_or(TriangulationError::MissingPoint(index as PointIdx))?;
            let e = self.exterior_edge(p)?;
            self.insert_boundary(c, e)
        });
        self.finish("add_boundary_point", r)
    }

    pub(crate) fn insert_boundary(&mut self, c: Coord, on_edge: EdgeIdx) -> Result<PointIdx> {
        let eps = self.tolerance;
        if !self.mesh.is_live_edge(on_edge) {
            return Err(TriangulationError::MissingEdge(on_edge));
        }
        if self.mesh.kind(on_edge) != EdgeKind::Boundary {
            return Err(TriangulationError::EdgeType {
                edge: on_edge,
                found: self.mesh.kind(on_edge),
                expected: EdgeKind::Boundary,
            });
        }
        let e = if self.mesh.is_exterior(on_edge) { on_edge ^ 1 } else { on_edge };
        let (a, b) = (self.mesh.origin(e), self.mesh.dst(e));
        let (pa, pb) = (self.mesh.pos(a), self.mesh.pos(b));
        if coincident(c, pa, eps) {
            return Ok(a);
        }
        if coincident(c, pb, eps) {
            return Ok(b);
        }
        if self
            .mesh
            .live_vertices()
            .any(|v| coincident(self.mesh.pos(v), c, eps))
        {
            return Err(TriangulationError::IllegalPolygon("point coincides with an existing point"));
        }

        match orientation(pa, pb, c, eps) {
            Orientation::Collinear => {
                if !between(pa, pb, c, eps) {
                    return Err(TriangulationError::IllegalPolygon(
                        "point is in line with the edge but beyond its ends",
                    ));
                }
            }
            Orientation::Left => {
                let x = self.mesh.dst_pos(self.mesh.next(e));
                if !strictly_in_triangle(c, pa, pb, x, eps) {
                    return Err(TriangulationError::IllegalPolygon(
                        "an inward point must lie inside the triangle next to the edge",
                    ));
                }
            }
            Orientation::Right => self.check_outward_ear(a, b, c)?,
        }

        self.editing = true;
        let v = self.mesh.add_vertex(c, PointKind::Boundary);
        self.mesh.split_boundary_edge(e, v)?;
        self.mesh.fill_quadrilateral(e, &mut self.legalize_queue, eps)?;
        self.boundary_count += 1;
        self.queue_around(v)?;
        debug!(point = v, x = c.x, y = c.y, "inserted boundary point");
        Ok(v)
    }

    /// The triangle a, c, b grown outward from boundary edge a-b must not
    /// touch the rest of the boundary.
    fn check_outward_ear(&self, a: PointIdx, b: PointIdx, c: Coord) -> Result<()> {
        let eps = self.tolerance;
        let (pa, pb) = (self.mesh.pos(a), self.mesh.pos(b));
        let ring = self.boundary_points()?;
        let n = ring.len();
        for i in 0..n {
            let (u, w) = (ring[i], ring[(i + 1) % n]);
            if (u == a && w == b) || (u == b && w == a) {
                continue;
            }
            let (pu, pw) = (self.mesh.pos(u), self.mesh.pos(w));
            for (end, pend) in [(a, pa), (b, pb)] {
                let touches = if u == end || w == end {
                    let other = if u == end { pw } else { pu };
                    between(pend, c, other, eps) || between(pu, pw, c, eps)
                } else {
                    segments_touch(pend, c, pu, pw, eps)
                };
                if touches {
                    return Err(TriangulationError::IllegalPolygon(
                        "the new boundary edges would touch the boundary",
                    ));
                }
            }
            if u != a && u != b && in_triangle(pu, pa, c, pb, eps) {
                return Err(TriangulationError::IllegalPolygon(
                    "the new boundary edges would enclose a boundary point",
                ));
            }
        }
        Ok(())
    }
}
