// Copyright 2025 Lars Brubaker
// Triangle and edge exports, diagnostics and the structural self-check.

use std::fmt::Write;

use rustc_hash::FxHashMap;

use super::Triangulation;
use crate::error::{Result, TriangulationError};
use crate::geom::{coincident, orientation, point_in_polygon, Coord, Orientation};
use crate::mesh::{EdgeIdx, EdgeKind, PointIdx, PointKind, INVALID};
use tracing::warn;

/// Which undirected edges an edge export reports.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EdgeFilter {
    #[default]
    All,
    /// User constraints only.
    Constrained,
    Boundary,
    /// Edges the legalization engine is free to flip.
    Unconstrained,
}

impl EdgeFilter {
    fn accepts(self, kind: EdgeKind) -> bool {
        match self {
            EdgeFilter::All => true,
            EdgeFilter::Constrained => kind == EdgeKind::Constraint,
            EdgeFilter::Boundary => kind == EdgeKind::Boundary,
            EdgeFilter::Unconstrained => kind == EdgeKind::Auxiliary,
        }
    }
}

/// Exact lookup of caller coordinates, falling back to a tolerant scan.
struct PointLookup<'a> {
    points: &'a [Coord],
    exact: FxHashMap<(u64, u64), u32>,
    eps: f64,
}

impl<'a> PointLookup<'a> {
    fn new(points: &'a [Coord], eps: f64) -> Self {
        let mut exact = FxHashMap::default();
        for (i, p) in points.iter().enumerate() {
            exact.entry((p.x.to_bits(), p.y.to_bits())).or_insert(i as u32);
        }
        PointLookup { points, exact, eps }
    }

    fn find(&self, v: PointIdx, c: Coord) -> Result<u32> {
        if let Some(&i) = self.exact.get(&(c.x.to_bits(), c.y.to_bits())) {
            return Ok(i);
        }
        self.points
            .iter()
            .position(|&p| coincident(p, c, self.eps))
            .map(|i| i as u32)
            .ok_or(TriangulationError::MissingPoint(v))
    }
}

impl Triangulation {
    // ─────── Triangles ────────────────────────────────────────────────────────

    /// Every interior face as its three points, counter-clockwise.
    pub fn triangle_handles(&self) -> Vec<[PointIdx; 3]> {
        let mesh = &self.mesh;
        let mut seen = vec![false; mesh.edges.len()];
        let mut out = Vec::with_capacity(mesh.edges.len() / 6);
        for e in 0..mesh.edges.len() as EdgeIdx {
            if seen[e as usize] || !mesh.is_live_edge(e) || mesh.is_exterior(e) {
                continue;
            }
            let e1 = mesh.next(e);
            let e2 = mesh.next(e1);
            if mesh.next(e2) != e {
                warn!(edge = e, "skipping non-triangular interior face");
                seen[e as usize] = true;
                continue;
            }
            for h in [e, e1, e2] {
                seen[h as usize] = true;
            }
            out.push([mesh.origin(e), mesh.origin(e1), mesh.origin(e2)]);
        }
        out
    }

    pub fn triangles(&self) -> Vec<[Coord; 3]> {
        self.triangle_handles()
            .into_iter()
            .map(|t| t.map(|v| self.mesh.pos(v)))
            .collect()
    }

    /// Triangles as indices into `points`, matched by coordinate. With
    /// `reverse` the winding is clockwise.
    pub fn triangle_indices(&self, points: &[Coord], reverse: bool) -> Result<Vec<[u32; 3]>> {
        let lookup = PointLookup::new(points, self.tolerance);
        let handles = self.triangle_handles();
        let mut out = Vec::with_capacity(handles.len());
        for [a, b, c] in handles {
            let ia = lookup.find(a, self.mesh.pos(a))?;
            let ib = lookup.find(b, self.mesh.pos(b))?;
            let ic = lookup.find(c, self.mesh.pos(c))?;
            out.push(if reverse { [ia, ic, ib] } else { [ia, ib, ic] });
        }
        Ok(out)
    }

    /// Triangles whose centroid lies inside any of the closed `polygons`.
    pub fn triangles_inside(&self, polygons: &[Vec<Coord>]) -> Vec<[Coord; 3]> {
        self.triangles()
            .into_iter()
            .filter(|t| {
                let centroid = Coord::new((t[0].x + t[1].x + t[2].x) / 3.0, (t[0].y + t[1].y + t[2].y) / 3.0);
                polygons.iter().any(|poly| point_in_polygon(centroid, poly))
            })
            .collect()
    }

    // ─────── Edges ────────────────────────────────────────────────────────────

    /// One half-edge per undirected edge passing `filter`.
    pub fn edge_handles(&self, filter: EdgeFilter) -> Vec<EdgeIdx> {
        self.mesh
            .live_pairs()
            .filter(|&e| filter.accepts(self.mesh.kind(e)))
            .collect()
    }

    pub fn edges(&self, filter: EdgeFilter) -> Vec<[Coord; 2]> {
        self.edge_handles(filter)
            .into_iter()
            .map(|e| [self.mesh.org_pos(e), self.mesh.dst_pos(e)])
            .collect()
    }

    pub fn edge_indices(&self, filter: EdgeFilter, points: &[Coord]) -> Result<Vec<[u32; 2]>> {
        let lookup = PointLookup::new(points, self.tolerance);
        self.edge_handles(filter)
            .into_iter()
            .map(|e| {
                let (a, b) = (self.mesh.origin(e), self.mesh.dst(e));
                Ok([lookup.find(a, self.mesh.pos(a))?, lookup.find(b, self.mesh.pos(b))?])
            })
            .collect()
    }

    // ─────── Diagnostics ──────────────────────────────────────────────────────

    /// Point table followed by the half-edge table.
    pub fn diagnostic_dump(&self) -> String {
        let mesh = &self.mesh;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "points: {}  half-edges: {}  boundary: {}",
            mesh.verts.len(),
            mesh.edges.len(),
            self.boundary_count
        );
        for (i, v) in mesh.verts.iter().enumerate() {
            let _ = writeln!(out, "p{:<5} e{:<6} {:?} ({}, {})", i, v.edge, v.kind, v.pos.x, v.pos.y);
        }
        for (i, h) in mesh.edges.iter().enumerate() {
            let i = i as EdgeIdx;
            if h.next == INVALID {
                let _ = writeln!(out, "e{:<5} dead", i);
                continue;
            }
            let _ = writeln!(
                out,
                "e{:<5} next e{:<6} p{} -> p{}  sib e{:<6} {:?} flags {:#04x}",
                i,
                h.next,
                h.origin,
                mesh.dst(i),
                i ^ 1,
                h.kind,
                h.flags
            );
        }
        out
    }

    /// Check every structural invariant of the mesh.
    pub fn validate(&self) -> Result<()> {
        let mesh = &self.mesh;
        let eps = self.tolerance;
        let broken = |edge: EdgeIdx, detail: &'static str| Err(TriangulationError::Structure { edge, detail });

        for e in 0..mesh.edges.len() as EdgeIdx {
            if !mesh.is_live_edge(e) {
                if mesh.is_live_edge(e ^ 1) {
                    return broken(e, "half of a pair is dead");
                }
                continue;
            }
            let n = mesh.next(e);
            if !mesh.is_live_edge(n) {
                return broken(e, "next points at a dead half-edge");
            }
            if mesh.origin(n) != mesh.dst(e) {
                return broken(e, "next does not start where the edge ends");
            }
            if mesh.origin(e) == mesh.dst(e) {
                return broken(e, "loop edge");
            }
            if !mesh.is_live_vertex(mesh.origin(e)) {
                return broken(e, "edge starts at a deleted point");
            }
            if mesh.is_exterior(e) {
                if mesh.kind(e) != EdgeKind::Boundary || mesh.is_exterior(e ^ 1) {
                    return broken(e, "outer face edge is not a one-sided boundary edge");
                }
                continue;
            }
            if !mesh.is_triangle(e) {
                return broken(e, "interior face is not a triangle");
            }
            let (a, b, c) = (mesh.org_pos(e), mesh.dst_pos(e), mesh.dst_pos(n));
            if orientation(a, b, c, eps) != Orientation::Left {
                return broken(e, "interior triangle is clockwise or flat");
            }
            if e & 1 == 0
                && mesh.kind(e) == EdgeKind::Auxiliary
                && !mesh.is_exterior(e ^ 1)
                && !mesh.edge_is_locally_delaunay(e, eps)
            {
                return broken(e, "unconstrained edge is not locally Delaunay");
            }
        }

        for v in mesh.live_vertices() {
            let e = mesh.verts[v as usize].edge;
            if !mesh.is_live_edge(e) || mesh.origin(e) != v {
                return broken(e, "point's incident edge does not leave it");
            }
        }

        let ring = self.boundary_points()?;
        let boundary_pairs = mesh
            .live_pairs()
            .filter(|&e| mesh.kind(e) == EdgeKind::Boundary)
            .count();
        let boundary_verts = mesh
            .live_vertices()
            .filter(|&v| mesh.verts[v as usize].kind == PointKind::Boundary)
            .count();
        if ring.len() != self.boundary_count
            || boundary_pairs != self.boundary_count
            || boundary_verts != self.boundary_count
        {
            return broken(INVALID, "boundary cycle length differs from the boundary count");
        }
        Ok(())
    }
}
