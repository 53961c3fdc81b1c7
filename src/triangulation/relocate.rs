// Copyright 2025 Lars Brubaker
// Moving points that are already in the triangulation.

use super::Triangulation;
use crate::error::{Result, TriangulationError};
use crate::geom::{
    between, coincident, on_polygon_outline, orientation, point_in_polygon, polygon_is_simple,
    segments_cross, signed_area, Coord, Orientation,
};
use crate::mesh::{EdgeKind, PointIdx, PointKind, EXTERIOR};
use tracing::{debug, trace, warn};

/// How a boundary point's two edges sweep when it moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum BoundaryMove {
    /// Along the straight line through both neighbours.
    Slide,
    /// Into the domain; the swept region is cut away.
    Inward,
    /// Out of the domain; the swept region is added.
    Outward,
    /// The new edges cross the old ones.
    Crossing,
}

impl Triangulation {
    /// Move an interior point to `c`. Constraints ending at the point follow it.
    pub fn update_interior_point(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.relocate_interior(p, c));
        self.finish("update_interior_point", r)
    }

    /// Move a boundary point to `c`, growing or shrinking the domain. The
    /// boundary must stay a simple clockwise polygon.
    pub fn update_boundary_point(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.relocate_boundary(p, c));
        self.finish("update_boundary_point", r)
    }

    fn relocate_interior(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        let old = self.live_point(p, PointKind::Interior)?;
        if old == c {
            return Ok(());
        }
        self.check_free_position(p, c)?;
        self.check_inside_domain(c)?;

        self.init_remove_constraints(p)?;
        self.delete_interior(p)?;
        let loc = self.locate_point(c)?;
        let v = &mut self.mesh.verts[p as usize];
        v.pos = c;
        v.kind = PointKind::Interior;
        self.place_vertex(p, loc)?;
        debug!(point = p, x = c.x, y = c.y, "moved interior point");
        self.restore_constraints(p)
    }

    fn relocate_boundary(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        let old = self.live_point(p, PointKind::Boundary)?;
        if old == c {
            return Ok(());
        }
        self.check_free_position(p, c)?;

        let ring: Vec<Coord> = self
            .boundary_points()?
            .into_iter()
            .map(|v| if v == p { c } else { self.mesh.pos(v) })
            .collect();
        if signed_area(&ring) >= 0.0 || !polygon_is_simple(&ring, self.tolerance) {
            return Err(TriangulationError::IllegalPolygon(
                "the moved boundary would not be a simple clockwise polygon",
            ));
        }

        match self.classify_move(p, c)? {
            BoundaryMove::Crossing => {
                // Straighten the corner first, then move off the chord.
                let (prv, nxt) = self.boundary_neighbors(p)?;
                self.check_chord(prv, p, nxt)?;
                let m = self.mesh.pos(prv).midpoint(self.mesh.pos(nxt));
                if let Some(q) = self
                    .mesh
                    .live_vertices()
                    .find(|&q| q != p && coincident(self.mesh.pos(q), m, self.tolerance))
                {
                    return Err(TriangulationError::Coincident(p, q));
                }
                self.init_remove_constraints(p)?;
                trace!(point = p, x = m.x, y = m.y, "crossing move via chord midpoint");
                self.shift_boundary(p, m)?;
                self.shift_boundary(p, c)?;
            }
            _ => {
                self.init_remove_constraints(p)?;
                self.shift_boundary(p, c)?;
            }
        }
        debug!(point = p, x = c.x, y = c.y, "moved boundary point");
        self.restore_constraints(p)
    }

    /// No other live point within tolerance of `c`.
    fn check_free_position(&self, p: PointIdx, c: Coord) -> Result<()> {
        match self
            .mesh
            .live_vertices()
            .find(|&q| q != p && coincident(self.mesh.pos(q), c, self.tolerance))
        {
            Some(q) => Err(TriangulationError::Coincident(p, q)),
            None => Ok(()),
        }
    }

    fn classify_move(&self, p: PointIdx, c: Coord) -> Result<BoundaryMove> {
        let eps = self.tolerance;
        let (prv, nxt) = self.boundary_neighbors(p)?;
        let (pp, pq, pn) = (self.mesh.pos(prv), self.mesh.pos(p), self.mesh.pos(nxt));

        if orientation(pp, pq, pn, eps) == Orientation::Collinear && between(pp, pn, c, eps) {
            return Ok(BoundaryMove::Slide);
        }
        let crossing = segments_cross(pp, c, pq, pn, eps)
            || segments_cross(c, pn, pp, pq, eps)
            || between(pp, c, pq, eps)
            || between(c, pn, pq, eps)
            || between(pp, pq, c, eps)
            || between(pq, pn, c, eps);
        if crossing {
            return Ok(BoundaryMove::Crossing);
        }
        let poly = self.boundary_polygon()?;
        if on_polygon_outline(c, &poly, eps) {
            return Ok(BoundaryMove::Crossing);
        }
        Ok(if point_in_polygon(c, &poly) {
            BoundaryMove::Inward
        } else {
            BoundaryMove::Outward
        })
    }

    /// One leg of a boundary move that does not cross the old edges.
    fn shift_boundary(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        match self.classify_move(p, c)? {
            BoundaryMove::Slide => self.slide_boundary(p, c),
            BoundaryMove::Inward => self.shift_inward(p, c),
            BoundaryMove::Outward => self.shift_outward(p, c),
            BoundaryMove::Crossing => Err(TriangulationError::IllegalPolygon(
                "boundary move crosses the old boundary edges",
            )),
        }
    }

    fn slide_boundary(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        let (prv, nxt) = self.boundary_neighbors(p)?;
        self.delete_boundary(p)?;
        let chord = self
            .mesh
            .find_edge(prv, nxt)?
            .ok_or(TriangulationError::NotAdjacent(prv, nxt))?;
        let q = self.insert_boundary(c, chord)?;
        self.mesh.reseat_vertex(q, p)?;
        self.queue_around(p)
    }

    /// Cut the chain prv, q, nxt through the domain and delete everything
    /// between it and the old corner.
    fn shift_inward(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        let (prv, nxt) = self.boundary_neighbors(p)?;
        self.editing = true;

        let q = self.insert_interior(c)?;
        let mut path = self.insert_constraint(prv, q)?;
        let tail = self.insert_constraint(q, nxt)?;
        path.extend(tail.into_iter().skip(1));

        let deleted = self.cut_corner(p, &path)?;
        self.mesh.reseat_vertex(q, p)?;
        self.queue_around(p)?;
        trace!(point = p, deleted, chain = path.len(), "inward boundary move");
        Ok(())
    }

    /// Hang the new corner off the outer face, fill the quadrilateral it
    /// opens and drop the old corner as an interior point.
    fn shift_outward(&mut self, p: PointIdx, c: Coord) -> Result<()> {
        let eps = self.tolerance;
        let out_p = self.exterior_edge(p)?;
        let into_p = self.mesh.prev(out_p)?;
        let into_prv = self.mesh.prev(into_p)?;
        let from_nxt = self.mesh.next(out_p);
        let (prv, nxt) = (self.mesh.origin(into_p), self.mesh.dst(out_p));
        self.editing = true;

        let q = self.mesh.add_vertex(c, PointKind::Boundary);
        let h1 = self.mesh.make_edge_pair(prv, q, EdgeKind::Boundary);
        let h2 = self.mesh.make_edge_pair(q, nxt, EdgeKind::Boundary);
        self.mesh.set_flag(h1, EXTERIOR);
        self.mesh.set_flag(h2, EXTERIOR);

        self.mesh.edges[into_prv as usize].next = h1;
        self.mesh.edges[h1 as usize].next = h2;
        self.mesh.edges[h2 as usize].next = from_nxt;
        self.mesh.edges[out_p as usize].next = h2 ^ 1;
        self.mesh.edges[(h2 ^ 1) as usize].next = h1 ^ 1;
        self.mesh.edges[(h1 ^ 1) as usize].next = into_p;

        for h in [into_p, out_p] {
            self.mesh.clear_flag(h, EXTERIOR);
            self.mesh.set_kind(h, EdgeKind::Auxiliary);
        }
        self.mesh.fill_quadrilateral(h1 ^ 1, &mut self.legalize_queue, eps)?;

        self.mesh.verts[p as usize].kind = PointKind::Interior;
        self.delete_interior(p)?;
        self.mesh.reseat_vertex(q, p)?;
        self.queue_around(p)?;
        trace!(point = p, "outward boundary move");
        Ok(())
    }

    /// Remember the far ends of the constraints at `p` and demote them, so
    /// they can be re-inserted once the point has moved.
    fn init_remove_constraints(&mut self, p: PointIdx) -> Result<()> {
        if let Some(q) = self.relocating {
            return Err(TriangulationError::RelocationInProgress(q));
        }
        self.relocating = Some(p);
        self.removed_constraints.clear();
        self.editing = true;
        for e in self.mesh.star(p)? {
            if self.mesh.kind(e) == EdgeKind::Constraint {
                self.removed_constraints.push(self.mesh.dst(e));
                self.mesh.set_kind(e, EdgeKind::Auxiliary);
            }
        }
        Ok(())
    }

    fn restore_constraints(&mut self, p: PointIdx) -> Result<()> {
        let others = std::mem::take(&mut self.removed_constraints);
        for q in others {
            if q == p || !self.mesh.is_live_vertex(q) {
                continue;
            }
            if let Err(err) = self.check_constraint_inside(p, q) {
                warn!(from = p, to = q, %err, "dropping constraint after move");
                continue;
            }
            self.insert_constraint(p, q)?;
        }
        Ok(())
    }
}
