// Copyright 2025 Lars Brubaker
// Constraint insertion and removal.
//
// A constraint a -> b is inserted one sub-segment at a time. From the current
// point the walk crosses triangles toward b until it reaches b, a point lying
// on the segment, or an existing constraint (which is split where the two
// cross). The unconstrained edges crossed on the way are deleted, the
// constraint edge is connected across the opened polygon, and both halves
// are re-filled.

use super::Triangulation;
use crate::error::{Result, TriangulationError};
use crate::geom::{
    coincident, on_polygon_outline, orientation, point_in_polygon, segment_intersection,
    segments_touch, Orientation,
};
use crate::mesh::{EdgeIdx, EdgeKind, PointIdx, PointKind};
use tracing::{debug, trace};

impl Triangulation {
    /// Force an edge between `a` and `b`. Returns the points along the
    /// inserted constraint, from `a` to `b`, including any created where it
    /// crossed earlier constraints.
    pub fn add_constraint(&mut self, a: PointIdx, b: PointIdx) -> Result<Vec<PointIdx>> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.insert_constraint(a, b));
        self.finish("add_constraint", r)
    }

    /// `add_constraint` between two boundary points given by their position
    /// in `boundary_points()`.
    pub fn add_boundary_constraint(&mut self, i: usize, j: usize) -> Result<Vec<PointIdx>> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| {
            let ring = self.boundary_points()?;
            let a = *ring.get(i).ok_or(TriangulationError::MissingPoint(i as PointIdx))?;
            let b = *ring.get(j).ok_or(TriangulationError::MissingPoint(j as PointIdx))?;
            self.insert_constraint(a, b)
        });
        self.finish("add_constraint", r)
    }

    /// Turn the constraint a-b back into an ordinary edge.
    pub fn remove_constraint(&mut self, a: PointIdx, b: PointIdx) -> Result<()> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| {
            self.mesh.live_vertex(a)?;
            self.mesh.live_vertex(b)?;
            let e = self
                .mesh
                .find_edge(a, b)?
                .ok_or(TriangulationError::NotAdjacent(a, b))?;
            if self.mesh.kind(e) != EdgeKind::Constraint {
                return Err(TriangulationError::EdgeType {
                    edge: e,
                    found: self.mesh.kind(e),
                    expected: EdgeKind::Constraint,
                });
            }
            self.editing = true;
            self.mesh.set_kind(e, EdgeKind::Auxiliary);
            self.enqueue(e);
            Ok(())
        });
        self.finish("remove_constraint", r)
    }

    /// Freeze the current triangulation: every unconstrained edge becomes a
    /// constraint. Returns the number of edges changed.
    pub fn constrain_all_edges(&mut self) -> Result<usize> {
        self.begin()?;
        let r = self.require_boundary().map(|_| {
            let pairs: Vec<EdgeIdx> = self
                .mesh
                .live_pairs()
                .filter(|&e| self.mesh.kind(e) == EdgeKind::Auxiliary)
                .collect();
            for &e in &pairs {
                self.mesh.set_kind(e, EdgeKind::Constraint);
            }
            pairs.len()
        });
        self.finish("constrain_all_edges", r)
    }

    pub(crate) fn insert_constraint(&mut self, a: PointIdx, b: PointIdx) -> Result<Vec<PointIdx>> {
        let pa = self.mesh.live_vertex(a)?.pos;
        let pb = self.mesh.live_vertex(b)?.pos;
        if a == b || coincident(pa, pb, self.tolerance) {
            return Err(TriangulationError::Coincident(a, b));
        }
        self.check_constraint_inside(a, b)?;
        debug!(a, b, "add_constraint");

        let bound = self.mesh.step_bound();
        let mut path = vec![a];
        let mut cur = a;
        for _ in 0..bound {
            if cur == b {
                return Ok(path);
            }
            cur = self.constraint_step(cur, b)?;
            path.push(cur);
        }
        Err(TriangulationError::Exhausted {
            operation: "insert_constraint",
            bound,
        })
    }

    /// The open segment a-b must stay inside the boundary.
    pub(crate) fn check_constraint_inside(&self, a: PointIdx, b: PointIdx) -> Result<()> {
        let eps = self.tolerance;
        let (pa, pb) = (self.mesh.pos(a), self.mesh.pos(b));
        let ring = self.boundary_points()?;
        let n = ring.len();
        for i in 0..n {
            let (u, w) = (ring[i], ring[(i + 1) % n]);
            if u == a || u == b || w == a || w == b {
                continue;
            }
            if segments_touch(pa, pb, self.mesh.pos(u), self.mesh.pos(w), eps) {
                return Err(TriangulationError::ConstraintCrossesBoundary(a, b));
            }
        }
        let poly: Vec<_> = ring.iter().map(|&v| self.mesh.pos(v)).collect();
        let mid = pa.midpoint(pb);
        if !point_in_polygon(mid, &poly) || on_polygon_outline(mid, &poly, eps) {
            // Lying along the outline is only fine when the edge already exists.
            if self.mesh.find_edge(a, b)?.is_none() {
                return Err(TriangulationError::ConstraintCrossesBoundary(a, b));
            }
        }
        Ok(())
    }

    /// Insert the part of cur -> b up to the first point it reaches.
    fn constraint_step(&mut self, cur: PointIdx, b: PointIdx) -> Result<PointIdx> {
        let eps = self.tolerance;
        if let Some(e) = self.mesh.find_edge(cur, b)? {
            self.mark_constraint(e);
            return Ok(b);
        }
        let (pa, pb) = (self.mesh.pos(cur), self.mesh.pos(b));
        let e = self.mesh.start_face_walk(cur, b, eps)?;
        if orientation(pa, self.mesh.dst_pos(e), pb, eps) == Orientation::Collinear {
            self.mark_constraint(e);
            return Ok(self.mesh.dst(e));
        }

        // Walk the triangles crossed by the segment. `c` always runs from the
        // right side of cur -> b to the left side.
        let bound = self.mesh.step_bound();
        let mut crossed = Vec::new();
        let mut c = self.mesh.next(e);
        let mut target = None;
        for _ in 0..bound {
            match self.mesh.kind(c) {
                EdgeKind::Boundary => return Err(TriangulationError::ConstraintCrossesBoundary(cur, b)),
                EdgeKind::Constraint => {
                    let (c0, c1) = (self.mesh.org_pos(c), self.mesh.dst_pos(c));
                    let x = segment_intersection(pa, pb, c0, c1).ok_or(TriangulationError::Structure {
                        edge: c,
                        detail: "crossed constraint is parallel to the new one",
                    })?;
                    self.editing = true;
                    let v = self.mesh.add_vertex(x, PointKind::Interior);
                    self.mesh.split_edge(c, v)?;
                    self.queue_around(v)?;
                    trace!(point = v, "split crossed constraint");
                    target = Some(v);
                    break;
                }
                EdgeKind::Auxiliary => crossed.push(c),
            }
            let t = c ^ 1;
            let w = self.mesh.dst(self.mesh.next(t));
            let pw = self.mesh.pos(w);
            if w == b || coincident(pw, pb, eps) {
                target = Some(w);
                break;
            }
            c = match orientation(pa, pb, pw, eps) {
                Orientation::Collinear => {
                    target = Some(w);
                    break;
                }
                Orientation::Left => self.mesh.next(t),
                Orientation::Right => self.mesh.next(self.mesh.next(t)),
            };
        }
        let target = target.ok_or(TriangulationError::Exhausted {
            operation: "constraint walk",
            bound,
        })?;

        self.editing = true;
        if crossed.is_empty() {
            let h = self
                .mesh
                .find_edge(cur, target)?
                .ok_or(TriangulationError::Structure {
                    edge: e,
                    detail: "split point is not joined to the walk origin",
                })?;
            self.mark_constraint(h);
            return Ok(target);
        }

        for &h in &crossed {
            self.mesh.remove_edge(h)?;
        }
        let face = self.mesh.face_edges(e)?;
        let into_cur = *face.last().ok_or(TriangulationError::MissingEdge(e))?;
        let from_target = *face
            .iter()
            .find(|&&f| self.mesh.origin(f) == target)
            .ok_or(TriangulationError::Structure {
                edge: e,
                detail: "walk target is not on the opened polygon",
            })?;
        let h = self.mesh.connect(into_cur, from_target, EdgeKind::Constraint)?;
        for side in [h, h ^ 1] {
            self.queue_face(side)?;
            self.mesh.edge_visible_fill(side, &mut self.legalize_queue, eps)?;
        }
        trace!(from = cur, to = target, removed = crossed.len(), "constraint segment");
        Ok(target)
    }

    fn mark_constraint(&mut self, e: EdgeIdx) {
        if self.mesh.kind(e) == EdgeKind::Auxiliary {
            self.editing = true;
            self.mesh.set_kind(e, EdgeKind::Constraint);
        }
    }
}
