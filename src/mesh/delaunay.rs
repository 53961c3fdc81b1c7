// Copyright 2025 Lars Brubaker
// Delaunay legalization (Lawson flips) for Mesh.

use super::{EdgeIdx, EdgeKind, Mesh, EXTERIOR, QUEUED};
use crate::error::{Result, TriangulationError};
use crate::geom::{inside_circumcircle, is_left, Real};
use tracing::trace;

impl Mesh {
    /// Rotate the diagonal shared by the two triangles of `e`.
    ///
    /// Before: e = a->b with (a, b, c) on its left and (b, a, d) on its right.
    /// After:  e = d->c with (d, c, a) on its left and (c, d, b) on its right.
    pub fn flip_edge(&mut self, e: EdgeIdx) -> Result<()> {
        let s = e ^ 1;
        if !self.is_triangle(e) || !self.is_triangle(s) {
            return Err(TriangulationError::Structure {
                edge: e,
                detail: "flip_edge next to a non-triangular face",
            });
        }
        let a1 = self.next(e);
        let a2 = self.next(a1);
        let b1 = self.next(s);
        let b2 = self.next(b1);

        let a = self.origin(e);
        let b = self.origin(s);
        let c = self.origin(a2);
        let d = self.origin(b2);

        self.edges[e as usize].origin = d;
        self.edges[s as usize].origin = c;

        self.edges[e as usize].next = a2;
        self.edges[a2 as usize].next = b1;
        self.edges[b1 as usize].next = e;

        self.edges[s as usize].next = b2;
        self.edges[b2 as usize].next = a1;
        self.edges[a1 as usize].next = s;

        if self.verts[a as usize].edge == e {
            self.verts[a as usize].edge = b1;
        }
        if self.verts[b as usize].edge == s {
            self.verts[b as usize].edge = a1;
        }
        Ok(())
    }

    /// False only when the two triangles of `e` form a strictly convex
    /// quadrilateral and an opposite apex lies inside the other circumcircle.
    pub fn edge_is_locally_delaunay(&self, e: EdgeIdx, eps: Real) -> bool {
        let s = e ^ 1;
        let a = self.org_pos(e);
        let b = self.org_pos(s);
        let c = self.dst_pos(self.next(e));
        let d = self.dst_pos(self.next(s));

        let convex = is_left(d, b, c, eps) && is_left(c, a, d, eps);
        if !convex {
            return true;
        }
        !(inside_circumcircle(a, b, c, d, eps) || inside_circumcircle(b, a, d, c, eps))
    }

    /// An edge the legalization engine may test: live, interior, unconstrained.
    pub fn is_flippable(&self, e: EdgeIdx) -> bool {
        self.is_live_edge(e)
            && self.kind(e) == EdgeKind::Auxiliary
            && !self.has_flag(e, EXTERIOR)
            && !self.has_flag(e ^ 1, EXTERIOR)
    }

    /// Drain the queue, flipping every illegal edge and re-queueing the four
    /// sides of each flipped quadrilateral. Returns the number of flips.
    pub fn legalize(&mut self, queue: &mut Vec<EdgeIdx>, eps: Real) -> Result<usize> {
        let n = self.edges.len() + queue.len() + 4;
        let bound = n.saturating_mul(n);
        let mut steps = 0usize;
        let mut flips = 0usize;

        while let Some(e) = queue.pop() {
            steps += 1;
            if steps > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "legalize",
                    bound,
                });
            }
            if !self.is_live_edge(e) {
                continue;
            }
            self.clear_flag(e, QUEUED);
            self.clear_flag(e ^ 1, QUEUED);
            if !self.is_flippable(e) {
                continue;
            }
            if !self.is_triangle(e) || !self.is_triangle(e ^ 1) {
                return Err(TriangulationError::Structure {
                    edge: e,
                    detail: "legalizing an edge next to an unfilled face",
                });
            }
            if self.edge_is_locally_delaunay(e, eps) {
                continue;
            }

            let neighbors = [
                self.next(e),
                self.next(self.next(e)),
                self.next(e ^ 1),
                self.next(self.next(e ^ 1)),
            ];
            self.flip_edge(e)?;
            flips += 1;
            trace!(edge = e, origin = self.origin(e), dst = self.dst(e), "flip");
            for nb in neighbors {
                self.enqueue(queue, nb);
            }
        }
        Ok(flips)
    }
}
