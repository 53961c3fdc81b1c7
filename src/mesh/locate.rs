// Copyright 2025 Lars Brubaker
// Point location by face walking, with a brute-force fallback.

use super::{EdgeIdx, Mesh, PointIdx};
use crate::error::{Result, TriangulationError};
use crate::geom::{
    between, coincident, in_triangle, on_polygon_outline, orientation, point_in_polygon, Coord,
    Orientation, Real,
};
use tracing::{trace, warn};

/// Where a query point sits relative to the mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// Coincides with the origin of this half-edge.
    Vertex(EdgeIdx),
    /// Lies on this half-edge, strictly between its endpoints. The half-edge
    /// is the one whose left face was being examined.
    Edge(EdgeIdx),
    /// Strictly inside the face left of this half-edge.
    Face(EdgeIdx),
}

impl Mesh {
    /// Locate `target` starting from the face left of `start`.
    pub fn locate(&self, start: EdgeIdx, target: Coord, eps: Real) -> Result<Location> {
        match self.walk(start, target, eps)? {
            Some(loc) => Ok(loc),
            None => {
                warn!(x = target.x, y = target.y, "face walk gave up; scanning all faces");
                self.locate_brute_force(target, eps)
            }
        }
    }

    /// Directed walk. `None` means the walk stepped onto the outer face or ran
    /// over its bound, which a concave boundary can cause for inside points.
    fn walk(&self, start: EdgeIdx, target: Coord, eps: Real) -> Result<Option<Location>> {
        if !self.is_live_edge(start) || self.is_exterior(start) {
            return Ok(None);
        }
        let bound = self.step_bound();
        let mut e = start;
        let mut entered: Option<EdgeIdx> = None;
        for _ in 0..bound {
            let face = self.face_edges(e)?;
            let crossed = face.iter().copied().find(|&f| {
                Some(f) != entered
                    && orientation(self.org_pos(f), self.dst_pos(f), target, eps) == Orientation::Right
            });
            match crossed {
                None => return self.classify_in_face(e, target, eps).map(Some),
                Some(f) => {
                    let t = f ^ 1;
                    if self.is_exterior(t) {
                        return Ok(None);
                    }
                    trace!(edge = t, "walk step");
                    entered = Some(t);
                    // Start the next face at the side after the one we came in by.
                    e = self.next(t);
                }
            }
        }
        Ok(None)
    }

    /// O(n) scan over every interior face.
    pub fn locate_brute_force(&self, target: Coord, eps: Real) -> Result<Location> {
        for h in 0..self.edges.len() as EdgeIdx {
            if !self.is_live_edge(h) || self.is_exterior(h) {
                continue;
            }
            let face = self.face_edges(h)?;
            // Visit each face once, from its lowest half-edge.
            if face.iter().any(|&f| f < h) {
                continue;
            }
            let pts: Vec<Coord> = face.iter().map(|&f| self.org_pos(f)).collect();
            let hit = if pts.len() == 3 {
                in_triangle(target, pts[0], pts[1], pts[2], eps)
            } else {
                point_in_polygon(target, &pts) || on_polygon_outline(target, &pts, eps)
            };
            if hit {
                return self.classify_in_face(h, target, eps);
            }
        }
        Err(TriangulationError::OutsideBoundary {
            x: target.x,
            y: target.y,
        })
    }

    /// `target` is known not to be outside the face left of `e`.
    fn classify_in_face(&self, e: EdgeIdx, target: Coord, eps: Real) -> Result<Location> {
        let face = self.face_edges(e)?;
        if let Some(&f) = face
            .iter()
            .find(|&&f| coincident(self.org_pos(f), target, eps))
        {
            return Ok(Location::Vertex(f));
        }
        if let Some(&f) = face
            .iter()
            .find(|&&f| between(self.org_pos(f), self.dst_pos(f), target, eps))
        {
            return Ok(Location::Edge(f));
        }
        Ok(Location::Face(e))
    }

    /// Outgoing half-edge `e` of `p1` such that either dst(e) lies on the ray
    /// p1 -> p2, or the ray enters the interior triangle left of `e` strictly
    /// between its two sides at p1.
    pub fn start_face_walk(&self, p1: PointIdx, p2: PointIdx, eps: Real) -> Result<EdgeIdx> {
        let a = self.pos(p1);
        let b = self.pos(p2);
        let star = self.star(p1)?;

        for &e in &star {
            let v = self.dst_pos(e);
            let same_dir = (v.x - a.x) * (b.x - a.x) + (v.y - a.y) * (b.y - a.y) > 0.0;
            if same_dir && orientation(a, v, b, eps) == Orientation::Collinear {
                return Ok(e);
            }
        }
        for &e in &star {
            // Boundary points: the outer face is never a candidate wedge.
            if self.is_exterior(e) {
                continue;
            }
            let v1 = self.dst_pos(e);
            let v2 = self.dst_pos(self.next(e));
            if orientation(a, v1, b, eps) == Orientation::Left
                && orientation(a, v2, b, eps) == Orientation::Right
            {
                return Ok(e);
            }
        }
        Err(TriangulationError::ConstraintCrossesBoundary(p1, p2))
    }
}
