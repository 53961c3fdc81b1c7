// Copyright 2025 Lars Brubaker
// Polygon filling for faces opened up by structural edits.
//
// Each filler takes a face (one of its half-edges) that is a simple polygon
// and cuts it into triangles with Auxiliary diagonals. Every diagonal goes on
// the legalization queue.

use super::{EdgeIdx, EdgeKind, Mesh};
use crate::error::{Result, TriangulationError};
use crate::geom::{in_triangle, inside_circumcircle, is_left, segments_cross, Real};

impl Mesh {
    /// Ear clipping. Cuts one ear at a time off the face until a triangle is left.
    pub fn ear_fill(&mut self, e: EdgeIdx, queue: &mut Vec<EdgeIdx>, eps: Real) -> Result<()> {
        let bound = self.step_bound();
        let mut e = e;
        for _ in 0..bound {
            let face = self.face_edges(e)?;
            let n = face.len();
            if n < 3 {
                return Err(TriangulationError::IllegalPolygon("face has fewer than 3 sides"));
            }
            if n == 3 {
                return Ok(());
            }
            let i = (0..n)
                .find(|&i| self.triangle_is_clear(&face, [i, (i + 1) % n, (i + 2) % n], eps))
                .ok_or(TriangulationError::IllegalPolygon("no ear found"))?;
            // v(i+2) -> v(i); the ear stays on the new half's side.
            let d = self.connect(face[(i + 1) % n], face[i], EdgeKind::Auxiliary)?;
            self.enqueue(queue, d);
            e = d ^ 1;
        }
        Err(TriangulationError::Exhausted {
            operation: "ear_fill",
            bound,
        })
    }

    /// Fill seeded from the base edge `base` (a -> b). For every sub-polygon
    /// the apex is the visible vertex whose circle through a and b holds no
    /// other visible vertex, so the result is already close to Delaunay.
    pub fn edge_visible_fill(&mut self, base: EdgeIdx, queue: &mut Vec<EdgeIdx>, eps: Real) -> Result<()> {
        let bound = self.step_bound();
        let mut stack = vec![base];
        let mut steps = 0;

        while let Some(base) = stack.pop() {
            steps += 1;
            if steps > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "edge_visible_fill",
                    bound,
                });
            }
            let face = self.face_edges(base)?;
            let n = face.len();
            if n < 3 {
                return Err(TriangulationError::IllegalPolygon("face has fewer than 3 sides"));
            }
            if n == 3 {
                continue;
            }
            let a = self.org_pos(face[0]);
            let b = self.org_pos(face[1]);

            let mut best: Option<usize> = None;
            for k in 2..n {
                if !self.triangle_is_clear(&face, [0, 1, k], eps) {
                    continue;
                }
                best = match best {
                    Some(j) if !inside_circumcircle(a, b, self.org_pos(face[j]), self.org_pos(face[k]), eps) => Some(j),
                    _ => Some(k),
                };
            }
            let Some(k) = best else {
                self.ear_fill(base, queue, eps)?;
                continue;
            };

            // b -> c, leaving b .. c as a sub-polygon on the far side.
            let mut into_c = face[1];
            if k != 2 {
                let d = self.connect(face[0], face[k], EdgeKind::Auxiliary)?;
                self.enqueue(queue, d);
                stack.push(d ^ 1);
                into_c = d;
            }
            // c -> a, leaving c .. a as a sub-polygon on the far side.
            if k != n - 1 {
                let d = self.connect(into_c, face[0], EdgeKind::Auxiliary)?;
                self.enqueue(queue, d);
                stack.push(d ^ 1);
            }
        }
        Ok(())
    }

    /// Cut a 4-cycle with whichever diagonal is valid, preferring v0-v2.
    /// A triangle is left alone.
    pub fn fill_quadrilateral(&mut self, e: EdgeIdx, queue: &mut Vec<EdgeIdx>, eps: Real) -> Result<()> {
        let face = self.face_edges(e)?;
        match face.len() {
            3 => return Ok(()),
            4 => {}
            _ => return Err(TriangulationError::IllegalPolygon("expected a quadrilateral")),
        }
        let p: Vec<_> = face.iter().map(|&f| self.org_pos(f)).collect();
        let d = if is_left(p[0], p[1], p[2], eps) && is_left(p[0], p[2], p[3], eps) {
            self.connect(face[1], face[0], EdgeKind::Auxiliary)?
        } else if is_left(p[1], p[2], p[3], eps) && is_left(p[1], p[3], p[0], eps) {
            self.connect(face[2], face[1], EdgeKind::Auxiliary)?
        } else {
            return Err(TriangulationError::IllegalPolygon(
                "neither diagonal of the quadrilateral is valid",
            ));
        };
        self.enqueue(queue, d);
        for f in face {
            self.enqueue(queue, f);
        }
        Ok(())
    }

    /// The triangle on face vertices `idx` is counter-clockwise, holds no other
    /// face vertex and is not cut by any side of the face.
    fn triangle_is_clear(&self, face: &[EdgeIdx], idx: [usize; 3], eps: Real) -> bool {
        let v = idx.map(|i| self.origin(face[i]));
        let p = v.map(|i| self.pos(i));
        if !is_left(p[0], p[1], p[2], eps) {
            return false;
        }
        for &f in face {
            let o = self.origin(f);
            if !v.contains(&o) && in_triangle(self.pos(o), p[0], p[1], p[2], eps) {
                return false;
            }
            let (s0, s1) = (self.org_pos(f), self.dst_pos(f));
            for k in 0..3 {
                if segments_cross(p[k], p[(k + 1) % 3], s0, s1, eps) {
                    return false;
                }
            }
        }
        true
    }
}
