// Copyright 2025 Lars Brubaker
// Point removal and flood delete.

use rustc_hash::FxHashSet;

use super::Triangulation;
use crate::error::{Result, TriangulationError};
use crate::geom::{
    between, in_triangle, inside_circumcircle, is_left, on_polygon_outline, orientation,
    point_in_polygon, segments_touch, strictly_in_triangle, Coord, Orientation,
};
use crate::mesh::{EdgeIdx, EdgeKind, PointIdx, PointKind, EXTERIOR, INVALID};
use tracing::debug;

impl Triangulation {
    /// Remove an interior point and re-triangulate the hole it leaves.
    /// Constraints through the point are dropped.
    pub fn remove_interior_point(&mut self, p: PointIdx) -> Result<()> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.delete_interior(p));
        self.finish("remove_interior_point", r)
    }

    /// Remove a boundary point, replacing its two boundary edges by the chord
    /// between its neighbours. Points cut off by the chord are deleted.
    pub fn remove_boundary_point(&mut self, p: PointIdx) -> Result<()> {
        self.begin()?;
        let r = self.require_boundary().and_then(|_| self.delete_boundary(p));
        self.finish("remove_boundary_point", r)
    }

    pub(crate) fn delete_interior(&mut self, p: PointIdx) -> Result<()> {
        let eps = self.tolerance;
        self.live_point(p, PointKind::Interior)?;
        self.editing = true;

        let star = self.mesh.star(p)?;
        if star.is_empty() {
            self.mesh.kill_vertex(p);
            return Ok(());
        }
        for &e in &star {
            self.mesh.set_kind(e, EdgeKind::Auxiliary);
        }
        // Every link edge loses its inner triangle.
        self.queue_around(p)?;

        // Shrink the star by flipping spokes away until at most four remain.
        let bound = self.mesh.step_bound();
        let mut star = star;
        let mut steps = 0;
        while star.len() > 4 {
            steps += 1;
            if steps > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "delete_interior",
                    bound,
                });
            }
            let Some(i) = self.pick_star_flip(p, &star) else {
                break;
            };
            self.mesh.flip_edge(star[i])?;
            self.enqueue(star[i]);
            star = self.mesh.star(p)?;
        }

        let link = self.mesh.next(star[0]);
        for &e in &star {
            self.mesh.remove_edge(e)?;
        }
        self.mesh.kill_vertex(p);
        self.queue_face(link)?;
        if star.len() <= 4 {
            self.mesh.fill_quadrilateral(link, &mut self.legalize_queue, eps)?;
        } else {
            self.mesh.ear_fill(link, &mut self.legalize_queue, eps)?;
        }
        debug!(point = p, degree = star.len(), "removed interior point");
        Ok(())
    }

    /// A spoke whose flip keeps both new triangles counter-clockwise, preferring
    /// one whose cut-off ear has an empty circumcircle.
    fn pick_star_flip(&self, p: PointIdx, star: &[EdgeIdx]) -> Option<usize> {
        let eps = self.tolerance;
        let n = star.len();
        let link: Vec<Coord> = star.iter().map(|&e| self.mesh.dst_pos(e)).collect();
        let pp = self.mesh.pos(p);
        let mut fallback = None;
        for i in 0..n {
            let (a, b, c) = (link[(i + n - 1) % n], link[i], link[(i + 1) % n]);
            if !is_left(a, b, c, eps) || !is_left(a, c, pp, eps) {
                continue;
            }
            let empty = (0..n)
                .filter(|&k| k != i && k != (i + 1) % n && k != (i + n - 1) % n)
                .all(|k| !inside_circumcircle(a, b, c, link[k], eps));
            if empty {
                return Some(i);
            }
            fallback.get_or_insert(i);
        }
        fallback
    }

    pub(crate) fn delete_boundary(&mut self, p: PointIdx) -> Result<()> {
        let eps = self.tolerance;
        let pq = self.live_point(p, PointKind::Boundary)?;
        if self.boundary_count < 4 {
            return Err(TriangulationError::IllegalPolygon(
                "the boundary would have fewer than 3 points",
            ));
        }
        let out_p = self.exterior_edge(p)?;
        let into_p = self.mesh.prev(out_p)?;
        let into_prv = self.mesh.prev(into_p)?;
        let from_nxt = self.mesh.next(out_p);
        let (prv, nxt) = (self.mesh.origin(into_p), self.mesh.dst(out_p));
        let (pp, pn) = (self.mesh.pos(prv), self.mesh.pos(nxt));
        self.check_chord(prv, p, nxt)?;

        let corner = orientation(pp, pq, pn, eps);
        if corner == Orientation::Left {
            // Reflex corner: the chord runs outside, so the triangle prv, p,
            // nxt joins the interior and p becomes an interior point.
            self.editing = true;
            let chord = self.mesh.connect(into_prv, from_nxt, EdgeKind::Boundary)?;
            self.mesh.set_flag(chord, EXTERIOR);
            for h in [into_p, out_p] {
                self.mesh.clear_flag(h, EXTERIOR);
                self.mesh.set_kind(h, EdgeKind::Auxiliary);
            }
            self.mesh.verts[p as usize].kind = PointKind::Interior;
            self.boundary_count -= 1;
            self.delete_interior(p)?;
            debug!(point = p, "removed reflex boundary point");
            return Ok(());
        }

        let on_chord = self.mesh.live_vertices().any(|v| {
            ![prv, p, nxt].contains(&v) && between(pp, pn, self.mesh.pos(v), eps)
        });
        if corner == Orientation::Right && on_chord {
            // Points on the chord join the boundary.
            self.editing = true;
            let path = self.insert_constraint(prv, nxt)?;
            let deleted = self.cut_corner(p, &path)?;
            debug!(point = p, deleted, chain = path.len(), "removed boundary point");
            return Ok(());
        }

        self.editing = true;
        let seeds: Vec<PointIdx> = self
            .mesh
            .live_vertices()
            .filter(|&v| {
                self.mesh.verts[v as usize].kind == PointKind::Interior
                    && strictly_in_triangle(self.mesh.pos(v), pp, pq, pn, eps)
            })
            .collect();
        let deleted = self.flood_delete(&[prv, p, nxt], &seeds)?;
        self.mesh.isolate_vertex(p)?;

        let chord = match self.mesh.find_edge(prv, nxt)? {
            Some(h) => h,
            None => self.mesh.connect(into_prv, from_nxt, EdgeKind::Boundary)?,
        };
        self.mesh.set_kind(chord, EdgeKind::Boundary);
        self.mesh.set_flag(chord, EXTERIOR);
        self.mesh.clear_flag(chord ^ 1, EXTERIOR);
        self.boundary_count -= 1;

        let hole = chord ^ 1;
        let orphans = self.clear_dangling(hole)?;
        self.queue_face(hole)?;
        self.mesh.edge_visible_fill(hole, &mut self.legalize_queue, eps)?;
        for v in orphans {
            self.mesh.verts[v as usize].kind = PointKind::Interior;
            let loc = self.locate_point(self.mesh.pos(v))?;
            self.place_vertex(v, loc)?;
        }
        debug!(point = p, deleted, "removed boundary point");
        Ok(())
    }

    /// Replace the corner at `p` by `path`, a chain from the previous to the
    /// next boundary point through the domain. `p` and everything between
    /// the two chains is deleted. Returns the number of interior points lost.
    pub(crate) fn cut_corner(&mut self, p: PointIdx, path: &[PointIdx]) -> Result<usize> {
        let eps = self.tolerance;
        let n = path.len();
        if n < 2 {
            return Err(TriangulationError::MissingPoint(p));
        }
        let (prv, nxt, inner) = (path[0], path[n - 1], &path[1..n - 1]);

        let mut region = vec![prv, p, nxt];
        region.extend(inner.iter().rev());
        let poly: Vec<Coord> = region.iter().map(|&v| self.mesh.pos(v)).collect();
        let strictly_inside = |x: Coord| point_in_polygon(x, &poly) && !on_polygon_outline(x, &poly, eps);

        let seeds: Vec<PointIdx> = self
            .mesh
            .live_vertices()
            .filter(|&v| {
                self.mesh.verts[v as usize].kind == PointKind::Interior
                    && strictly_inside(self.mesh.pos(v))
            })
            .collect();
        let deleted = self.flood_delete(&region, &seeds)?;
        self.mesh.isolate_vertex(p)?;
        let stray: Vec<EdgeIdx> = self
            .mesh
            .live_pairs()
            .filter(|&e| strictly_inside(self.mesh.org_pos(e).midpoint(self.mesh.dst_pos(e))))
            .collect();
        for e in stray {
            self.mesh.remove_edge(e)?;
        }

        for w in path.windows(2) {
            let h = self
                .mesh
                .find_edge(w[0], w[1])?
                .ok_or(TriangulationError::NotAdjacent(w[0], w[1]))?;
            self.mesh.set_kind(h, EdgeKind::Boundary);
            self.mesh.set_flag(h, EXTERIOR);
            self.mesh.clear_flag(h ^ 1, EXTERIOR);
        }
        for &v in inner {
            self.mesh.verts[v as usize].kind = PointKind::Boundary;
        }
        // p is replaced by the chain's inner points.
        self.boundary_count = self.boundary_count + inner.len() - 1;
        Ok(deleted)
    }

    /// Remove edges with both halves on the face of `e` and return the points
    /// left without any edge.
    fn clear_dangling(&mut self, e: EdgeIdx) -> Result<Vec<PointIdx>> {
        let bound = self.mesh.step_bound();
        for _ in 0..bound {
            let face = self.mesh.face_edges(e)?;
            let Some(&h) = face.iter().find(|&&h| h != e && h != (e ^ 1) && face.contains(&(h ^ 1))) else {
                return Ok(self
                    .mesh
                    .live_vertices()
                    .filter(|&v| self.mesh.verts[v as usize].edge == INVALID)
                    .collect());
            };
            self.mesh.remove_edge(h)?;
        }
        Err(TriangulationError::Exhausted {
            operation: "clear_dangling",
            bound,
        })
    }

    /// Dropping `p` from the boundary must leave it simple: no other boundary
    /// point in the triangle prv, p, nxt and nothing touching the chord.
    pub(crate) fn check_chord(&self, prv: PointIdx, p: PointIdx, nxt: PointIdx) -> Result<()> {
        let eps = self.tolerance;
        let (pp, pq, pn) = (self.mesh.pos(prv), self.mesh.pos(p), self.mesh.pos(nxt));
        let ring = self.boundary_points()?;
        let n = ring.len();
        for i in 0..n {
            let (u, w) = (ring[i], ring[(i + 1) % n]);
            if ![prv, p, nxt].contains(&u) && in_triangle(self.mesh.pos(u), pp, pq, pn, eps) {
                return Err(TriangulationError::IllegalPolygon(
                    "removing the point would cut off another boundary point",
                ));
            }
            if u == p || w == p {
                continue;
            }
            let (pu, pw) = (self.mesh.pos(u), self.mesh.pos(w));
            let touches = if [prv, nxt].contains(&u) || [prv, nxt].contains(&w) {
                let other = if [prv, nxt].contains(&u) { pw } else { pu };
                between(pp, pn, other, eps) || between(pu, pw, pp, eps) && between(pu, pw, pn, eps)
            } else {
                segments_touch(pp, pn, pu, pw, eps)
            };
            if touches {
                return Err(TriangulationError::IllegalPolygon(
                    "the chord would touch the boundary",
                ));
            }
        }
        Ok(())
    }

    /// Delete every point reachable from `seeds` without leaving the polygon
    /// through `bounds` or stepping onto a bounds point. Returns the count.
    pub(crate) fn flood_delete(&mut self, bounds: &[PointIdx], seeds: &[PointIdx]) -> Result<usize> {
        let saved: Vec<(PointIdx, PointKind)> = bounds
            .iter()
            .map(|&v| (v, self.mesh.verts[v as usize].kind))
            .collect();
        for &v in bounds {
            self.mesh.verts[v as usize].kind = PointKind::Bounds;
        }
        let r = self.flood_from(bounds, seeds);
        for (v, kind) in saved {
            self.mesh.verts[v as usize].kind = kind;
        }
        r
    }

    fn flood_from(&mut self, bounds: &[PointIdx], seeds: &[PointIdx]) -> Result<usize> {
        let eps = self.tolerance;
        let poly: Vec<Coord> = bounds.iter().map(|&v| self.mesh.pos(v)).collect();
        let strictly_inside =
            |c: Coord| point_in_polygon(c, &poly) && !on_polygon_outline(c, &poly, eps);

        let mut marked: FxHashSet<PointIdx> = FxHashSet::default();
        self.flood_queue.clear();
        for &s in seeds {
            let kind = self.mesh.verts[s as usize].kind;
            if kind != PointKind::Bounds && kind != PointKind::Deleted && marked.insert(s) {
                self.flood_queue.push_back(s);
            }
        }

        let mut doomed = Vec::new();
        while let Some(v) = self.flood_queue.pop_front() {
            if !strictly_inside(self.mesh.pos(v)) {
                return Err(TriangulationError::Structure {
                    edge: self.mesh.verts[v as usize].edge,
                    detail: "flood delete reached a point outside its bounds",
                });
            }
            doomed.push(v);
            for e in self.mesh.star(v)? {
                let w = self.mesh.dst(e);
                let kind = self.mesh.verts[w as usize].kind;
                if kind == PointKind::Bounds || kind == PointKind::Deleted || marked.contains(&w) {
                    continue;
                }
                if strictly_inside(self.mesh.pos(w)) {
                    marked.insert(w);
                    self.flood_queue.push_back(w);
                }
            }
        }
        for &v in &doomed {
            self.mesh.isolate_vertex(v)?;
        }
        Ok(doomed.len())
    }
}
