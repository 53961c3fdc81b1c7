// Copyright 2025 Lars Brubaker
// Half-edge mesh for the interactive triangulation.
//
// All references between points and half-edges are u32 indices into Vec
// arenas, so the cyclic graph never holds a pointer.
//
// Design:
//   - INVALID: u32::MAX  (null index)
//   - Half-edges allocated in pairs: edges[i] and edges[i^1] are always a pair.
//     sym(e) = e ^ 1, which makes the sibling relation mutual by construction.
//   - Faces are `next` cycles. Interior faces run counter-clockwise and are
//     triangles at rest. The outer face is the cycle of EXTERIOR half-edges,
//     which runs clockwise in the plane.
//   - Removed points and half-edges are tombstoned, never reused. A dead
//     half-edge has next == INVALID; a dead point has kind Deleted.

mod delaunay;
mod fill;
mod locate;

pub use locate::Location;

use crate::error::{Result, TriangulationError};
use crate::geom::{Coord, Real};

pub const INVALID: u32 = u32::MAX;

/// Index into Mesh::verts
pub type PointIdx = u32;
/// Index into Mesh::edges
pub type EdgeIdx = u32;

/// Half-edge lies on the outer face.
pub const EXTERIOR: u8 = 0x01;
/// Pair is waiting on the legalization queue.
pub const QUEUED: u8 = 0x02;

/// Compute the symmetric half-edge index (always the other half of the pair).
#[inline(always)]
pub fn sym(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointKind {
    Boundary,
    Interior,
    /// Frontier of a flood delete. Never visible outside a mutator.
    Bounds,
    Deleted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Auxiliary,
    Boundary,
    Constraint,
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub pos: Coord,
    pub kind: PointKind,
    /// Some live half-edge whose origin is this point.
    pub edge: EdgeIdx,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            pos: Coord::default(),
            kind: PointKind::Deleted,
            edge: INVALID,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    pub origin: PointIdx,
    /// Counter-clockwise successor around the left face.
    pub next: EdgeIdx,
    pub kind: EdgeKind,
    pub flags: u8,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            origin: INVALID,
            next: INVALID,
            kind: EdgeKind::Auxiliary,
            flags: 0,
        }
    }
}

/// The half-edge mesh.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub edges: Vec<HalfEdge>,
}

impl Mesh {
    pub fn new() -> Self {
        Mesh::default()
    }

    // ──────────────── Arena bookkeeping ────────────────

    pub fn add_vertex(&mut self, pos: Coord, kind: PointKind) -> PointIdx {
        let v = self.verts.len() as PointIdx;
        self.verts.push(Vertex {
            pos,
            kind,
            edge: INVALID,
        });
        v
    }

    /// Allocate a pair org->dst. Both halves start as an isolated 2-cycle.
    /// Returns the half starting at `org`.
    pub fn make_edge_pair(&mut self, org: PointIdx, dst: PointIdx, kind: EdgeKind) -> EdgeIdx {
        let e = self.edges.len() as EdgeIdx;
        self.edges.push(HalfEdge {
            origin: org,
            next: e ^ 1,
            kind,
            flags: 0,
        });
        self.edges.push(HalfEdge {
            origin: dst,
            next: e,
            kind,
            flags: 0,
        });
        if self.verts[org as usize].edge == INVALID {
            self.verts[org as usize].edge = e;
        }
        if self.verts[dst as usize].edge == INVALID {
            self.verts[dst as usize].edge = e ^ 1;
        }
        e
    }

    /// Mark both halves as deleted (we don't actually reclaim the Vec slots).
    pub fn kill_edge(&mut self, e: EdgeIdx) {
        for h in [e, e ^ 1] {
            let he = &mut self.edges[h as usize];
            he.next = INVALID;
            he.flags = 0;
            he.kind = EdgeKind::Auxiliary;
        }
    }

    pub fn kill_vertex(&mut self, v: PointIdx) {
        let vx = &mut self.verts[v as usize];
        vx.kind = PointKind::Deleted;
        vx.edge = INVALID;
    }

    #[inline]
    pub fn is_live_edge(&self, e: EdgeIdx) -> bool {
        (e as usize) < self.edges.len() && self.edges[e as usize].next != INVALID
    }

    #[inline]
    pub fn is_live_vertex(&self, v: PointIdx) -> bool {
        (v as usize) < self.verts.len() && self.verts[v as usize].kind != PointKind::Deleted
    }

    pub fn live_vertex(&self, v: PointIdx) -> Result<&Vertex> {
        if self.is_live_vertex(v) {
            Ok(&self.verts[v as usize])
        } else {
            Err(TriangulationError::MissingPoint(v))
        }
    }

    /// Even index of every live pair.
    pub fn live_pairs(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        (0..self.edges.len() as EdgeIdx)
            .step_by(2)
            .filter(move |&e| self.is_live_edge(e))
    }

    pub fn live_vertices(&self) -> impl Iterator<Item = PointIdx> + '_ {
        (0..self.verts.len() as PointIdx).filter(move |&v| self.is_live_vertex(v))
    }

    /// Loop bound for any walk over the current arena.
    #[inline]
    pub fn step_bound(&self) -> usize {
        self.edges.len() + 4
    }

    // ──────────────── Navigation helpers ────────────────

    #[inline]
    pub fn origin(&self, e: EdgeIdx) -> PointIdx {
        self.edges[e as usize].origin
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> PointIdx {
        self.edges[(e ^ 1) as usize].origin
    }

    #[inline]
    pub fn next(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].next
    }

    #[inline]
    pub fn kind(&self, e: EdgeIdx) -> EdgeKind {
        self.edges[e as usize].kind
    }

    #[inline]
    pub fn pos(&self, v: PointIdx) -> Coord {
        self.verts[v as usize].pos
    }

    #[inline]
    pub fn org_pos(&self, e: EdgeIdx) -> Coord {
        self.pos(self.origin(e))
    }

    #[inline]
    pub fn dst_pos(&self, e: EdgeIdx) -> Coord {
        self.pos(self.dst(e))
    }

    #[inline]
    pub fn has_flag(&self, e: EdgeIdx, flag: u8) -> bool {
        self.edges[e as usize].flags & flag != 0
    }

    #[inline]
    pub fn set_flag(&mut self, e: EdgeIdx, flag: u8) {
        self.edges[e as usize].flags |= flag;
    }

    #[inline]
    pub fn clear_flag(&mut self, e: EdgeIdx, flag: u8) {
        self.edges[e as usize].flags &= !flag;
    }

    #[inline]
    pub fn is_exterior(&self, e: EdgeIdx) -> bool {
        self.has_flag(e, EXTERIOR)
    }

    /// Set the kind of both halves.
    pub fn set_kind(&mut self, e: EdgeIdx, kind: EdgeKind) {
        self.edges[e as usize].kind = kind;
        self.edges[(e ^ 1) as usize].kind = kind;
    }

    /// Predecessor of `e` in its face cycle.
    pub fn prev(&self, e: EdgeIdx) -> Result<EdgeIdx> {
        let bound = self.step_bound();
        let mut cur = e;
        for _ in 0..bound {
            let n = self.next(cur);
            if n == e {
                return Ok(cur);
            }
            if n == INVALID {
                return Err(TriangulationError::Structure {
                    edge: cur,
                    detail: "face cycle reaches a dead half-edge",
                });
            }
            cur = n;
        }
        Err(TriangulationError::Exhausted {
            operation: "prev",
            bound,
        })
    }

    /// Next outgoing half-edge clockwise around org(e).
    #[inline]
    pub fn rot_cw(&self, e: EdgeIdx) -> EdgeIdx {
        self.next(e ^ 1)
    }

    /// Next outgoing half-edge counter-clockwise around org(e).
    pub fn rot_ccw(&self, e: EdgeIdx) -> Result<EdgeIdx> {
        Ok(self.prev(e)? ^ 1)
    }

    /// Half-edges of the face left of `e`, starting with `e`.
    pub fn face_edges(&self, e: EdgeIdx) -> Result<Vec<EdgeIdx>> {
        let bound = self.step_bound();
        let mut out = Vec::with_capacity(3);
        let mut cur = e;
        loop {
            if !self.is_live_edge(cur) {
                return Err(TriangulationError::MissingEdge(cur));
            }
            out.push(cur);
            if out.len() > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "face_edges",
                    bound,
                });
            }
            cur = self.next(cur);
            if cur == e {
                return Ok(out);
            }
        }
    }

    pub fn face_len(&self, e: EdgeIdx) -> Result<usize> {
        Ok(self.face_edges(e)?.len())
    }

    #[inline]
    pub fn is_triangle(&self, e: EdgeIdx) -> bool {
        let n = self.next(e);
        n != INVALID && self.next(n) != INVALID && self.next(self.next(n)) == e
    }

    /// Outgoing half-edges of `v` in counter-clockwise order.
    pub fn star(&self, v: PointIdx) -> Result<Vec<EdgeIdx>> {
        let start = self.live_vertex(v)?.edge;
        if start == INVALID {
            return Ok(Vec::new());
        }
        let bound = self.step_bound();
        let mut out = Vec::new();
        let mut e = start;
        loop {
            if !self.is_live_edge(e) || self.origin(e) != v {
                return Err(TriangulationError::Structure {
                    edge: e,
                    detail: "rotation left the vertex star",
                });
            }
            out.push(e);
            if out.len() > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "star",
                    bound,
                });
            }
            e = self.rot_cw(e);
            if e == start {
                break;
            }
        }
        out.reverse();
        Ok(out)
    }

    /// Half-edge a->b if the points are adjacent.
    pub fn find_edge(&self, a: PointIdx, b: PointIdx) -> Result<Option<EdgeIdx>> {
        Ok(self.star(a)?.into_iter().find(|&e| self.dst(e) == b))
    }

    /// The outgoing half-edge of a boundary point that lies on the outer face.
    pub fn exterior_edge_from(&self, v: PointIdx) -> Result<Option<EdgeIdx>> {
        Ok(self.star(v)?.into_iter().find(|&e| self.is_exterior(e)))
    }

    /// Some interior face (as a half-edge) incident to `v`.
    pub fn interior_edge_from(&self, v: PointIdx) -> Result<Option<EdgeIdx>> {
        Ok(self.star(v)?.into_iter().find(|&e| !self.is_exterior(e)))
    }

    // ──────────────── Structural edits ────────────────

    /// Split the face shared by `e_org` and `e_dst` with a new edge from
    /// dst(e_org) to org(e_dst). The new half lies in the face that keeps
    /// e_dst; its sibling takes the cycle after e_org. Returns the new half.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx, kind: EdgeKind) -> Result<EdgeIdx> {
        let after = self.next(e_org);
        if after == e_dst || e_org == e_dst {
            return Err(TriangulationError::Structure {
                edge: e_org,
                detail: "connect would create a degenerate face",
            });
        }
        let before = self.prev(e_dst)?;
        let a = self.dst(e_org);
        let b = self.origin(e_dst);
        if a == b {
            return Err(TriangulationError::Structure {
                edge: e_dst,
                detail: "connect would create a loop edge",
            });
        }
        let e = self.make_edge_pair(a, b, kind);
        let s = e ^ 1;
        self.edges[e_org as usize].next = e;
        self.edges[e as usize].next = e_dst;
        self.edges[before as usize].next = s;
        self.edges[s as usize].next = after;
        Ok(e)
    }

    /// Delete the pair containing `e`, merging its two faces. Points left
    /// without edges get INVALID as their incident edge.
    pub fn remove_edge(&mut self, e: EdgeIdx) -> Result<()> {
        if !self.is_live_edge(e) {
            return Err(TriangulationError::MissingEdge(e));
        }
        let s = e ^ 1;
        let ne = self.next(e);
        let ns = self.next(s);
        let pe = self.prev(e)?;
        let ps = self.prev(s)?;
        self.edges[pe as usize].next = ns;
        self.edges[ps as usize].next = ne;

        let a = self.origin(e);
        let b = self.origin(s);
        if self.verts[a as usize].edge == e {
            self.verts[a as usize].edge = if ns != e { ns } else { INVALID };
        }
        if self.verts[b as usize].edge == s {
            self.verts[b as usize].edge = if ne != s { ne } else { INVALID };
        }
        self.kill_edge(e);
        Ok(())
    }

    /// Remove every edge of `v` and tombstone it.
    pub fn isolate_vertex(&mut self, v: PointIdx) -> Result<()> {
        let bound = self.step_bound();
        let mut steps = 0;
        while self.verts[v as usize].edge != INVALID {
            steps += 1;
            if steps > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "isolate_vertex",
                    bound,
                });
            }
            let e = self.verts[v as usize].edge;
            self.remove_edge(e)?;
        }
        self.kill_vertex(v);
        Ok(())
    }

    /// Split the triangle left of `e` into three around `v`.
    /// Returns the three spokes v->a, v->b, v->c.
    pub fn split_triangle(&mut self, e: EdgeIdx, v: PointIdx) -> Result<[EdgeIdx; 3]> {
        if !self.is_triangle(e) {
            return Err(TriangulationError::Structure {
                edge: e,
                detail: "split_triangle on a non-triangular face",
            });
        }
        let e0 = e;
        let e1 = self.next(e0);
        let e2 = self.next(e1);
        let (a, b, c) = (self.origin(e0), self.origin(e1), self.origin(e2));

        let pa = self.make_edge_pair(v, a, EdgeKind::Auxiliary);
        let pb = self.make_edge_pair(v, b, EdgeKind::Auxiliary);
        let pc = self.make_edge_pair(v, c, EdgeKind::Auxiliary);

        // (a, b, v)
        self.edges[e0 as usize].next = pb ^ 1;
        self.edges[(pb ^ 1) as usize].next = pa;
        self.edges[pa as usize].next = e0;
        // (b, c, v)
        self.edges[e1 as usize].next = pc ^ 1;
        self.edges[(pc ^ 1) as usize].next = pb;
        self.edges[pb as usize].next = e1;
        // (c, a, v)
        self.edges[e2 as usize].next = pa ^ 1;
        self.edges[(pa ^ 1) as usize].next = pc;
        self.edges[pc as usize].next = e2;

        self.verts[v as usize].edge = pa;
        Ok([pa, pb, pc])
    }

    /// Split the interior edge a->b at `v` into four triangles. `e` keeps
    /// a->v; the new v->b pair inherits the edge kind. Returns the new
    /// outgoing half-edges of `v`: [v->a, v->b, v->c, v->d].
    pub fn split_edge(&mut self, e: EdgeIdx, v: PointIdx) -> Result<[EdgeIdx; 4]> {
        let s = e ^ 1;
        if self.is_exterior(e) || self.is_exterior(s) {
            return Err(TriangulationError::EdgeType {
                edge: e,
                found: self.kind(e),
                expected: EdgeKind::Auxiliary,
            });
        }
        if !self.is_triangle(e) || !self.is_triangle(s) {
            return Err(TriangulationError::Structure {
                edge: e,
                detail: "split_edge next to a non-triangular face",
            });
        }
        let e1 = self.next(e);
        let e2 = self.next(e1);
        let f1 = self.next(s);
        let f2 = self.next(f1);
        let b = self.origin(s);
        let c = self.origin(e2);
        let d = self.origin(f2);
        let kind = self.kind(e);

        let hb = self.make_edge_pair(v, b, kind);
        let hc = self.make_edge_pair(v, c, EdgeKind::Auxiliary);
        let hd = self.make_edge_pair(v, d, EdgeKind::Auxiliary);
        self.edges[s as usize].origin = v;
        if self.verts[b as usize].edge == s {
            self.verts[b as usize].edge = e1;
        }

        // (a, v, c)
        self.edges[e as usize].next = hc;
        self.edges[hc as usize].next = e2;
        self.edges[e2 as usize].next = e;
        // (v, b, c)
        self.edges[hb as usize].next = e1;
        self.edges[e1 as usize].next = hc ^ 1;
        self.edges[(hc ^ 1) as usize].next = hb;
        // (b, v, d)
        self.edges[(hb ^ 1) as usize].next = hd;
        self.edges[hd as usize].next = f2;
        self.edges[f2 as usize].next = hb ^ 1;
        // (v, a, d)
        self.edges[s as usize].next = f1;
        self.edges[f1 as usize].next = hd ^ 1;
        self.edges[(hd ^ 1) as usize].next = s;

        self.verts[v as usize].edge = hb;
        Ok([s, hb, hc, hd])
    }

    /// Split a boundary edge at `v`. `e` is the interior half a->b and keeps
    /// a->v. The face left of `e` becomes the quadrilateral a, v, b, c, left
    /// unfilled. Returns the new interior half v->b.
    pub fn split_boundary_edge(&mut self, e: EdgeIdx, v: PointIdx) -> Result<EdgeIdx> {
        let s = e ^ 1;
        if self.kind(e) != EdgeKind::Boundary || self.is_exterior(e) || !self.is_exterior(s) {
            return Err(TriangulationError::EdgeType {
                edge: e,
                found: self.kind(e),
                expected: EdgeKind::Boundary,
            });
        }
        let b = self.origin(s);
        let e1 = self.next(e);
        let ext_before = self.prev(s)?;

        let hb = self.make_edge_pair(v, b, EdgeKind::Boundary);
        let hb_ext = hb ^ 1;
        self.set_flag(hb_ext, EXTERIOR);
        self.edges[s as usize].origin = v;
        if self.verts[b as usize].edge == s {
            self.verts[b as usize].edge = hb_ext;
        }

        self.edges[e as usize].next = hb;
        self.edges[hb as usize].next = e1;
        self.edges[ext_before as usize].next = hb_ext;
        self.edges[hb_ext as usize].next = s;

        self.verts[v as usize].edge = hb;
        Ok(hb)
    }

    /// Move the whole identity of `from` (position, kind, edges) into the
    /// slot `into`, tombstoning `from`. `into` must have no live edges.
    pub fn reseat_vertex(&mut self, from: PointIdx, into: PointIdx) -> Result<()> {
        if self.verts[into as usize].edge != INVALID {
            return Err(TriangulationError::Structure {
                edge: self.verts[into as usize].edge,
                detail: "reseat target still has edges",
            });
        }
        for e in self.star(from)? {
            self.edges[e as usize].origin = into;
        }
        let src = self.verts[from as usize].clone();
        self.verts[into as usize] = src;
        self.kill_vertex(from);
        Ok(())
    }

    /// Push the pair of `e` onto the legalization queue unless already queued.
    pub fn enqueue(&mut self, queue: &mut Vec<EdgeIdx>, e: EdgeIdx) {
        if !self.is_live_edge(e) || self.has_flag(e, QUEUED) {
            return;
        }
        self.set_flag(e, QUEUED);
        self.set_flag(e ^ 1, QUEUED);
        queue.push(e);
    }

    /// Positions of the face left of `e`.
    pub fn face_coords(&self, e: EdgeIdx) -> Result<Vec<Coord>> {
        Ok(self
            .face_edges(e)?
            .into_iter()
            .map(|h| self.org_pos(h))
            .collect())
    }

    /// Nearest live point to `c` by linear scan.
    pub fn nearest_vertex(&self, c: Coord) -> Option<(PointIdx, Real)> {
        self.live_vertices()
            .map(|v| (v, self.pos(v).dist_sq(c)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(v, d)| (v, d.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square as one CCW interior face plus the outer cycle.
    fn square() -> (Mesh, EdgeIdx) {
        let mut m = Mesh::new();
        let pts = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        let vs: Vec<PointIdx> = pts
            .iter()
            .map(|&p| m.add_vertex(p.into(), PointKind::Boundary))
            .collect();
        let n = vs.len();
        let es: Vec<EdgeIdx> = (0..n)
            .map(|i| m.make_edge_pair(vs[i], vs[(i + 1) % n], EdgeKind::Boundary))
            .collect();
        for i in 0..n {
            m.set_flag(es[i], EXTERIOR);
            m.edges[es[i] as usize].next = es[(i + 1) % n];
            m.edges[(es[i] ^ 1) as usize].next = es[(i + n - 1) % n] ^ 1;
        }
        (m, es[0] ^ 1)
    }

    #[test]
    fn pairs_are_siblings() {
        let mut m = Mesh::new();
        let a = m.add_vertex(Coord::new(0.0, 0.0), PointKind::Interior);
        let b = m.add_vertex(Coord::new(1.0, 0.0), PointKind::Interior);
        let e = m.make_edge_pair(a, b, EdgeKind::Auxiliary);
        assert_eq!(sym(sym(e)), e);
        assert_eq!(m.origin(e), a);
        assert_eq!(m.dst(e), b);
        assert_eq!(m.next(e), sym(e));
    }

    #[test]
    fn square_faces() {
        let (m, inner) = square();
        assert_eq!(m.face_len(inner).unwrap(), 4);
        assert_eq!(m.face_len(inner ^ 1).unwrap(), 4);
        assert!(m.is_exterior(inner ^ 1));
        assert_eq!(m.star(0).unwrap().len(), 2);
    }

    #[test]
    fn connect_and_remove_diagonal() {
        let (mut m, inner) = square();
        // inner = 1 -> 0; next is 0 -> 3.
        let e1 = m.next(inner);
        let d = m.connect(e1, inner, EdgeKind::Auxiliary).unwrap();
        assert_eq!(m.origin(d), 3);
        assert_eq!(m.dst(d), 1);
        assert!(m.is_triangle(d));
        assert!(m.is_triangle(d ^ 1));
        assert_eq!(m.find_edge(1, 3).unwrap(), Some(d ^ 1));

        m.remove_edge(d).unwrap();
        assert!(!m.is_live_edge(d));
        assert_eq!(m.face_len(inner).unwrap(), 4);
        assert_eq!(m.find_edge(1, 3).unwrap(), None);
    }

    #[test]
    fn rotation_round_trip() {
        let (mut m, inner) = square();
        let e1 = m.next(inner);
        m.connect(e1, inner, EdgeKind::Auxiliary).unwrap();
        let star = m.star(1).unwrap();
        assert_eq!(star.len(), 3);
        for &e in &star {
            assert_eq!(m.rot_ccw(m.rot_cw(e)).unwrap(), e);
        }
    }

    #[test]
    fn split_triangle_makes_three_faces() {
        let (mut m, inner) = square();
        let e1 = m.next(inner);
        let d = m.connect(e1, inner, EdgeKind::Auxiliary).unwrap();
        let v = m.add_vertex(Coord::new(0.2, 0.3), PointKind::Interior);
        let spokes = m.split_triangle(d, v).unwrap();
        for s in spokes {
            assert_eq!(m.origin(s), v);
            assert!(m.is_triangle(s));
            assert!(m.is_triangle(s ^ 1));
        }
        assert_eq!(m.star(v).unwrap().len(), 3);
    }

    #[test]
    fn split_boundary_edge_keeps_outer_cycle() {
        let (mut m, inner) = square();
        let v = m.add_vertex(Coord::new(0.0, 0.5), PointKind::Boundary);
        let hb = m.split_boundary_edge(inner, v).unwrap();
        assert_eq!(m.origin(hb), v);
        assert_eq!(m.face_len(inner).unwrap(), 5);
        assert_eq!(m.face_len(inner ^ 1).unwrap(), 5);
        assert!(m.is_exterior(hb ^ 1));
        assert_eq!(m.exterior_edge_from(v).unwrap(), Some(inner ^ 1));
    }
}
