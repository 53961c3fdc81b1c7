// Copyright 2025 Lars Brubaker
// Interactive constrained Delaunay triangulation.
//
// Every public mutator runs the same sequence: clear the engine-owned
// buffers, locate, edit the mesh, re-fill opened faces, then drain the
// legalization queue before returning. Errors found before the first edit
// leave the mesh untouched. Errors raised after it poison the triangulation.

mod constraint;
mod insert;
mod output;
mod relocate;
mod remove;


pub use output::EdgeFilter;

use std::collections::VecDeque;

use crate::error::{Result, TriangulationError};
use crate::geom::{on_polygon_outline, point_in_polygon, Coord, Real, DEFAULT_TOLERANCE};
use crate::mesh::{EdgeIdx, EdgeKind, Location, Mesh, PointIdx, PointKind, Vertex, INVALID, QUEUED};
use tracing::{debug, error};

// ─────────────────────────────── Public types ──────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriOption {
    /// Run `validate` at the end of every mutator.
    ValidateAfterEdit,
    /// Skip the directed face walk and always scan every face.
    BruteForceLocate,
}

// ─────────────────────────── Triangulation ──────────────────────────────────────

pub struct Triangulation {
    mesh: Mesh,
    tolerance: Real,
    validate_after_edit: bool,
    brute_force_locate: bool,

    // Per-call buffers, cleared when a mutator starts.
    legalize_queue: Vec<EdgeIdx>,
    flood_queue: VecDeque<PointIdx>,
    removed_constraints: Vec<PointIdx>,

    relocating: Option<PointIdx>,
    boundary_count: usize,
    poisoned: bool,
    editing: bool,
}

impl Default for Triangulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Triangulation {
    pub fn new() -> Self {
        Triangulation {
            mesh: Mesh::new(),
            tolerance: DEFAULT_TOLERANCE,
            validate_after_edit: false,
            brute_force_locate: false,
            legalize_queue: Vec::new(),
            flood_queue: VecDeque::new(),
            removed_constraints: Vec::new(),
            relocating: None,
            boundary_count: 0,
            poisoned: false,
            editing: false,
        }
    }

    pub fn set_option(&mut self, option: TriOption, value: bool) {
        match option {
            TriOption::ValidateAfterEdit => self.validate_after_edit = value,
            TriOption::BruteForceLocate => self.brute_force_locate = value,
        }
    }

    /// Distance under which two points are the same point.
    pub fn set_tolerance(&mut self, eps: Real) {
        self.tolerance = eps.abs();
    }

    // ─────── Accessors ────────────────────────────────────────────────────────

    pub fn tolerance(&self) -> Real { self.tolerance }
    pub fn mesh(&self) -> &Mesh { &self.mesh }
    pub fn boundary_count(&self) -> usize { self.boundary_count }
    pub fn is_poisoned(&self) -> bool { self.poisoned }
    pub fn is_empty(&self) -> bool { self.boundary_count == 0 }

    pub fn point(&self, p: PointIdx) -> Option<&Vertex> {
        self.mesh.live_vertex(p).ok()
    }

    pub fn position(&self, p: PointIdx) -> Option<Coord> {
        self.point(p).map(|v| v.pos)
    }

    pub fn kind(&self, p: PointIdx) -> Option<PointKind> {
        self.point(p).map(|v| v.kind)
    }

    /// Handles of all live points, in creation order.
    pub fn points(&self) -> Vec<PointIdx> {
        self.mesh.live_vertices().collect()
    }

    pub fn point_count(&self) -> usize {
        self.mesh.live_vertices().count()
    }

    pub fn find_edge(&self, a: PointIdx, b: PointIdx) -> Option<EdgeIdx> {
        self.mesh.find_edge(a, b).ok().flatten()
    }

    pub fn edge_kind(&self, e: EdgeIdx) -> Option<EdgeKind> {
        self.mesh.is_live_edge(e).then(|| self.mesh.kind(e))
    }

    pub fn origin(&self, e: EdgeIdx) -> Option<PointIdx> {
        self.mesh.is_live_edge(e).then(|| self.mesh.origin(e))
    }

    pub fn destination(&self, e: EdgeIdx) -> Option<PointIdx> {
        self.mesh.is_live_edge(e).then(|| self.mesh.dst(e))
    }

    pub fn next(&self, e: EdgeIdx) -> Option<EdgeIdx> {
        self.mesh.is_live_edge(e).then(|| self.mesh.next(e))
    }

    pub fn sibling(&self, e: EdgeIdx) -> Option<EdgeIdx> {
        self.mesh.is_live_edge(e).then_some(e ^ 1)
    }

    pub fn is_exterior(&self, e: EdgeIdx) -> bool {
        self.mesh.is_live_edge(e) && self.mesh.is_exterior(e)
    }

    /// Nearest live point and its distance.
    pub fn nearest_point(&self, c: Coord) -> Option<(PointIdx, Real)> {
        self.mesh.nearest_vertex(c)
    }

    pub fn locate(&self, c: Coord) -> Result<Location> {
        if self.is_empty() {
            return Err(TriangulationError::Empty);
        }
        self.locate_point(c)
    }

    pub fn triangle_count(&self) -> usize {
        let live = self.mesh.edges.iter().filter(|h| h.next != INVALID).count();
        // Euler on a triangulated disk: half-edges = 3 * faces + boundary.
        live.saturating_sub(self.boundary_count) / 3
    }

    /// Boundary points in clockwise order, starting from the lowest handle.
    pub fn boundary_points(&self) -> Result<Vec<PointIdx>> {
        let Some(start) = self
            .mesh
            .live_vertices()
            .find(|&v| self.mesh.verts[v as usize].kind == PointKind::Boundary)
        else {
            return Ok(Vec::new());
        };
        let e0 = self.exterior_edge(start)?;
        let bound = self.mesh.step_bound();
        let mut out = Vec::with_capacity(self.boundary_count);
        let mut e = e0;
        loop {
            out.push(self.mesh.origin(e));
            if out.len() > bound {
                return Err(TriangulationError::Exhausted {
                    operation: "boundary_points",
                    bound,
                });
            }
            e = self.mesh.next(e);
            if e == e0 {
                return Ok(out);
            }
        }
    }

    pub fn boundary_polygon(&self) -> Result<Vec<Coord>> {
        Ok(self
            .boundary_points()?
            .into_iter()
            .map(|v| self.mesh.pos(v))
            .collect())
    }

    // ─────── Mutator framing ──────────────────────────────────────────────────

    fn begin(&mut self) -> Result<()> {
        if self.poisoned {
            return Err(TriangulationError::Poisoned);
        }
        for e in self.legalize_queue.drain(..) {
            if (e as usize) < self.mesh.edges.len() {
                self.mesh.edges[e as usize].flags &= !QUEUED;
                self.mesh.edges[(e ^ 1) as usize].flags &= !QUEUED;
            }
        }
        self.flood_queue.clear();
        self.removed_constraints.clear();
        self.editing = false;
        Ok(())
    }

    fn require_boundary(&self) -> Result<()> {
        if self.is_empty() {
            Err(TriangulationError::Empty)
        } else {
            Ok(())
        }
    }

    fn finish<T>(&mut self, operation: &'static str, r: Result<T>) -> Result<T> {
        let r = match r {
            Ok(v) => self.settle(operation).map(|_| v),
            Err(err) => Err(err),
        };
        if let Err(err) = &r {
            if self.editing {
                self.poisoned = true;
                error!(
                    operation,
                    %err,
                    dump = %self.diagnostic_dump(),
                    "edit failed part-way; triangulation poisoned"
                );
            } else {
                debug!(operation, %err, "edit rejected");
            }
        }
        self.editing = false;
        self.relocating = None;
        r
    }

    /// Drain the legalization queue and optionally check every invariant.
    fn settle(&mut self, operation: &'static str) -> Result<()> {
        let flips = self.mesh.legalize(&mut self.legalize_queue, self.tolerance)?;
        debug!(operation, flips, points = self.point_count(), "edit complete");
        if self.validate_after_edit {
            self.validate()?;
        }
        Ok(())
    }

    // ─────── Shared helpers ───────────────────────────────────────────────────

    /// Locate from the nearest point, or by scanning when so configured.
    fn locate_point(&self, c: Coord) -> Result<Location> {
        let eps = self.tolerance;
        if self.brute_force_locate {
            return self.mesh.locate_brute_force(c, eps);
        }
        let start = self
            .mesh
            .nearest_vertex(c)
            .and_then(|(v, _)| self.mesh.interior_edge_from(v).ok().flatten());
        match start {
            Some(e) => self.mesh.locate(e, c, eps),
            None => self.mesh.locate_brute_force(c, eps),
        }
    }

    fn exterior_edge(&self, v: PointIdx) -> Result<EdgeIdx> {
        self.mesh
            .exterior_edge_from(v)?
            .ok_or(TriangulationError::Structure {
                edge: self.mesh.verts[v as usize].edge,
                detail: "boundary point has no exterior half-edge",
            })
    }

    /// Previous and next boundary points of `p` in clockwise order.
    fn boundary_neighbors(&self, p: PointIdx) -> Result<(PointIdx, PointIdx)> {
        let out_p = self.exterior_edge(p)?;
        let into_p = self.mesh.prev(out_p)?;
        Ok((self.mesh.origin(into_p), self.mesh.dst(out_p)))
    }

    /// `c` lies strictly inside the boundary.
    fn check_inside_domain(&self, c: Coord) -> Result<()> {
        let poly = self.boundary_polygon()?;
        if point_in_polygon(c, &poly) && !on_polygon_outline(c, &poly, self.tolerance) {
            Ok(())
        } else {
            Err(TriangulationError::OutsideBoundary { x: c.x, y: c.y })
        }
    }

    fn enqueue(&mut self, e: EdgeIdx) {
        self.mesh.enqueue(&mut self.legalize_queue, e);
    }

    /// Queue every spoke of `v` and the edge opposite it.
    fn queue_around(&mut self, v: PointIdx) -> Result<()> {
        for e in self.mesh.star(v)? {
            let opposite = self.mesh.next(e);
            self.enqueue(e);
            self.enqueue(opposite);
        }
        Ok(())
    }

    fn queue_face(&mut self, e: EdgeIdx) -> Result<()> {
        for f in self.mesh.face_edges(e)? {
            self.enqueue(f);
        }
        Ok(())
    }

    fn live_point(&self, p: PointIdx, expected: PointKind) -> Result<Coord> {
        let v = self.mesh.live_vertex(p)?;
        if v.kind != expected {
            return Err(TriangulationError::PointKind {
                point: p,
                found: v.kind,
                expected,
            });
        }
        Ok(v.pos)
    }
}
