// Copyright 2025 Lars Brubaker
// WASM bindings for halfedge-cdt

use halfedge_cdt::{Coord, EdgeFilter, TriOption, Triangulation};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

fn js_err(e: halfedge_cdt::TriangulationError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn pairs(flat: &[f64]) -> Vec<Coord> {
    flat.chunks_exact(2).map(|p| Coord::new(p[0], p[1])).collect()
}

fn edge_filter(filter: u32) -> EdgeFilter {
    match filter {
        1 => EdgeFilter::Constrained,
        2 => EdgeFilter::Boundary,
        3 => EdgeFilter::Unconstrained,
        _ => EdgeFilter::All,
    }
}

/// A live triangulation the page edits point by point.
#[wasm_bindgen]
pub struct TriangulationJs {
    inner: Triangulation,
}

impl Default for TriangulationJs {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl TriangulationJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TriangulationJs {
        TriangulationJs {
            inner: Triangulation::new(),
        }
    }

    /// Set an option (0 = ValidateAfterEdit, 1 = BruteForceLocate).
    pub fn set_option(&mut self, option: u32, value: bool) {
        let opt = match option {
            0 => TriOption::ValidateAfterEdit,
            1 => TriOption::BruteForceLocate,
            _ => return,
        };
        self.inner.set_option(opt, value);
    }

    pub fn set_tolerance(&mut self, eps: f64) {
        self.inner.set_tolerance(eps);
    }

    /// Start over from a flat [x0,y0, x1,y1, ...] boundary.
    pub fn start_with_boundary(&mut self, points: &[f64], reverse: bool) -> Result<Vec<u32>, JsValue> {
        self.inner.start_with_boundary(&pairs(points), reverse).map_err(js_err)
    }

    pub fn add_interior_point(&mut self, x: f64, y: f64) -> Result<u32, JsValue> {
        self.inner.add_interior_point(Coord::new(x, y)).map_err(js_err)
    }

    /// Insert on the boundary edge leaving boundary point number `index`.
    pub fn add_boundary_point(&mut self, x: f64, y: f64, index: u32) -> Result<u32, JsValue> {
        self.inner
            .add_boundary_point_at(Coord::new(x, y), index as usize)
            .map_err(js_err)
    }

    pub fn remove_interior_point(&mut self, p: u32) -> Result<(), JsValue> {
        self.inner.remove_interior_point(p).map_err(js_err)
    }

    pub fn remove_boundary_point(&mut self, p: u32) -> Result<(), JsValue> {
        self.inner.remove_boundary_point(p).map_err(js_err)
    }

    /// Move any point; boundary points reshape the domain.
    pub fn move_point(&mut self, p: u32, x: f64, y: f64) -> Result<(), JsValue> {
        let c = Coord::new(x, y);
        match self.inner.kind(p) {
            Some(halfedge_cdt::PointKind::Boundary) => self.inner.update_boundary_point(p, c),
            _ => self.inner.update_interior_point(p, c),
        }
        .map_err(js_err)
    }

    pub fn add_constraint(&mut self, a: u32, b: u32) -> Result<Vec<u32>, JsValue> {
        self.inner.add_constraint(a, b).map_err(js_err)
    }

    pub fn remove_constraint(&mut self, a: u32, b: u32) -> Result<(), JsValue> {
        self.inner.remove_constraint(a, b).map_err(js_err)
    }

    /// Nearest point handle to (x, y), or -1 when empty.
    pub fn nearest_point(&self, x: f64, y: f64) -> i64 {
        self.inner
            .nearest_point(Coord::new(x, y))
            .map_or(-1, |(p, _)| p as i64)
    }

    pub fn is_poisoned(&self) -> bool {
        self.inner.is_poisoned()
    }

    /// Flat triangle corner positions [x0,y0, x1,y1, x2,y2, ...].
    pub fn get_triangles(&self) -> Vec<f64> {
        self.inner
            .triangles()
            .iter()
            .flat_map(|t| t.iter().flat_map(|p| [p.x, p.y]))
            .collect()
    }

    /// Flat segment end positions [ax,ay, bx,by, ...].
    /// filter: 0=All 1=Constrained 2=Boundary 3=Unconstrained
    pub fn get_edges(&self, filter: u32) -> Vec<f64> {
        self.inner
            .edges(edge_filter(filter))
            .iter()
            .flat_map(|e| e.iter().flat_map(|p| [p.x, p.y]))
            .collect()
    }

    /// Flat [handle, x, y, kind] records, kind 0 = boundary, 1 = interior.
    pub fn get_points(&self) -> Vec<f64> {
        self.inner
            .points()
            .into_iter()
            .filter_map(|p| {
                let v = self.inner.point(p)?;
                let kind = if v.kind == halfedge_cdt::PointKind::Boundary { 0.0 } else { 1.0 };
                Some([p as f64, v.pos.x, v.pos.y, kind])
            })
            .flatten()
            .collect()
    }

    pub fn diagnostic_dump(&self) -> String {
        self.inner.diagnostic_dump()
    }
}
