// halfedge-cdt: interactive constrained Delaunay triangulation on a half-edge mesh
// Copyright 2025 Lars Brubaker

pub mod error;
pub mod geom;
pub mod mesh;
pub mod triangulation;

pub use error::{Result, TriangulationError};
pub use geom::{Coord, Real, DEFAULT_TOLERANCE};
pub use mesh::{EdgeIdx, EdgeKind, Location, PointIdx, PointKind};
pub use triangulation::{EdgeFilter, TriOption, Triangulation};
