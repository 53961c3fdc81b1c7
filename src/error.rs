// Copyright 2025 Lars Brubaker
// Error type shared by the mesh layer and the triangulation mutators.

use crate::geom::Real;
use crate::mesh::{EdgeIdx, EdgeKind, PointIdx, PointKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriangulationError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriangulationError {
    /// A bounded walk ran past the live element count.
    #[error("{operation} exceeded its bound of {bound} steps; the mesh is corrupt or the query is degenerate")]
    Exhausted { operation: &'static str, bound: usize },

    #[error("point {0} is not part of the triangulation")]
    MissingPoint(PointIdx),

    #[error("half-edge {0} is not part of the triangulation")]
    MissingEdge(EdgeIdx),

    #[error("points {0} and {1} are not joined by an edge")]
    NotAdjacent(PointIdx, PointIdx),

    #[error("points {0} and {1} coincide")]
    Coincident(PointIdx, PointIdx),

    #[error("a boundary needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("point {point} is {found:?}, expected {expected:?}")]
    PointKind {
        point: PointIdx,
        found: PointKind,
        expected: PointKind,
    },

    #[error("half-edge {edge} is {found:?}, expected {expected:?}")]
    EdgeType {
        edge: EdgeIdx,
        found: EdgeKind,
        expected: EdgeKind,
    },

    /// Adjacency does not match what the operation relies on.
    #[error("inconsistent structure at half-edge {edge}: {detail}")]
    Structure { edge: EdgeIdx, detail: &'static str },

    #[error("illegal polygon: {0}")]
    IllegalPolygon(&'static str),

    #[error("({x}, {y}) lies outside the boundary")]
    OutsideBoundary { x: Real, y: Real },

    #[error("constraint {0} -> {1} would cross the boundary")]
    ConstraintCrossesBoundary(PointIdx, PointIdx),

    #[error("point {0} is already being relocated")]
    RelocationInProgress(PointIdx),

    #[error("an earlier edit failed part-way; the triangulation must be rebuilt")]
    Poisoned,

    #[error("the triangulation has no boundary yet")]
    Empty,
}
