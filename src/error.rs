use thiserror::Error;

use crate::mesh::CellShape;

/// Top-level error type for face extraction.
#[derive(Debug, Error)]
pub enum FacehashError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised while assembling an input mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("unknown cell shape id {0}")]
    UnknownShape(u8),

    #[error("offsets must have {expected} entries (cells + 1), got {actual}")]
    OffsetsLength { expected: usize, actual: usize },

    #[error("offsets must start at 0 and be non-decreasing (cell {cell})")]
    OffsetsNotMonotonic { cell: usize },

    #[error("last offset {last} does not match connectivity length {connectivity}")]
    OffsetsConnectivityMismatch { last: usize, connectivity: usize },

    #[error("cell {cell} ({shape:?}) has {actual} points, expected {expected}")]
    CellPointCount {
        cell: usize,
        shape: CellShape,
        expected: usize,
        actual: usize,
    },

    #[error("cell {cell} references point {point_id}, but the mesh has {num_points} points")]
    PointOutOfRange {
        cell: usize,
        point_id: usize,
        num_points: usize,
    },
}

/// Errors related to face table lookups.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("face {face} is out of range for {shape:?} ({num_faces} faces)")]
    InvalidFace {
        shape: CellShape,
        face: usize,
        num_faces: usize,
    },

    #[error("point {point} is out of range for face {face} of {shape:?} ({num_points} points)")]
    InvalidFacePoint {
        shape: CellShape,
        face: usize,
        point: usize,
        num_points: usize,
    },
}

/// Errors related to extraction configuration.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown {kind} name: {name}")]
    UnknownName { kind: &'static str, name: String },
}

/// Convenience type alias for results using [`FacehashError`].
pub type Result<T> = std::result::Result<T, FacehashError>;
