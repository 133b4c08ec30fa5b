use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Shape of a mesh cell.
///
/// The numeric values match the VTK cell type ids so meshes coming from VTK
/// files can be tagged without a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellShape {
    Empty = 0,
    Vertex = 1,
    Line = 3,
    PolyLine = 4,
    Triangle = 5,
    Polygon = 7,
    Quad = 9,
    Tetra = 10,
    Hexahedron = 12,
    Wedge = 13,
    Pyramid = 14,
}

impl CellShape {
    /// Returns the VTK id of this shape.
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Number of points a cell of this shape has, or `None` for variable-size shapes.
    #[must_use]
    pub fn num_points(self) -> Option<usize> {
        match self {
            Self::Empty => Some(0),
            Self::Vertex => Some(1),
            Self::Line => Some(2),
            Self::Triangle => Some(3),
            Self::Quad | Self::Tetra => Some(4),
            Self::Pyramid => Some(5),
            Self::Wedge => Some(6),
            Self::Hexahedron => Some(8),
            Self::PolyLine | Self::Polygon => None,
        }
    }

    /// Smallest point count accepted for this shape.
    #[must_use]
    pub fn min_points(self) -> usize {
        match self {
            Self::PolyLine => 2,
            Self::Polygon => 3,
            other => other.num_points().unwrap_or(0),
        }
    }

    /// Topological dimension of the shape.
    #[must_use]
    pub fn dimension(self) -> u8 {
        match self {
            Self::Empty | Self::Vertex => 0,
            Self::Line | Self::PolyLine => 1,
            Self::Triangle | Self::Polygon | Self::Quad => 2,
            Self::Tetra | Self::Hexahedron | Self::Wedge | Self::Pyramid => 3,
        }
    }
}

impl TryFrom<u8> for CellShape {
    type Error = MeshError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            0 => Self::Empty,
            1 => Self::Vertex,
            3 => Self::Line,
            4 => Self::PolyLine,
            5 => Self::Triangle,
            7 => Self::Polygon,
            9 => Self::Quad,
            10 => Self::Tetra,
            12 => Self::Hexahedron,
            13 => Self::Wedge,
            14 => Self::Pyramid,
            other => return Err(MeshError::UnknownShape(other)),
        })
    }
}
