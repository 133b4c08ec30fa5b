use crate::error::TopologyError;
use crate::mesh::CellShape;

/// Largest number of faces any supported shape has (the hexahedron).
pub const MAX_NUM_FACES: usize = 6;

/// Largest number of points on any face of a supported shape.
pub const MAX_POINTS_IN_FACE: usize = 4;

const TETRA_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];

const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 4, 7, 3],
    &[1, 2, 6, 5],
    &[0, 1, 5, 4],
    &[3, 7, 6, 2],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];

const WEDGE_FACES: &[&[usize]] = &[
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];

const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 4, 1],
    &[1, 4, 2],
    &[2, 4, 3],
    &[3, 4, 0],
    &[0, 3, 2, 1],
];

/// Face table of a shape: for every face, the cell-local indices of its points.
///
/// Shapes below three dimensions have no faces.
#[must_use]
pub fn faces(shape: CellShape) -> &'static [&'static [usize]] {
    match shape {
        CellShape::Tetra => TETRA_FACES,
        CellShape::Hexahedron => HEXAHEDRON_FACES,
        CellShape::Wedge => WEDGE_FACES,
        CellShape::Pyramid => PYRAMID_FACES,
        CellShape::Empty
        | CellShape::Vertex
        | CellShape::Line
        | CellShape::PolyLine
        | CellShape::Triangle
        | CellShape::Polygon
        | CellShape::Quad => &[],
    }
}

/// Number of faces of `shape`.
#[must_use]
pub fn num_faces(shape: CellShape) -> usize {
    faces(shape).len()
}

/// Cell-local point indices of face `face` of `shape`.
///
/// # Errors
///
/// Returns [`TopologyError::InvalidFace`] if `face` is out of range.
pub fn face_local_points(shape: CellShape, face: usize) -> Result<&'static [usize], TopologyError> {
    let table = faces(shape);
    table.get(face).copied().ok_or(TopologyError::InvalidFace {
        shape,
        face,
        num_faces: table.len(),
    })
}

/// Number of points on face `face` of `shape`.
///
/// # Errors
///
/// Returns [`TopologyError::InvalidFace`] if `face` is out of range.
pub fn num_points_in_face(shape: CellShape, face: usize) -> Result<usize, TopologyError> {
    face_local_points(shape, face).map(<[usize]>::len)
}

/// Cell-local index of point `point` of face `face` of `shape`.
///
/// # Errors
///
/// Returns a [`TopologyError`] if `face` or `point` is out of range.
pub fn local_point_index(
    shape: CellShape,
    face: usize,
    point: usize,
) -> Result<usize, TopologyError> {
    let local = face_local_points(shape, face)?;
    local
        .get(point)
        .copied()
        .ok_or(TopologyError::InvalidFacePoint {
            shape,
            face,
            point,
            num_points: local.len(),
        })
}

/// Shape of face `face` of `shape`.
///
/// # Errors
///
/// Returns [`TopologyError::InvalidFace`] if `face` is out of range.
pub fn face_shape(shape: CellShape, face: usize) -> Result<CellShape, TopologyError> {
    Ok(shape_of_face_points(face_local_points(shape, face)?.len()))
}

pub(crate) fn shape_of_face_points(num_points: usize) -> CellShape {
    match num_points {
        3 => CellShape::Triangle,
        4 => CellShape::Quad,
        _ => CellShape::Polygon,
    }
}
