use crate::mesh::{CellShape, PointId};

use super::face_table::faces;

/// Order-independent identifier of a face: its three smallest global point ids,
/// ascending.
///
/// Two faces of a conforming mesh have equal ids if and only if they are the same
/// face. Distinct faces of a non-conforming mesh that share their three smallest
/// points collide; that case is not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalFaceId(pub [PointId; 3]);

impl CanonicalFaceId {
    /// The smallest point id of the face.
    #[must_use]
    pub fn min_point(&self) -> PointId {
        self.0[0]
    }

    /// Compares the two non-minimum components only.
    ///
    /// Faces bucketed by their minimum point id already agree on component 0.
    #[must_use]
    pub fn matches_upper(&self, other: &Self) -> bool {
        self.0[1] == other.0[1] && self.0[2] == other.0[2]
    }

    /// Canonical id of a face given its global point ids in any order.
    ///
    /// Slots not filled by a face with fewer than three points hold `PointId::MAX`.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = PointId>) -> Self {
        let mut id = [PointId::MAX; 3];
        for next in points {
            if next < id[2] {
                if next < id[1] {
                    id[2] = id[1];
                    if next < id[0] {
                        id[1] = id[0];
                        id[0] = next;
                    } else {
                        id[1] = next;
                    }
                } else {
                    id[2] = next;
                }
            }
        }
        Self(id)
    }
}

/// Iterates the global point ids of a face in face order.
///
/// # Panics
///
/// Panics if `face` is not a face of `shape` or `cell_points` is shorter than the
/// shape requires.
pub fn face_point_ids<'a>(
    shape: CellShape,
    face: usize,
    cell_points: &'a [PointId],
) -> impl ExactSizeIterator<Item = PointId> + 'a {
    faces(shape)[face].iter().map(move |&local| cell_points[local])
}

/// Computes the canonical id of face `face` of a cell.
///
/// # Panics
///
/// Panics if `face` is not a face of `shape`.
#[must_use]
pub fn canonical_face_id(
    shape: CellShape,
    face: usize,
    cell_points: &[PointId],
) -> CanonicalFaceId {
    CanonicalFaceId::from_points(face_point_ids(shape, face, cell_points))
}

/// Smallest global point id on face `face` of a cell.
///
/// # Panics
///
/// Panics if `face` is not a face of `shape`.
#[must_use]
pub fn min_face_point_id(shape: CellShape, face: usize, cell_points: &[PointId]) -> PointId {
    face_point_ids(shape, face, cell_points)
        .min()
        .unwrap_or(PointId::MAX)
}

/// Largest global point id on face `face` of a cell.
///
/// # Panics
///
/// Panics if `face` is not a face of `shape`.
#[must_use]
pub fn max_face_point_id(shape: CellShape, face: usize, cell_points: &[PointId]) -> PointId {
    face_point_ids(shape, face, cell_points).max().unwrap_or(0)
}
