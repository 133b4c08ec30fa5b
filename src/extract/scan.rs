use rayon::prelude::*;

use crate::hash::{FaceHash, FaceHashKind};
use crate::mesh::{CellId, UnstructuredMesh};
use crate::topology::{canonical_face_id, num_faces, CanonicalFaceId};

/// Number of faces of every cell.
pub(crate) fn faces_per_cell(mesh: &UnstructuredMesh) -> Vec<usize> {
    mesh.shapes().par_iter().map(|&shape| num_faces(shape)).collect()
}

/// Canonical id of face `face` of `cell`.
pub(crate) fn canonical_of(mesh: &UnstructuredMesh, cell: CellId, face: usize) -> CanonicalFaceId {
    canonical_face_id(mesh.cell_shape(cell), face, mesh.cell_points(cell))
}

/// Exclusive prefix sum of `counts`, with the total appended.
///
/// The result has `counts.len() + 1` entries; entry `i` is where item `i` starts.
pub(crate) fn offsets_from_counts(counts: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut running = 0;
    offsets.push(0);
    for &count in counts {
        running += count;
        offsets.push(running);
    }
    offsets
}

/// Splits `data` into consecutive mutable runs delimited by `offsets`.
///
/// `offsets` must start at 0, be non-decreasing and end at or before `data.len()`.
pub(crate) fn split_by_offsets<'a, T>(
    mut data: &'a mut [T],
    offsets: &[usize],
) -> Vec<&'a mut [T]> {
    let mut parts = Vec::with_capacity(offsets.len().saturating_sub(1));
    for window in offsets.windows(2) {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(window[1] - window[0]);
        parts.push(head);
        data = tail;
    }
    parts
}

/// Per-face arrays in the flat (cell, face) index space.
pub(crate) struct FaceArrays {
    pub(crate) hashes: Vec<FaceHash>,
    pub(crate) origin_cells: Vec<CellId>,
    pub(crate) origin_faces: Vec<u8>,
}

impl FaceArrays {
    pub(crate) fn len(&self) -> usize {
        self.hashes.len()
    }

    /// (origin cell, local face index) of flat face `index`.
    pub(crate) fn origin(&self, index: usize) -> (CellId, usize) {
        (self.origin_cells[index], usize::from(self.origin_faces[index]))
    }

    pub(crate) fn canonical_id(&self, mesh: &UnstructuredMesh, index: usize) -> CanonicalFaceId {
        let (cell, face) = self.origin(index);
        canonical_of(mesh, cell, face)
    }
}

/// Hashes every face, laid out by `cell_offsets` (one entry per cell plus the total).
pub(crate) fn hash_faces(
    mesh: &UnstructuredMesh,
    cell_offsets: &[usize],
    kind: FaceHashKind,
) -> FaceArrays {
    let total = cell_offsets.last().copied().unwrap_or(0);
    let mut hashes = vec![0; total];
    let mut origin_cells = vec![0; total];
    let mut origin_faces = vec![0_u8; total];

    split_by_offsets(&mut hashes, cell_offsets)
        .into_par_iter()
        .zip(split_by_offsets(&mut origin_cells, cell_offsets))
        .zip(split_by_offsets(&mut origin_faces, cell_offsets))
        .enumerate()
        .for_each(|(cell, ((hashes, cells), faces))| {
            let shape = mesh.cell_shape(cell);
            let points = mesh.cell_points(cell);
            for face in 0..hashes.len() {
                hashes[face] = kind.hash_face(shape, face, points);
                cells[face] = cell;
                faces[face] = u8::try_from(face).unwrap_or(u8::MAX);
            }
        });

    FaceArrays {
        hashes,
        origin_cells,
        origin_faces,
    }
}
