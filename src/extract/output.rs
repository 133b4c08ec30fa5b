use rayon::prelude::*;

use crate::diagnostics::StageReporter;
use crate::mesh::{CellId, CellShape, Point3, PointId, UnstructuredMesh};
use crate::topology::{face_point_ids, faces, shape_of_face_points, CanonicalFaceId};

use super::scan::{offsets_from_counts, split_by_offsets};

/// External faces extracted from a mesh.
///
/// Stored as parallel arrays: face `i` has shape `shapes[i]`, points
/// `connectivity[offsets[i]..offsets[i + 1]]` and was produced by cell
/// `origin_cells[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalFaceSet {
    shapes: Vec<CellShape>,
    offsets: Vec<usize>,
    connectivity: Vec<PointId>,
    origin_cells: Vec<CellId>,
    num_points: usize,
}

/// A borrowed view of one external face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalFace<'a> {
    pub shape: CellShape,
    pub points: &'a [PointId],
    pub origin_cell: CellId,
}

impl ExternalFace<'_> {
    /// Canonical id of this face.
    #[must_use]
    pub fn canonical_id(&self) -> CanonicalFaceId {
        CanonicalFaceId::from_points(self.points.iter().copied())
    }
}

impl ExternalFaceSet {
    /// An empty face set over a mesh with `num_points` points.
    #[must_use]
    pub fn empty(num_points: usize) -> Self {
        Self {
            offsets: vec![0],
            num_points,
            ..Self::default()
        }
    }

    /// Number of faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if there are no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of points of the source mesh.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    #[must_use]
    pub fn shapes(&self) -> &[CellShape] {
        &self.shapes
    }

    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    #[must_use]
    pub fn connectivity(&self) -> &[PointId] {
        &self.connectivity
    }

    #[must_use]
    pub fn origin_cells(&self) -> &[CellId] {
        &self.origin_cells
    }

    /// Face `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn face(&self, index: usize) -> ExternalFace<'_> {
        ExternalFace {
            shape: self.shapes[index],
            points: &self.connectivity[self.offsets[index]..self.offsets[index + 1]],
            origin_cell: self.origin_cells[index],
        }
    }

    /// Iterates all faces in output order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = ExternalFace<'_>> + '_ {
        (0..self.len()).map(move |i| self.face(i))
    }

    /// Canonical ids of all faces, in output order.
    #[must_use]
    pub fn canonical_ids(&self) -> Vec<CanonicalFaceId> {
        (0..self.len())
            .into_par_iter()
            .map(|i| self.face(i).canonical_id())
            .collect()
    }

    /// Drops points no face references and renumbers the connectivity.
    ///
    /// # Panics
    ///
    /// Panics if `mesh` is not the mesh these faces were extracted from.
    #[must_use]
    pub fn compact_points(&self, mesh: &UnstructuredMesh) -> CompactSurface {
        let mut used = vec![false; mesh.num_points()];
        for &point in &self.connectivity {
            used[point] = true;
        }

        let mut new_ids = vec![PointId::MAX; used.len()];
        let mut point_map = Vec::new();
        for (old, &is_used) in used.iter().enumerate() {
            if is_used {
                new_ids[old] = point_map.len();
                point_map.push(old);
            }
        }

        let points = point_map
            .par_iter()
            .map(|&old| mesh.points()[old])
            .collect();
        let connectivity = self
            .connectivity
            .par_iter()
            .map(|&old| new_ids[old])
            .collect();
        tracing::debug!(num_output_points = point_map.len(), "compacted surface points");

        CompactSurface {
            points,
            connectivity,
            point_map,
        }
    }
}

/// External faces with their own compact point array.
#[derive(Debug, Clone, Default)]
pub struct CompactSurface {
    /// Coordinates of the referenced points only.
    pub points: Vec<Point3>,
    /// Face connectivity indexing into `points`.
    pub connectivity: Vec<PointId>,
    /// Original mesh point id of each entry of `points`.
    pub point_map: Vec<PointId>,
}

/// Builds the output face set for `len` resolved faces.
///
/// `resolve(i)` returns the (origin cell, local face) of output face `i`. It runs
/// once per output face, in parallel.
pub(crate) fn emit_faces<F>(
    mesh: &UnstructuredMesh,
    len: usize,
    resolve: F,
    reporter: &mut StageReporter<'_>,
) -> ExternalFaceSet
where
    F: Fn(usize) -> (CellId, usize) + Sync,
{
    let (origins, point_counts): (Vec<(CellId, usize)>, Vec<usize>) =
        reporter.time("seconds-points-per-face", || {
            (0..len)
                .into_par_iter()
                .map(|i| {
                    let (cell, face) = resolve(i);
                    (
                        (cell, face),
                        faces(mesh.cell_shape(cell))[face].len(),
                    )
                })
                .unzip()
        });

    let offsets = reporter.time("seconds-face-point-count", || {
        offsets_from_counts(&point_counts)
    });

    let (shapes, origin_cells, connectivity) = reporter.time("seconds-build-connectivity", || {
        let mut connectivity = vec![0; offsets.last().copied().unwrap_or(0)];
        let (shapes, origin_cells): (Vec<CellShape>, Vec<CellId>) =
            split_by_offsets(&mut connectivity, &offsets)
                .into_par_iter()
                .zip(origins.par_iter())
                .map(|(out, &(cell, face))| {
                    let shape = mesh.cell_shape(cell);
                    for (slot, point) in out
                        .iter_mut()
                        .zip(face_point_ids(shape, face, mesh.cell_points(cell)))
                    {
                        *slot = point;
                    }
                    (shape_of_face_points(out.len()), cell)
                })
                .unzip();
        (shapes, origin_cells, connectivity)
    });

    reporter.count("num-external-faces", shapes.len());

    ExternalFaceSet {
        shapes,
        offsets,
        connectivity,
        origin_cells,
        num_points: mesh.num_points(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::diagnostics::{DiagnosticLog, StageReporter};

    fn two_cell_mesh() -> UnstructuredMesh {
        let points = (0..9)
            .map(|i| Point3::new(f64::from(i), f64::from(i) * 2.0, 0.0))
            .collect();
        UnstructuredMesh::new(
            points,
            vec![CellShape::Tetra, CellShape::Wedge],
            vec![0, 4, 10],
            vec![0, 1, 2, 3, 3, 4, 5, 6, 7, 8],
        )
        .unwrap()
    }

    #[test]
    fn emits_shapes_and_connectivity() {
        let mesh = two_cell_mesh();
        let picks = [(0, 1), (1, 2), (1, 1)];
        let mut log = DiagnosticLog::new();
        let mut reporter = StageReporter::new("test", &mut log);
        let set = emit_faces(&mesh, picks.len(), |i| picks[i], &mut reporter);

        assert_eq!(set.len(), 3);
        assert_eq!(set.offsets(), &[0, 3, 7, 10]);
        assert_eq!(set.shapes(), &[CellShape::Triangle, CellShape::Quad, CellShape::Triangle]);
        assert_eq!(set.origin_cells(), &[0, 1, 1]);
        // Tetra face 1 = {1, 2, 3}; wedge face 2 = local {0, 3, 4, 1}; wedge face 1 = {3, 5, 4}.
        assert_eq!(set.face(0).points, &[1, 2, 3]);
        assert_eq!(set.face(1).points, &[3, 6, 7, 4]);
        assert_eq!(set.face(2).points, &[6, 8, 7]);
        assert_eq!(set.num_points(), 9);
        assert_eq!(log.count("num-external-faces"), Some(3));
    }

    #[test]
    fn empty_set_is_well_formed() {
        let set = ExternalFaceSet::empty(5);
        assert!(set.is_empty());
        assert_eq!(set.offsets(), &[0]);
        assert!(set.connectivity().is_empty());
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn canonical_ids_follow_faces() {
        let mesh = two_cell_mesh();
        let picks = [(1, 2)];
        let mut log = DiagnosticLog::new();
        let mut reporter = StageReporter::new("test", &mut log);
        let set = emit_faces(&mesh, 1, |i| picks[i], &mut reporter);
        assert_eq!(set.canonical_ids(), vec![CanonicalFaceId([3, 4, 6])]);
    }

    #[test]
    fn compaction_keeps_only_referenced_points() {
        let mesh = two_cell_mesh();
        let picks = [(1, 1)];
        let mut log = DiagnosticLog::new();
        let mut reporter = StageReporter::new("test", &mut log);
        let set = emit_faces(&mesh, 1, |i| picks[i], &mut reporter);

        let surface = set.compact_points(&mesh);
        assert_eq!(surface.point_map, vec![6, 7, 8]);
        assert_eq!(surface.connectivity, vec![0, 2, 1]);
        assert_eq!(surface.points.len(), 3);
        assert_relative_eq!(surface.points[1].x, 7.0);
        assert_relative_eq!(surface.points[2].y, 16.0);
    }
}
