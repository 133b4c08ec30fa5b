mod shape;

pub use shape::CellShape;

use crate::error::MeshError;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// Global point identifier.
pub type PointId = usize;

/// Cell identifier (position of the cell in the mesh).
pub type CellId = usize;

/// An explicit unstructured mesh: point coordinates plus a flat cell array.
///
/// Cell `c` has shape `shapes[c]` and global point ids
/// `connectivity[offsets[c]..offsets[c + 1]]`. The mesh is validated on
/// construction and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct UnstructuredMesh {
    points: Vec<Point3>,
    shapes: Vec<CellShape>,
    offsets: Vec<usize>,
    connectivity: Vec<PointId>,
}

impl UnstructuredMesh {
    /// Creates a mesh from its flat arrays.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if the offsets do not describe `shapes.len()` cells
    /// over `connectivity`, if a cell has the wrong number of points for its shape,
    /// or if a cell references a point that does not exist.
    pub fn new(
        points: Vec<Point3>,
        shapes: Vec<CellShape>,
        offsets: Vec<usize>,
        connectivity: Vec<PointId>,
    ) -> Result<Self, MeshError> {
        if offsets.len() != shapes.len() + 1 {
            return Err(MeshError::OffsetsLength {
                expected: shapes.len() + 1,
                actual: offsets.len(),
            });
        }
        if offsets[0] != 0 {
            return Err(MeshError::OffsetsNotMonotonic { cell: 0 });
        }
        let last = offsets[offsets.len() - 1];
        if last != connectivity.len() {
            return Err(MeshError::OffsetsConnectivityMismatch {
                last,
                connectivity: connectivity.len(),
            });
        }

        for (cell, (&shape, window)) in shapes.iter().zip(offsets.windows(2)).enumerate() {
            if window[1] < window[0] {
                return Err(MeshError::OffsetsNotMonotonic { cell });
            }
            let actual = window[1] - window[0];
            let valid = match shape.num_points() {
                Some(expected) => actual == expected,
                None => actual >= shape.min_points(),
            };
            if !valid {
                return Err(MeshError::CellPointCount {
                    cell,
                    shape,
                    expected: shape.num_points().unwrap_or(shape.min_points()),
                    actual,
                });
            }
            if let Some(&point_id) = connectivity[window[0]..window[1]]
                .iter()
                .find(|&&id| id >= points.len())
            {
                return Err(MeshError::PointOutOfRange {
                    cell,
                    point_id,
                    num_points: points.len(),
                });
            }
        }

        Ok(Self {
            points,
            shapes,
            offsets,
            connectivity,
        })
    }

    /// Creates a mesh in which every cell has the same fixed-size shape.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if `connectivity` is not a whole number of cells
    /// or references a missing point.
    pub fn single_type(
        points: Vec<Point3>,
        shape: CellShape,
        connectivity: Vec<PointId>,
    ) -> Result<Self, MeshError> {
        let per_cell = shape.num_points().unwrap_or(shape.min_points());
        if per_cell == 0 || connectivity.len() % per_cell != 0 {
            return Err(MeshError::CellPointCount {
                cell: connectivity.len() / per_cell.max(1),
                shape,
                expected: per_cell,
                actual: connectivity.len() % per_cell.max(1),
            });
        }
        let num_cells = connectivity.len() / per_cell;
        let offsets = (0..=num_cells).map(|c| c * per_cell).collect();
        Self::new(points, vec![shape; num_cells], offsets, connectivity)
    }

    /// Number of cells.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.shapes.len()
    }

    /// Number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Point coordinates.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Shape of every cell.
    #[must_use]
    pub fn shapes(&self) -> &[CellShape] {
        &self.shapes
    }

    /// Shape of cell `cell`.
    #[must_use]
    pub fn cell_shape(&self, cell: CellId) -> CellShape {
        self.shapes[cell]
    }

    /// Global point ids of cell `cell`, in cell-local order.
    #[must_use]
    pub fn cell_points(&self, cell: CellId) -> &[PointId] {
        &self.connectivity[self.offsets[cell]..self.offsets[cell + 1]]
    }
}

/// Incremental construction of an [`UnstructuredMesh`].
#[derive(Debug, Default)]
pub struct MeshBuilder {
    points: Vec<Point3>,
    shapes: Vec<CellShape>,
    offsets: Vec<usize>,
    connectivity: Vec<PointId>,
}

impl MeshBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            ..Self::default()
        }
    }

    /// Appends a point and returns its id.
    pub fn add_point(&mut self, point: Point3) -> PointId {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Appends a cell and returns its id.
    pub fn add_cell(&mut self, shape: CellShape, point_ids: &[PointId]) -> CellId {
        self.shapes.push(shape);
        self.connectivity.extend_from_slice(point_ids);
        self.offsets.push(self.connectivity.len());
        self.shapes.len() - 1
    }

    /// Validates and returns the mesh.
    ///
    /// # Errors
    ///
    /// See [`UnstructuredMesh::new`].
    pub fn build(self) -> Result<UnstructuredMesh, MeshError> {
        let offsets = if self.offsets.is_empty() {
            vec![0]
        } else {
            self.offsets
        };
        UnstructuredMesh::new(self.points, self.shapes, offsets, self.connectivity)
    }
}
