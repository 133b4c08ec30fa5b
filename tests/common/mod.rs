//! Mesh generators and a sequential reference extractor shared by the
//! integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::cast_precision_loss)]

use std::collections::HashMap;

use facehash::topology::{face_point_ids, faces, num_faces};
use facehash::{CellShape, ExternalFaceSet, MeshBuilder, Point3, PointId, UnstructuredMesh};

/// Point index on a structured lattice of `(nx + 1) x (ny + 1) x (nz + 1)` points.
struct Lattice {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl Lattice {
    fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    fn id(&self, i: usize, j: usize, k: usize) -> PointId {
        i + (self.nx + 1) * (j + (self.ny + 1) * k)
    }

    fn add_points(&self, builder: &mut MeshBuilder) {
        for k in 0..=self.nz {
            for j in 0..=self.ny {
                for i in 0..=self.nx {
                    builder.add_point(Point3::new(i as f64, j as f64, k as f64));
                }
            }
        }
    }

    fn cubes(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.nz).flat_map(move |k| {
            (0..self.ny).flat_map(move |j| (0..self.nx).map(move |i| (i, j, k)))
        })
    }

    /// Corners of cube `(i, j, k)` in hexahedron order.
    fn hex(&self, i: usize, j: usize, k: usize) -> [PointId; 8] {
        [
            self.id(i, j, k),
            self.id(i + 1, j, k),
            self.id(i + 1, j + 1, k),
            self.id(i, j + 1, k),
            self.id(i, j, k + 1),
            self.id(i + 1, j, k + 1),
            self.id(i + 1, j + 1, k + 1),
            self.id(i, j + 1, k + 1),
        ]
    }

    /// Corner of cube `(i, j, k)` selected by the x, y, z bits of `corner`.
    fn corner(&self, i: usize, j: usize, k: usize, corner: usize) -> PointId {
        self.id(i + (corner & 1), j + ((corner >> 1) & 1), k + ((corner >> 2) & 1))
    }
}

/// Faces on the boundary of an `nx x ny x nz` block of unit cubes.
pub fn cube_faces(nx: usize, ny: usize, nz: usize) -> usize {
    2 * (nx * ny + ny * nz + nx * nz)
}

pub fn hex_grid(nx: usize, ny: usize, nz: usize) -> UnstructuredMesh {
    let lattice = Lattice::new(nx, ny, nz);
    let mut builder = MeshBuilder::new();
    lattice.add_points(&mut builder);
    for (i, j, k) in lattice.cubes() {
        builder.add_cell(CellShape::Hexahedron, &lattice.hex(i, j, k));
    }
    builder.build().unwrap()
}

/// Every cube split into six tetrahedra around its main diagonal.
///
/// Boundary: two triangles per boundary square.
pub fn kuhn_tet_grid(nx: usize, ny: usize, nz: usize) -> UnstructuredMesh {
    const AXIS_ORDERS: [[usize; 3]; 6] = [
        [1, 2, 4],
        [1, 4, 2],
        [2, 1, 4],
        [2, 4, 1],
        [4, 1, 2],
        [4, 2, 1],
    ];
    let lattice = Lattice::new(nx, ny, nz);
    let mut builder = MeshBuilder::new();
    lattice.add_points(&mut builder);
    for (i, j, k) in lattice.cubes() {
        for [a, b, _] in AXIS_ORDERS {
            builder.add_cell(
                CellShape::Tetra,
                &[
                    lattice.corner(i, j, k, 0),
                    lattice.corner(i, j, k, a),
                    lattice.corner(i, j, k, a | b),
                    lattice.corner(i, j, k, 7),
                ],
            );
        }
    }
    builder.build().unwrap()
}

/// Every cube split into two wedges across the diagonal of its xy square.
///
/// Boundary: two triangles per square on the z sides, one quad per square elsewhere.
pub fn wedge_grid(nx: usize, ny: usize, nz: usize) -> UnstructuredMesh {
    let lattice = Lattice::new(nx, ny, nz);
    let mut builder = MeshBuilder::new();
    lattice.add_points(&mut builder);
    for (i, j, k) in lattice.cubes() {
        for [a, b, c] in [[0, 1, 3], [0, 3, 2]] {
            builder.add_cell(
                CellShape::Wedge,
                &[
                    lattice.corner(i, j, k, a),
                    lattice.corner(i, j, k, b),
                    lattice.corner(i, j, k, c),
                    lattice.corner(i, j, k, a | 4),
                    lattice.corner(i, j, k, b | 4),
                    lattice.corner(i, j, k, c | 4),
                ],
            );
        }
    }
    builder.build().unwrap()
}

pub fn wedge_grid_faces(nx: usize, ny: usize, nz: usize) -> usize {
    4 * nx * ny + 2 * (ny * nz + nx * nz)
}

/// Every cube split into six pyramids, one per cube face, meeting at an added
/// center point.
pub fn pyramid_grid(nx: usize, ny: usize, nz: usize) -> UnstructuredMesh {
    let lattice = Lattice::new(nx, ny, nz);
    let mut builder = MeshBuilder::new();
    lattice.add_points(&mut builder);
    for (i, j, k) in lattice.cubes() {
        add_pyramids(&mut builder, &lattice.hex(i, j, k), i, j, k);
    }
    builder.build().unwrap()
}

fn add_pyramids(builder: &mut MeshBuilder, hex: &[PointId; 8], i: usize, j: usize, k: usize) {
    let apex = builder.add_point(Point3::new(
        i as f64 + 0.5,
        j as f64 + 0.5,
        k as f64 + 0.5,
    ));
    for base in faces(CellShape::Hexahedron) {
        let mut cell: Vec<PointId> = base.iter().map(|&local| hex[local]).collect();
        cell.push(apex);
        builder.add_cell(CellShape::Pyramid, &cell);
    }
}

/// Hexahedra and pyramid-split cubes in a checkerboard, plus a few surface cells
/// that have no faces.
///
/// The solid part has the same boundary as [`hex_grid`].
pub fn mixed_grid(nx: usize, ny: usize, nz: usize) -> UnstructuredMesh {
    let lattice = Lattice::new(nx, ny, nz);
    let mut builder = MeshBuilder::new();
    lattice.add_points(&mut builder);
    for (i, j, k) in lattice.cubes() {
        let hex = lattice.hex(i, j, k);
        if (i + j + k) % 2 == 0 {
            builder.add_cell(CellShape::Hexahedron, &hex);
        } else {
            add_pyramids(&mut builder, &hex, i, j, k);
        }
    }
    builder.add_cell(CellShape::Triangle, &[0, 1, lattice.id(0, 1, 0)]);
    builder.add_cell(CellShape::Quad, &[0, 1, lattice.id(1, 1, 0), lattice.id(0, 1, 0)]);
    builder.add_cell(CellShape::Line, &[0, 1]);
    builder.add_cell(CellShape::Vertex, &[0]);
    builder.build().unwrap()
}

/// Tetrahedra with arbitrary connectivity over `num_points` points on a line.
pub fn scattered_tets(num_points: usize, cells: &[[PointId; 4]]) -> UnstructuredMesh {
    let mut builder = MeshBuilder::new();
    for i in 0..num_points {
        builder.add_point(Point3::new(i as f64, 0.0, 0.0));
    }
    for cell in cells {
        builder.add_cell(CellShape::Tetra, cell);
    }
    builder.build().unwrap()
}

/// Total number of faces of all cells.
pub fn total_faces(mesh: &UnstructuredMesh) -> usize {
    mesh.shapes().iter().map(|&shape| num_faces(shape)).sum()
}

/// A face reduced to its sorted point ids.
pub type FaceKey = Vec<PointId>;

fn face_key(points: impl Iterator<Item = PointId>) -> FaceKey {
    let mut key: Vec<_> = points.collect();
    key.sort_unstable();
    key
}

/// Sequential external face extraction by counting sorted point lists.
///
/// Returns `(external faces, number of internal pairs)`, faces sorted.
pub fn reference_external_faces(mesh: &UnstructuredMesh) -> (Vec<FaceKey>, usize) {
    let mut seen: HashMap<FaceKey, usize> = HashMap::new();
    for cell in 0..mesh.num_cells() {
        let shape = mesh.cell_shape(cell);
        for face in 0..num_faces(shape) {
            let key = face_key(face_point_ids(shape, face, mesh.cell_points(cell)));
            *seen.entry(key).or_insert(0) += 1;
        }
    }
    let pairs = seen.values().filter(|&&n| n == 2).count();
    let mut external: Vec<_> = seen
        .into_iter()
        .filter(|&(_, n)| n == 1)
        .map(|(key, _)| key)
        .collect();
    external.sort();
    (external, pairs)
}

/// Faces of an extraction result as sorted keys, sorted.
pub fn face_keys(set: &ExternalFaceSet) -> Vec<FaceKey> {
    let mut keys: Vec<_> = set.iter().map(|f| face_key(f.points.iter().copied())).collect();
    keys.sort();
    keys
}

/// Renames every point id through `permutation` (new id = `permutation[old]`).
pub fn relabel(mesh: &UnstructuredMesh, permutation: &[PointId]) -> UnstructuredMesh {
    let mut points = vec![Point3::origin(); mesh.num_points()];
    for (old, point) in mesh.points().iter().enumerate() {
        points[permutation[old]] = *point;
    }
    let mut builder = MeshBuilder::new();
    for point in points {
        builder.add_point(point);
    }
    for cell in 0..mesh.num_cells() {
        let renamed: Vec<_> = mesh
            .cell_points(cell)
            .iter()
            .map(|&p| permutation[p])
            .collect();
        builder.add_cell(mesh.cell_shape(cell), &renamed);
    }
    builder.build().unwrap()
}

/// Keeps only the cells whose entry in `keep` is true (cycled if shorter).
pub fn cell_subset(mesh: &UnstructuredMesh, keep: &[bool]) -> UnstructuredMesh {
    let mut builder = MeshBuilder::new();
    for point in mesh.points() {
        builder.add_point(*point);
    }
    for cell in 0..mesh.num_cells() {
        if keep.is_empty() || keep[cell % keep.len()] {
            builder.add_cell(mesh.cell_shape(cell), mesh.cell_points(cell));
        }
    }
    builder.build().unwrap()
}

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
