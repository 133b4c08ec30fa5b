use rayon::prelude::*;

use crate::diagnostics::{DiagnosticSink, StageReporter};
use crate::error::Result;
use crate::hash::FaceHashKind;
use crate::mesh::UnstructuredMesh;
use crate::topology::CanonicalFaceId;

use super::output::{emit_faces, ExternalFaceSet};
use super::scan::{faces_per_cell, hash_faces, offsets_from_counts, FaceArrays};
use super::scatter::CountingScatter;

const ENGINE: &str = "hash-sort";

/// Extracts external faces by sorting faces on their bucket hash and scanning
/// each run of equal hashes for unmatched faces.
///
/// Output order follows the sorted hash order, then the order faces were
/// generated within a run, so it is deterministic for a given mesh.
#[derive(Debug, Clone, Copy)]
pub struct HashSort {
    hash: FaceHashKind,
}

impl HashSort {
    /// Creates a new `HashSort` engine using `hash` to group faces.
    #[must_use]
    pub fn new(hash: FaceHashKind) -> Self {
        Self { hash }
    }

    /// The bucket hash in use.
    #[must_use]
    pub fn hash(&self) -> FaceHashKind {
        self.hash
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Currently infallible for a validated mesh; the `Result` is kept for
    /// parity with the other engines.
    pub fn execute(
        &self,
        mesh: &UnstructuredMesh,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ExternalFaceSet> {
        let mut reporter = StageReporter::new(ENGINE, sink);
        tracing::debug!(
            engine = ENGINE,
            hash = %self.hash,
            cells = mesh.num_cells(),
            "extracting external faces"
        );

        let counts = reporter.time("seconds-num-faces-per-cell", || faces_per_cell(mesh));
        let cell_offsets = reporter.time("seconds-face-input-count", || {
            offsets_from_counts(&counts)
        });
        let num_faces = cell_offsets.last().copied().unwrap_or(0);
        reporter.count("num-faces", num_faces);
        if num_faces == 0 {
            tracing::trace!(engine = ENGINE, "mesh has no faces");
            return Ok(ExternalFaceSet::empty(mesh.num_points()));
        }

        let arrays = reporter.time("seconds-face-hash", || {
            hash_faces(mesh, &cell_offsets, self.hash)
        });

        let (order, group_offsets) =
            reporter.time("seconds-keys-build-arrays", || group_by_hash(&arrays));

        let group_counts: Vec<usize> = reporter.time("seconds-face-count", || {
            group_offsets
                .par_windows(2)
                .map(|w| {
                    let group = Group::new(mesh, &arrays, &order[w[0]..w[1]], self.hash);
                    group.count_external()
                })
                .collect()
        });

        let scatter =
            reporter.time("seconds-face-output-count", || CountingScatter::new(&group_counts));

        let faces = emit_faces(
            mesh,
            scatter.output_len(),
            |output| {
                let (g, visit) = scatter.input_of(output);
                let members = &order[group_offsets[g]..group_offsets[g + 1]];
                let group = Group::new(mesh, &arrays, members, self.hash);
                // Only reached for a non-conforming group; any member will do.
                let face = group
                    .find_unique_face(visit)
                    .unwrap_or(members[members.len() - 1]);
                arrays.origin(face)
            },
            &mut reporter,
        );

        tracing::debug!(engine = ENGINE, external = faces.len(), "done");
        Ok(faces)
    }
}

/// Stable sort of face indices by hash, plus the boundaries of each run of equal
/// hashes (one entry per run plus the total).
fn group_by_hash(arrays: &FaceArrays) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..arrays.len()).collect();
    order.par_sort_by_key(|&face| arrays.hashes[face]);

    let mut group_offsets: Vec<usize> = (1..order.len())
        .into_par_iter()
        .filter(|&i| arrays.hashes[order[i]] != arrays.hashes[order[i - 1]])
        .collect();
    group_offsets.insert(0, 0);
    group_offsets.push(order.len());
    (order, group_offsets)
}

/// Faces sharing one hash value, in scan order.
struct Group<'a> {
    mesh: &'a UnstructuredMesh,
    arrays: &'a FaceArrays,
    members: &'a [usize],
    hash: FaceHashKind,
}

impl<'a> Group<'a> {
    fn new(
        mesh: &'a UnstructuredMesh,
        arrays: &'a FaceArrays,
        members: &'a [usize],
        hash: FaceHashKind,
    ) -> Self {
        Self {
            mesh,
            arrays,
            members,
            hash,
        }
    }

    fn canonical(&self, i: usize) -> CanonicalFaceId {
        self.arrays.canonical_id(self.mesh, self.members[i])
    }

    fn same(&self, a: &CanonicalFaceId, b: &CanonicalFaceId) -> bool {
        self.hash.same_face(a, b)
    }

    /// Members minus two for every matched pair.
    fn count_external(&self) -> usize {
        let k = self.members.len();
        if k < 2 {
            return k;
        }
        let ids: Vec<_> = (0..k).map(|i| self.canonical(i)).collect();
        let mut count = k;
        for i in 0..k {
            if ids[i + 1..].iter().any(|other| self.same(&ids[i], other)) {
                count = count.saturating_sub(2);
            }
        }
        count
    }

    /// The `visit`-th member without a partner in the group.
    fn find_unique_face(&self, visit: usize) -> Option<usize> {
        let ids: Vec<_> = (0..self.members.len()).map(|i| self.canonical(i)).collect();
        (0..ids.len())
            .filter(|&i| {
                !ids
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && self.same(&ids[i], other))
            })
            .nth(visit)
            .map(|i| self.members[i])
    }
}
