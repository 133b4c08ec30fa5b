use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use rayon::prelude::*;

use crate::diagnostics::{DiagnosticSink, StageReporter};
use crate::error::{OperationError, Result};
use crate::hash::{bucket_of, FaceHashKind};
use crate::mesh::UnstructuredMesh;
use crate::topology::CanonicalFaceId;

use super::output::{emit_faces, ExternalFaceSet};
use super::packed::CellFaceId;
use super::scan::{canonical_of, faces_per_cell, hash_faces, offsets_from_counts, split_by_offsets};
use super::scatter::CountingScatter;

const ENGINE: &str = "hash-count";

/// Default largest bucket whose canonical ids are cached while counting.
pub const DEFAULT_CANONICAL_CACHE_SIZE: usize = 100;

/// Extracts external faces by counting faces into one bucket per mesh point.
///
/// Faces are scattered into buckets with atomic counters, each bucket is sorted
/// and partitioned so its external faces come first, and the output reads the
/// head of every bucket.
#[derive(Debug, Clone, Copy)]
pub struct HashCount {
    hash: FaceHashKind,
    canonical_cache_size: usize,
}

impl HashCount {
    /// Creates a new `HashCount` engine using `hash` to pick buckets.
    #[must_use]
    pub fn new(hash: FaceHashKind) -> Self {
        Self {
            hash,
            canonical_cache_size: DEFAULT_CANONICAL_CACHE_SIZE,
        }
    }

    /// Sets the largest bucket for which canonical ids are cached.
    #[must_use]
    pub fn with_canonical_cache_size(mut self, size: usize) -> Self {
        self.canonical_cache_size = size;
        self
    }

    #[must_use]
    pub fn hash(&self) -> FaceHashKind {
        self.hash
    }

    #[must_use]
    pub fn canonical_cache_size(&self) -> usize {
        self.canonical_cache_size
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the canonical cache size is zero.
    pub fn execute(
        &self,
        mesh: &UnstructuredMesh,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ExternalFaceSet> {
        if self.canonical_cache_size == 0 {
            return Err(OperationError::InvalidInput(
                "canonical cache size must be positive".into(),
            )
            .into());
        }

        let mut reporter = StageReporter::new(ENGINE, sink);
        tracing::debug!(
            engine = ENGINE,
            hash = %self.hash,
            cells = mesh.num_cells(),
            "extracting external faces"
        );

        let counts = reporter.time("seconds-num-faces-per-cell", || faces_per_cell(mesh));
        let cell_offsets = reporter.time("seconds-face-per-cell-count", || {
            offsets_from_counts(&counts)
        });
        let num_faces = cell_offsets.last().copied().unwrap_or(0);
        reporter.count("num-faces", num_faces);
        if num_faces == 0 {
            tracing::trace!(engine = ENGINE, "mesh has no faces");
            return Ok(ExternalFaceSet::empty(mesh.num_points()));
        }

        // One bucket per point; the min-point hash is already below the point count.
        let num_buckets = mesh.num_points().max(1);
        let (buckets, origins) = reporter.time("seconds-face-hash", || {
            let arrays = hash_faces(mesh, &cell_offsets, self.hash);
            let buckets: Vec<usize> = arrays
                .hashes
                .par_iter()
                .map(|&hash| bucket_of(hash, num_buckets))
                .collect();
            let origins: Vec<CellFaceId> = (0..arrays.len())
                .into_par_iter()
                .map(|i| {
                    let (cell, face) = arrays.origin(i);
                    CellFaceId::pack(cell, face)
                })
                .collect();
            (buckets, origins)
        });

        let counters: Vec<AtomicU32> = reporter.time("seconds-num-faces-per-hash", || {
            let counters: Vec<AtomicU32> = (0..num_buckets).map(|_| AtomicU32::new(0)).collect();
            buckets.par_iter().for_each(|&bucket| {
                counters[bucket].fetch_add(1, Ordering::Relaxed);
            });
            counters
        });

        let bucket_offsets = reporter.time("seconds-face-per-hash-count", || {
            let sizes: Vec<usize> = counters
                .par_iter()
                .map(|c| c.load(Ordering::Relaxed) as usize)
                .collect();
            offsets_from_counts(&sizes)
        });

        let mut faces_per_bucket = reporter.time("seconds-build-faces-per-hash", || {
            let slots: Vec<AtomicU64> = (0..num_faces).map(|_| AtomicU64::new(0)).collect();
            buckets
                .par_iter()
                .zip(origins.par_iter())
                .for_each(|(&bucket, &origin)| {
                    let remaining = counters[bucket].fetch_sub(1, Ordering::Relaxed) as usize;
                    slots[bucket_offsets[bucket] + remaining - 1]
                        .store(origin.raw(), Ordering::Relaxed);
                });
            let mut ids: Vec<CellFaceId> = slots
                .into_par_iter()
                .map(|slot| CellFaceId::from_raw(slot.into_inner()))
                .collect();
            // Slot order within a bucket depends on thread timing.
            split_by_offsets(&mut ids, &bucket_offsets)
                .into_par_iter()
                .for_each(|bucket| bucket.sort_unstable());
            ids
        });

        let external_counts: Vec<usize> = reporter.time("seconds-face-counts", || {
            let cache_size = self.canonical_cache_size;
            split_by_offsets(&mut faces_per_bucket, &bucket_offsets)
                .into_par_iter()
                .map_init(
                    || Vec::with_capacity(cache_size),
                    |cache, bucket| match bucket.len() {
                        0 | 1 => bucket.len(),
                        n if n <= cache_size => {
                            cache.clear();
                            cache.extend(bucket.iter().map(|id| {
                                let (cell, face) = id.unpack();
                                canonical_of(mesh, cell, face)
                            }));
                            partition_bucket(&mut CachedSlots {
                                ids: bucket,
                                canonical: cache,
                                hash: self.hash,
                            })
                        }
                        _ => partition_bucket(&mut RecomputedSlots {
                            ids: bucket,
                            mesh,
                            hash: self.hash,
                        }),
                    },
                )
                .collect()
        });

        let scatter = reporter.time("seconds-scatter-cull-internal-faces", || {
            CountingScatter::new(&external_counts)
        });

        let faces = emit_faces(
            mesh,
            scatter.output_len(),
            |output| {
                let (bucket, visit) = scatter.input_of(output);
                faces_per_bucket[bucket_offsets[bucket] + visit].unpack()
            },
            &mut reporter,
        );

        tracing::debug!(engine = ENGINE, external = faces.len(), "done");
        Ok(faces)
    }
}

/// The faces of one bucket, viewed as swappable slots with a face comparison.
trait FaceSlots {
    fn len(&self) -> usize;
    fn same(&self, a: usize, b: usize) -> bool;
    fn swap(&mut self, a: usize, b: usize);
}

/// Slots whose canonical ids were computed once up front.
struct CachedSlots<'a> {
    ids: &'a mut [CellFaceId],
    canonical: &'a mut Vec<CanonicalFaceId>,
    hash: FaceHashKind,
}

impl FaceSlots for CachedSlots<'_> {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn same(&self, a: usize, b: usize) -> bool {
        self.hash.same_face(&self.canonical[a], &self.canonical[b])
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.ids.swap(a, b);
        self.canonical.swap(a, b);
    }
}

/// Slots that recompute canonical ids on every comparison.
struct RecomputedSlots<'a> {
    ids: &'a mut [CellFaceId],
    mesh: &'a UnstructuredMesh,
    hash: FaceHashKind,
}

impl RecomputedSlots<'_> {
    fn canonical(&self, slot: usize) -> CanonicalFaceId {
        let (cell, face) = self.ids[slot].unpack();
        canonical_of(self.mesh, cell, face)
    }
}

impl FaceSlots for RecomputedSlots<'_> {
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn same(&self, a: usize, b: usize) -> bool {
        self.hash.same_face(&self.canonical(a), &self.canonical(b))
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.ids.swap(a, b);
    }
}

/// Reorders a bucket so its unmatched faces occupy the head and returns their count.
///
/// Works from the tail: the last unprocessed face either finds a partner, and the
/// pair is parked at the tail, or is swapped into the external head.
fn partition_bucket(slots: &mut impl FaceSlots) -> usize {
    let mut num_external = 0;
    let mut end = slots.len();
    while end > num_external {
        let last = end - 1;
        match (num_external..last).rev().find(|&other| slots.same(last, other)) {
            Some(partner) => {
                if partner != last - 1 {
                    slots.swap(partner, last - 1);
                }
                end -= 2;
            }
            None => {
                if last != num_external {
                    slots.swap(last, num_external);
                }
                num_external += 1;
            }
        }
    }
    num_external
}
