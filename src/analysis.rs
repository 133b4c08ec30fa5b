//! Bucket occupancy statistics for the face hashes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::Result;
use crate::hash::{bucket_of, FaceHashKind};
use crate::mesh::UnstructuredMesh;
use crate::topology::num_faces;

/// Histogram of bucket sizes: bucket size to number of buckets of that size.
pub type BucketHistogram = BTreeMap<usize, usize>;

/// Measures how evenly a hash spreads faces over one bucket per mesh point.
///
/// Every face of every cell is counted, so internal faces land twice in their
/// bucket. Empty buckets are reported under size 0.
pub struct FaceHashDistribution {
    hash: FaceHashKind,
}

impl FaceHashDistribution {
    /// Creates a new `FaceHashDistribution` operation.
    #[must_use]
    pub fn new(hash: FaceHashKind) -> Self {
        Self { hash }
    }

    /// Computes the histogram.
    ///
    /// # Errors
    ///
    /// Currently infallible for a validated mesh.
    pub fn execute(&self, mesh: &UnstructuredMesh) -> Result<BucketHistogram> {
        let num_buckets = mesh.num_points();
        if num_buckets == 0 {
            return Ok(BucketHistogram::new());
        }

        let counters: Vec<AtomicUsize> = (0..num_buckets).map(|_| AtomicUsize::new(0)).collect();
        (0..mesh.num_cells()).into_par_iter().for_each(|cell| {
            let shape = mesh.cell_shape(cell);
            let points = mesh.cell_points(cell);
            for face in 0..num_faces(shape) {
                let bucket = bucket_of(self.hash.hash_face(shape, face, points), num_buckets);
                counters[bucket].fetch_add(1, Ordering::Relaxed);
            }
        });

        let mut histogram = BucketHistogram::new();
        for counter in counters {
            *histogram.entry(counter.into_inner()).or_insert(0) += 1;
        }
        tracing::debug!(hash = %self.hash, sizes = histogram.len(), "face hash distribution");
        Ok(histogram)
    }
}
