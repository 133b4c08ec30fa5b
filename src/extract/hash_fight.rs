use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::diagnostics::{DiagnosticSink, StageReporter};
use crate::error::{OperationError, Result};
use crate::hash::{bucket_of, FaceHash, FaceHashKind};
use crate::mesh::UnstructuredMesh;

use super::output::{emit_faces, ExternalFaceSet};
use super::scan::{faces_per_cell, hash_faces, offsets_from_counts};
use super::scatter::CountingScatter;

const ENGINE: &str = "hash-fight";

/// Default number of table slots per active face.
pub const DEFAULT_TABLE_FACTOR: usize = 2;

/// A hash table where concurrent writers race for each slot.
///
/// Writes are relaxed stores and the last one wins. Readers only look after every
/// claim of the round has completed, so each sees one settled winner per slot.
/// Which writer wins is unspecified.
pub(crate) struct SlotClaimTable {
    slots: Vec<AtomicUsize>,
}

impl SlotClaimTable {
    const EMPTY: usize = usize::MAX;

    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicUsize::new(Self::EMPTY)).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot_of(&self, hash: FaceHash) -> usize {
        bucket_of(hash, self.len())
    }

    pub(crate) fn claim(&self, slot: usize, face: usize) {
        self.slots[slot].store(face, Ordering::Relaxed);
    }

    /// The face that won `slot`, if any face claimed it.
    pub(crate) fn winner(&self, slot: usize) -> Option<usize> {
        match self.slots[slot].load(Ordering::Relaxed) {
            Self::EMPTY => None,
            face => Some(face),
        }
    }
}

/// Extracts external faces with rounds of hash fights.
///
/// Every round, active faces race for slots of a fresh table; each face then
/// compares itself with its slot's winner. Matching pairs are internal, winners
/// retire, losers fight again next round.
#[derive(Debug, Clone, Copy)]
pub struct HashFight {
    hash: FaceHashKind,
    table_factor: usize,
}

impl HashFight {
    /// Creates a new `HashFight` engine using `hash` to pick slots.
    #[must_use]
    pub fn new(hash: FaceHashKind) -> Self {
        Self {
            hash,
            table_factor: DEFAULT_TABLE_FACTOR,
        }
    }

    /// Sets the number of table slots allocated per active face.
    #[must_use]
    pub fn with_table_factor(mut self, table_factor: usize) -> Self {
        self.table_factor = table_factor;
        self
    }

    #[must_use]
    pub fn hash(&self) -> FaceHashKind {
        self.hash
    }

    #[must_use]
    pub fn table_factor(&self) -> usize {
        self.table_factor
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the table factor is zero.
    pub fn execute(
        &self,
        mesh: &UnstructuredMesh,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ExternalFaceSet> {
        if self.table_factor == 0 {
            return Err(OperationError::InvalidInput(
                "hash fight table factor must be positive".into(),
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

        let is_external: Vec<AtomicBool> = (0..num_faces).map(|_| AtomicBool::new(true)).collect();
        let rounds = reporter.time("seconds-hash-fight-iterations", || {
            let mut active: Vec<usize> = (0..num_faces).collect();
            let mut rounds = 0;
            while !active.is_empty() {
                rounds += 1;
                let table = SlotClaimTable::new(self.table_factor * active.len());

                active
                    .par_iter()
                    .for_each(|&face| table.claim(table.slot_of(arrays.hashes[face]), face));

                active = active
                    .par_iter()
                    .copied()
                    .filter(|&face| {
                        let Some(winner) = table.winner(table.slot_of(arrays.hashes[face])) else {
                            return true;
                        };
                        if winner == face {
                            return false;
                        }
                        // A slot mixes minimum points, so compare all three ids.
                        let mine = arrays.canonical_id(mesh, face);
                        let theirs = arrays.canonical_id(mesh, winner);
                        if mine == theirs {
                            is_external[face].store(false, Ordering::Relaxed);
                            is_external[winner].store(false, Ordering::Relaxed);
                            false
                        } else {
                            true
                        }
                    })
                    .collect();
                tracing::trace!(
                    engine = ENGINE,
                    round = rounds,
                    remaining = active.len(),
                    "fight round"
                );
            }
            rounds
        });
        reporter.count("num-hash-fight-rounds", rounds);

        let scatter = reporter.time("seconds-face-output-count", || {
            let keep: Vec<usize> = is_external
                .par_iter()
                .map(|flag| usize::from(flag.load(Ordering::Relaxed)))
                .collect();
            CountingScatter::new(&keep)
        });

        let faces = emit_faces(
            mesh,
            scatter.output_len(),
            |output| arrays.origin(scatter.input_of(output).0),
            &mut reporter,
        );

        tracing::debug!(engine = ENGINE, external = faces.len(), rounds, "done");
        Ok(faces)
    }
}
