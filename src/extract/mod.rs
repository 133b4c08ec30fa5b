//! External face extraction engines.
//!
//! Three interchangeable engines compute the same set of external faces (faces
//! used by exactly one cell) with different parallel strategies. Pick one
//! directly or go through [`ExtractExternalFaces`] with [`ExternalFacesParams`].

mod hash_count;
mod hash_fight;
mod hash_sort;
mod output;
mod packed;
mod scan;
mod scatter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticSink;
use crate::error::{OperationError, Result};
use crate::hash::FaceHashKind;
use crate::mesh::UnstructuredMesh;

pub use hash_count::{HashCount, DEFAULT_CANONICAL_CACHE_SIZE};
pub use hash_fight::{HashFight, DEFAULT_TABLE_FACTOR};
pub use hash_sort::HashSort;
pub use output::{CompactSurface, ExternalFace, ExternalFaceSet};
pub use packed::CellFaceId;

/// Extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Sort faces by hash, then scan runs of equal hashes.
    HashSort,
    /// Rounds of slot races in a shrinking table.
    HashFight,
    /// Atomic bucket counting with one bucket per point.
    HashCount,
}

impl Algorithm {
    /// Every engine, in reporting order.
    pub const ALL: [Self; 3] = [Self::HashSort, Self::HashFight, Self::HashCount];

    /// Name used in diagnostics and configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HashSort => "DP-Hash-Sort",
            Self::HashFight => "DP-Hash-Fight",
            Self::HashCount => "DP-Hash-Count",
        }
    }

    /// The bucket hash the engine was designed around.
    #[must_use]
    pub fn default_hash(self) -> FaceHashKind {
        match self {
            Self::HashSort => FaceHashKind::Fnv1a,
            Self::HashFight | Self::HashCount => FaceHashKind::MinPointId,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = OperationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace(['-', '_'], "");
        match key.strip_prefix("dp").unwrap_or(key.as_str()) {
            "hashsort" => Ok(Self::HashSort),
            "hashfight" => Ok(Self::HashFight),
            "hashcount" => Ok(Self::HashCount),
            _ => Err(OperationError::UnknownName {
                kind: "algorithm",
                name: s.to_owned(),
            }),
        }
    }
}

/// Parameters for [`ExtractExternalFaces`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalFacesParams {
    /// Engine to run.
    pub algorithm: Algorithm,
    /// Bucket hash handed to the engine.
    pub hash: FaceHashKind,
    /// Table slots per active face, `HashFight` only.
    pub hash_fight_table_factor: usize,
    /// Largest bucket whose canonical ids are cached, `HashCount` only.
    pub canonical_cache_size: usize,
}

impl Default for ExternalFacesParams {
    fn default() -> Self {
        Self::new(Algorithm::HashCount)
    }
}

impl ExternalFacesParams {
    /// Parameters for `algorithm` with its default hash and tuning.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            hash: algorithm.default_hash(),
            hash_fight_table_factor: DEFAULT_TABLE_FACTOR,
            canonical_cache_size: DEFAULT_CANONICAL_CACHE_SIZE,
        }
    }

    #[must_use]
    pub fn with_hash(mut self, hash: FaceHashKind) -> Self {
        self.hash = hash;
        self
    }

    #[must_use]
    pub fn with_hash_fight_table_factor(mut self, factor: usize) -> Self {
        self.hash_fight_table_factor = factor;
        self
    }

    #[must_use]
    pub fn with_canonical_cache_size(mut self, size: usize) -> Self {
        self.canonical_cache_size = size;
        self
    }

    /// Checks the tuning values.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the table factor or the cache
    /// size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.hash_fight_table_factor == 0 {
            return Err(OperationError::InvalidInput(
                "hash_fight_table_factor must be positive".into(),
            )
            .into());
        }
        if self.canonical_cache_size == 0 {
            return Err(OperationError::InvalidInput(
                "canonical_cache_size must be positive".into(),
            )
            .into());
        }
        Ok(())
    }
}

/// Extracts the external faces of a mesh with a configurable engine.
pub struct ExtractExternalFaces {
    params: ExternalFacesParams,
}

impl ExtractExternalFaces {
    /// Creates a new `ExtractExternalFaces` operation.
    #[must_use]
    pub fn new(params: ExternalFacesParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &ExternalFacesParams {
        &self.params
    }

    /// Executes the extraction, recording stage timings and counts into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the parameters fail
    /// [`ExternalFacesParams::validate`]. No work is done in that case.
    pub fn execute(
        &self,
        mesh: &UnstructuredMesh,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ExternalFaceSet> {
        self.params.validate()?;
        let ExternalFacesParams {
            algorithm,
            hash,
            hash_fight_table_factor,
            canonical_cache_size,
        } = self.params;
        tracing::debug!(%algorithm, %hash, "running external face extraction");

        match algorithm {
            Algorithm::HashSort => HashSort::new(hash).execute(mesh, sink),
            Algorithm::HashFight => HashFight::new(hash)
                .with_table_factor(hash_fight_table_factor)
                .execute(mesh, sink),
            Algorithm::HashCount => HashCount::new(hash)
                .with_canonical_cache_size(canonical_cache_size)
                .execute(mesh, sink),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use crate::error::FacehashError;
    use crate::mesh::{CellShape, MeshBuilder, Point3};

    #[test]
    fn algorithm_names_parse() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!("hash-fight".parse::<Algorithm>().unwrap(), Algorithm::HashFight);
        assert_eq!("DP_HASH_COUNT".parse::<Algorithm>().unwrap(), Algorithm::HashCount);
        let err = "vtk".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, OperationError::UnknownName { kind: "algorithm", .. }));
    }

    #[test]
    fn defaults_follow_the_engine() {
        let params = ExternalFacesParams::default();
        assert_eq!(params.algorithm, Algorithm::HashCount);
        assert_eq!(params.hash, FaceHashKind::MinPointId);
        assert_eq!(params.hash_fight_table_factor, 2);
        assert_eq!(params.canonical_cache_size, 100);
        assert_eq!(
            ExternalFacesParams::new(Algorithm::HashSort).hash,
            FaceHashKind::Fnv1a
        );
    }

    #[test]
    fn invalid_tuning_is_rejected_before_work() {
        let mesh = MeshBuilder::new().build().unwrap();
        for params in [
            ExternalFacesParams::new(Algorithm::HashFight).with_hash_fight_table_factor(0),
            ExternalFacesParams::new(Algorithm::HashSort).with_canonical_cache_size(0),
        ] {
            let err = ExtractExternalFaces::new(params)
                .execute(&mesh, &mut NullSink)
                .unwrap_err();
            assert!(matches!(
                err,
                FacehashError::Operation(OperationError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn dispatches_every_engine() {
        let mut builder = MeshBuilder::new();
        for i in 0..4 {
            builder.add_point(Point3::new(f64::from(i), 0.0, 0.0));
        }
        builder.add_cell(CellShape::Tetra, &[0, 1, 2, 3]);
        let mesh = builder.build().unwrap();

        for algorithm in Algorithm::ALL {
            for hash in FaceHashKind::ALL {
                let params = ExternalFacesParams::new(algorithm).with_hash(hash);
                let faces = ExtractExternalFaces::new(params)
                    .execute(&mesh, &mut NullSink)
                    .unwrap();
                assert_eq!(faces.len(), 4, "{algorithm} / {hash}");
            }
        }
    }
}
