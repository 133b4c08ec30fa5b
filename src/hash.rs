//! Bucket hash functions used to group duplicate-candidate faces.
//!
//! A bucket hash only has to send both copies of an internal face to the same
//! bucket. Equality inside a bucket is always decided by [`CanonicalFaceId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OperationError;
use crate::mesh::{CellShape, PointId};
use crate::topology::{canonical_face_id, min_face_point_id, CanonicalFaceId};

/// Bucket hash value.
pub type FaceHash = u64;

/// Strategy used to map a face to a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceHashKind {
    /// 32-bit FNV-1a over the canonical face id.
    Fnv1a,
    /// The face's minimum global point id.
    MinPointId,
}

impl FaceHashKind {
    /// Both hash kinds, in reporting order.
    pub const ALL: [Self; 2] = [Self::Fnv1a, Self::MinPointId];

    /// Name used in diagnostics and configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fnv1a => "FNV1A",
            Self::MinPointId => "MinPointID",
        }
    }

    /// Whether faces sharing a bucket are known to share their minimum point id.
    ///
    /// When true, canonical id comparisons can skip component 0.
    #[must_use]
    pub fn buckets_share_min_point(self) -> bool {
        matches!(self, Self::MinPointId)
    }

    /// Hash of face `face` of a cell.
    #[must_use]
    pub fn hash_face(self, shape: CellShape, face: usize, cell_points: &[PointId]) -> FaceHash {
        match self {
            Self::Fnv1a => fnv1a_canonical(&canonical_face_id(shape, face, cell_points)),
            Self::MinPointId => min_face_point_id(shape, face, cell_points) as FaceHash,
        }
    }

    /// Equality test for two candidate faces whose hash values are equal.
    ///
    /// Only valid when the bucket is the exact hash value. Tables that reduce the
    /// hash modulo their size mix minimum points and must compare full ids.
    #[must_use]
    pub fn same_face(self, a: &CanonicalFaceId, b: &CanonicalFaceId) -> bool {
        if self.buckets_share_min_point() {
            a.matches_upper(b)
        } else {
            a == b
        }
    }
}

impl fmt::Display for FaceHashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FaceHashKind {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fnv1a" | "1" => Ok(Self::Fnv1a),
            "minpointid" | "2" => Ok(Self::MinPointId),
            _ => Err(OperationError::UnknownName {
                kind: "hash",
                name: s.to_owned(),
            }),
        }
    }
}

/// Reduces a hash to a slot of a table with `len` entries.
///
/// # Panics
///
/// Panics if `len` is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn bucket_of(hash: FaceHash, len: usize) -> usize {
    (hash % len as u64) as usize
}

/// 32-bit FNV-1a over a sequence of 32-bit words.
#[must_use]
pub fn fnv1a_32(words: impl IntoIterator<Item = u32>) -> u32 {
    const OFFSET_BASIS: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;

    words.into_iter().fold(OFFSET_BASIS, |hash, word| {
        (hash ^ word).wrapping_mul(PRIME)
    })
}

/// FNV-1a of a canonical id, hashing each point id as its low then high 32-bit word.
#[must_use]
pub fn fnv1a_canonical(id: &CanonicalFaceId) -> FaceHash {
    #[allow(clippy::cast_possible_truncation)]
    let words = id.0.iter().flat_map(|&point| {
        let wide = point as u64;
        [wide as u32, (wide >> 32) as u32]
    });
    FaceHash::from(fnv1a_32(words))
}
