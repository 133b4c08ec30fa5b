use crate::mesh::CellId;
use crate::topology::MAX_NUM_FACES;

const FACE_BITS: u32 = 3;
const FACE_MASK: u64 = (1 << FACE_BITS) - 1;

const _: () = assert!(MAX_NUM_FACES <= 1 << FACE_BITS, "widen FACE_BITS");

/// An origin cell and a local face index packed into one integer.
///
/// The cell occupies the high bits and the face the low three bits, so
/// ordering by the packed value orders by cell, then face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CellFaceId(u64);

impl CellFaceId {
    /// Packs `cell` and `face`.
    ///
    /// `face` must be below [`MAX_NUM_FACES`] and `cell` must fit in the remaining bits.
    #[must_use]
    pub fn pack(cell: CellId, face: usize) -> Self {
        debug_assert!(face < MAX_NUM_FACES);
        debug_assert!((cell as u64) < (1 << (u64::BITS - FACE_BITS)));
        Self(((cell as u64) << FACE_BITS) | (face as u64 & FACE_MASK))
    }

    /// The origin cell.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(self) -> CellId {
        (self.0 >> FACE_BITS) as CellId
    }

    /// The local face index.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn face(self) -> usize {
        (self.0 & FACE_MASK) as usize
    }

    /// Both halves.
    #[must_use]
    pub fn unpack(self) -> (CellId, usize) {
        (self.cell(), self.face())
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_inverts_pack() {
        for cell in [0, 1, 7, 8, 1_000_003, (1 << 40) + 5] {
            for face in 0..MAX_NUM_FACES {
                let id = CellFaceId::pack(cell, face);
                assert_eq!(id.unpack(), (cell, face));
                assert_eq!(CellFaceId::from_raw(id.raw()), id);
            }
        }
    }

    #[test]
    fn orders_by_cell_then_face() {
        assert!(CellFaceId::pack(1, 5) < CellFaceId::pack(2, 0));
        assert!(CellFaceId::pack(2, 0) < CellFaceId::pack(2, 1));
    }
}
