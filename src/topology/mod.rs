//! Per-shape face topology and face canonicalization.

mod canonical;
mod face_table;

pub use canonical::{
    canonical_face_id, face_point_ids, max_face_point_id, min_face_point_id, CanonicalFaceId,
};
pub use face_table::{
    face_local_points, face_shape, faces, local_point_index, num_faces, num_points_in_face,
    MAX_NUM_FACES, MAX_POINTS_IN_FACE,
};

pub(crate) use face_table::shape_of_face_points;
