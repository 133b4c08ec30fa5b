pub mod analysis;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod hash;
pub mod mesh;
pub mod topology;

pub use analysis::{BucketHistogram, FaceHashDistribution};
pub use diagnostics::{DiagnosticLog, DiagnosticSink, DiagnosticValue, NullSink};
pub use error::{FacehashError, Result};
pub use extract::{
    Algorithm, ExternalFace, ExternalFaceSet, ExternalFacesParams, ExtractExternalFaces,
    HashCount, HashFight, HashSort,
};
pub use hash::FaceHashKind;
pub use mesh::{CellId, CellShape, MeshBuilder, Point3, PointId, UnstructuredMesh};
pub use topology::CanonicalFaceId;
