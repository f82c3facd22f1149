mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from maskpoly for tests
pub use maskpoly::{
    BatchRunner, Boundary, BoundaryRecord, ExtractError, ExtractorConfig, Mask, MaskJob,
    MaskToPolygon, TargetSize,
};
