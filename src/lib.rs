pub mod batch;
pub mod config;
pub mod debug;
pub mod error;
pub mod extraction;
pub mod io;
pub mod mask;
pub mod models;

pub use batch::{BatchContext, BatchRunner, BoundaryRecord, DebugConfig, MaskJob};
pub use config::{EdgeMode, ExtractorConfig};
pub use error::{ExtractError, ExtractResult};
pub use extraction::MaskToPolygon;
pub use mask::{Mask, MaskValue, argmax_classes};
pub use models::{Boundary, Diagnostics, Extraction, TargetSize};
