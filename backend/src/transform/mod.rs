//! Transformation module.
//!
//! - Split: combined packs to one record per size
//! - Records: order rows to normalized records
//! - Pipeline: file in, records and JSON batches out

pub mod pipeline;
pub mod records;
pub mod split;

pub use pipeline::*;
pub use records::{transform, transform_detailed, transform_soft, TransformOutcome};
pub use split::{split_variants, COMBINED_PACK};
