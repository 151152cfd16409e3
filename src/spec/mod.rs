//! # Spec Module
//!
//! Typed, immutable view of a parsed API description. The generator reads
//! everything it needs from [`ApiDescription`]; nothing in the pipeline
//! mutates it.
//!
//! Security schemes reuse the `oas3` model so backends can match on the
//! same variants the rest of the BRRTRouter tooling understands.

pub use oas3::spec::SecurityScheme;
mod load;
mod types;

pub use load::*;
pub use types::*;
