//! Pipeline orchestration for the precall briefing system.
//!
//! This crate ties intelligence gathering, context lookup, synthesis, and
//! lead persistence into the end-to-end [`BriefingPipeline`]. The boundary
//! layer (HTTP routing, demo tooling) consumes [`BriefingPipeline::generate`]
//! and maps the two hard error classes — request validation and invalid
//! intelligence — to client errors; everything else arrives as a shaped
//! response payload.

pub mod pipeline;

pub use pipeline::BriefingPipeline;
