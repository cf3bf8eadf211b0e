//! Core enrichment logic for dealscope.
//!
//! This crate ties scraping and LLM analysis together into the end-to-end
//! enrichment pipeline, and owns the normalization and fallback rules that
//! make every enrichment return a complete record.

pub mod fallback;
pub mod normalize;
pub mod pipeline;

pub use normalize::{LlmAnalysis, LlmOutcome, normalize};
pub use pipeline::{Enricher, ProgressReporter, SilentProgress};
