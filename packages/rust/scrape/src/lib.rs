//! Website scraping for the dealscope enrichment pipeline.
//!
//! This crate provides:
//! - [`fetcher`] — tolerant candidate-page fetching ([`SiteFetcher`])
//! - [`extract`] — HTML-to-text extraction with viability thresholds
//!
//! Scraping is best-effort by design: page failures are absorbed, and the
//! retry budget belongs to the LLM call, not to fetching.

pub mod extract;
pub mod fetcher;

pub use extract::{MIN_VIABLE_CHARS, PAGE_EXCERPT_CHARS, clean_html, extract_text};
pub use fetcher::{AGGREGATE_EXCERPT_CHARS, SiteFetcher, candidate_urls};
