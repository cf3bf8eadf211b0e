//! Core domain types for the dealscope enrichment pipeline.
//!
//! Records serialize with camelCase keys so that a cached
//! [`EnrichmentRecord`] is byte-compatible with what the research dashboard
//! stores and renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CompanyInput
// ---------------------------------------------------------------------------

/// A company record as provided by the caller, per enrichment request.
///
/// Only `name` is required; every other field enriches the prompt (and the
/// fallback templates) when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInput {
    /// Company name — the only mandatory field.
    pub name: String,
    /// Company website URL. Empty/absent skips scraping entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Short description of what the company does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Industry / sector label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Headquarters location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Founding year, as provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<String>,
    /// Headcount or headcount range, as provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<String>,
}

impl CompanyInput {
    /// A company with just a name; other fields default to `None`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The website URL, if present and non-blank.
    pub fn website_url(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

// ---------------------------------------------------------------------------
// ScrapeResult
// ---------------------------------------------------------------------------

/// Outcome of scraping a company's website candidate pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// True when at least one candidate page yielded viable text.
    pub success: bool,
    /// Aggregated plain-text excerpt (empty when `success` is false).
    pub content: String,
    /// URLs that contributed content, in fetch order.
    pub sources: Vec<String>,
    /// Why the scrape produced nothing, when it didn't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResult {
    /// A failed scrape with no content and no sources.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            sources: Vec::new(),
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// A named investment-relevant indicator with supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Indicator name, e.g. "Hiring actively".
    pub label: String,
    /// Whether the indicator was observed.
    pub detected: bool,
    /// Brief supporting evidence, or a verification hint in fallback mode.
    pub evidence: String,
}

/// Overall strength of the detected signal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
    #[default]
    Unknown,
}

impl SignalStrength {
    /// Parse a model-returned label, case-insensitively. Anything outside
    /// the known set maps to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "strong" => Self::Strong,
            "moderate" => Self::Moderate,
            "weak" => Self::Weak,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
            Self::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Letter grade assigned by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Parse a model-returned grade. Tolerates whitespace, case, and a
    /// trailing `+`/`-` modifier ("B+" parses as `B`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_end_matches(['+', '-']);
        match s.to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// EnrichmentRecord
// ---------------------------------------------------------------------------

/// Provenance of an enrichment record — the caller's primary signal of
/// data quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrichmentSource {
    /// Produced by the live scrape + LLM analysis path.
    #[serde(rename = "llm-pipeline")]
    LlmPipeline,
    /// Produced by the deterministic fallback generators.
    #[serde(rename = "fallback-data")]
    FallbackData,
}

impl std::fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LlmPipeline => "llm-pipeline",
            Self::FallbackData => "fallback-data",
        };
        write!(f, "{s}")
    }
}

/// The pipeline's sole output: a complete per-company analysis.
///
/// Every descriptive and signal field is always populated — from the LLM or
/// from a deterministic fallback. The scoring family
/// (`score`/`grade`/`recommendation`/`thesis`/`strengths`/`risks`/
/// `next_steps`) may be absent/empty only when `source` is
/// [`EnrichmentSource::LlmPipeline`] and the model omitted it; absence there
/// means "unscored", never "fallback".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    // Metadata
    pub enriched_at: DateTime<Utc>,
    pub source: EnrichmentSource,
    pub website_scraped: bool,
    pub sources: Vec<String>,

    // Descriptive fields
    pub summary: String,
    pub what_they_do: Vec<String>,
    pub business_model: String,
    pub target_customers: String,
    pub key_products: Vec<String>,
    pub tech_stack: Vec<String>,
    pub funding_stage: String,
    pub competitors: Vec<String>,
    pub market_position: String,

    // Signal fields
    pub signals: Vec<Signal>,
    pub signal_strength: SignalStrength,
    pub key_insight: String,

    // Scoring fields
    pub score: Option<u8>,
    pub grade: Option<Grade>,
    pub recommendation: Option<String>,
    pub thesis: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub next_steps: Vec<String>,
}
