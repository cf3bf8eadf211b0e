//! Merging LLM output with fallback data into a complete record.
//!
//! The merge is an explicit per-field reducer: each field takes the model's
//! value when present, otherwise its deterministic fallback. The scoring
//! family is the exception — on the LLM path an omitted score stays
//! absent ("unscored") rather than borrowing the fallback constants, which
//! would dress manufactured numbers up as model output.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use dealscope_shared::{
    CompanyInput, EnrichmentRecord, EnrichmentSource, Grade, ScrapeResult, Signal, SignalStrength,
};

use crate::fallback;

// ---------------------------------------------------------------------------
// LlmAnalysis
// ---------------------------------------------------------------------------

/// The model's analysis, one `Option` per schema field.
///
/// Every field deserializes leniently: a missing key, a null, or a
/// wrong-typed value all land as `None` and flow to that field's fallback.
/// A single malformed field must not discard an otherwise usable analysis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmAnalysis {
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub what_they_do: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub business_model: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub target_customers: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub key_products: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub funding_stage: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub competitors: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub market_position: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub signals: Option<Vec<Signal>>,
    #[serde(deserialize_with = "lenient")]
    pub signal_strength: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub key_insight: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub grade: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub recommendation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub thesis: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub strengths: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub risks: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub next_steps: Option<Vec<String>>,
}

impl LlmAnalysis {
    /// Parse from the JSON object the client extracted. Unrecognized and
    /// malformed fields degrade to `None` rather than failing the parse.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Deserialize any value, mapping type mismatches to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ---------------------------------------------------------------------------
// Outcome + normalize
// ---------------------------------------------------------------------------

/// What the analysis phase produced for one company.
#[derive(Debug, Clone)]
pub enum LlmOutcome {
    /// The model returned a parseable analysis.
    Analyzed(LlmAnalysis),
    /// No credential, or the retry budget was exhausted.
    Unavailable,
}

/// Merge company input, scrape outcome, and analysis outcome into the one
/// complete record the pipeline returns.
pub fn normalize(
    company: &CompanyInput,
    scrape: &ScrapeResult,
    outcome: LlmOutcome,
) -> EnrichmentRecord {
    match outcome {
        LlmOutcome::Analyzed(analysis) => from_analysis(company, scrape, analysis),
        LlmOutcome::Unavailable => full_fallback(company, scrape),
    }
}

/// LLM path: prefer model values, per-field fallback for descriptive and
/// signal gaps, scoring family left unscored when omitted.
fn from_analysis(
    company: &CompanyInput,
    scrape: &ScrapeResult,
    analysis: LlmAnalysis,
) -> EnrichmentRecord {
    EnrichmentRecord {
        enriched_at: Utc::now(),
        source: EnrichmentSource::LlmPipeline,
        website_scraped: scrape.success,
        sources: scrape.sources.clone(),

        summary: text_or(analysis.summary, || fallback::summary(company)),
        what_they_do: list_or(analysis.what_they_do, || fallback::what_they_do(company)),
        business_model: text_or(analysis.business_model, fallback::business_model),
        target_customers: text_or(analysis.target_customers, fallback::target_customers),
        key_products: list_or(analysis.key_products, || fallback::key_products(company)),
        tech_stack: list_or(analysis.tech_stack, fallback::tech_stack),
        funding_stage: text_or(analysis.funding_stage, fallback::funding_stage),
        competitors: list_or(analysis.competitors, fallback::competitors),
        market_position: text_or(analysis.market_position, fallback::market_position),

        signals: list_or(analysis.signals, fallback::signals),
        signal_strength: analysis
            .signal_strength
            .as_deref()
            .map(SignalStrength::parse)
            .unwrap_or_default(),
        key_insight: text_or(analysis.key_insight, fallback::key_insight),

        // Omitted here means unscored, never the fallback constants.
        score: analysis.score.map(clamp_score),
        grade: analysis.grade.as_deref().and_then(Grade::parse),
        recommendation: analysis
            .recommendation
            .filter(|r| !r.trim().is_empty()),
        thesis: analysis.thesis.unwrap_or_default(),
        strengths: analysis.strengths.unwrap_or_default(),
        risks: analysis.risks.unwrap_or_default(),
        next_steps: analysis.next_steps.unwrap_or_default(),
    }
}

/// Fallback path: every field populated from the deterministic generators.
fn full_fallback(company: &CompanyInput, scrape: &ScrapeResult) -> EnrichmentRecord {
    EnrichmentRecord {
        enriched_at: Utc::now(),
        source: EnrichmentSource::FallbackData,
        website_scraped: scrape.success,
        sources: scrape.sources.clone(),

        summary: fallback::summary(company),
        what_they_do: fallback::what_they_do(company),
        business_model: fallback::business_model(),
        target_customers: fallback::target_customers(),
        key_products: fallback::key_products(company),
        tech_stack: fallback::tech_stack(),
        funding_stage: fallback::funding_stage(),
        competitors: fallback::competitors(),
        market_position: fallback::market_position(),

        signals: fallback::signals(),
        signal_strength: SignalStrength::Unknown,
        key_insight: fallback::key_insight(),

        score: Some(fallback::FALLBACK_SCORE),
        grade: Some(fallback::FALLBACK_GRADE),
        recommendation: Some(fallback::FALLBACK_RECOMMENDATION.into()),
        thesis: fallback::thesis(company),
        strengths: fallback::strengths(),
        risks: fallback::risks(),
        next_steps: fallback::next_steps(),
    }
}

// ---------------------------------------------------------------------------
// Per-field reducers
// ---------------------------------------------------------------------------

/// Take the model's text when non-blank, else the fallback.
fn text_or(llm: Option<String>, fallback: impl FnOnce() -> String) -> String {
    match llm.map(|s| s.trim().to_string()) {
        Some(s) if !s.is_empty() => s,
        _ => fallback(),
    }
}

/// Take the model's list when non-empty, else the fallback.
fn list_or<T>(llm: Option<Vec<T>>, fallback: impl FnOnce() -> Vec<T>) -> Vec<T> {
    match llm {
        Some(items) if !items.is_empty() => items,
        _ => fallback(),
    }
}

/// Round and clamp a model-returned score into 0..=100.
fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
