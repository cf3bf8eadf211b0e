//! Deterministic fallback data, used when the LLM path is unavailable and
//! for per-field gaps on the LLM path.
//!
//! Generators are pure over [`CompanyInput`], so two fallback records for
//! the same company differ only in their timestamp. The fixed 65/B/"Hold"
//! scoring is deliberate placeholder behavior — a fallback record must be
//! visibly middling, not data-driven.

use dealscope_shared::{CompanyInput, Grade, Signal};

/// Placeholder score for full-fallback records.
pub const FALLBACK_SCORE: u8 = 65;

/// Placeholder grade for full-fallback records.
pub const FALLBACK_GRADE: Grade = Grade::B;

/// Placeholder recommendation for full-fallback records. Intentionally
/// outside the prompt's enumerated set so it reads as an annotation, not a
/// model verdict.
pub const FALLBACK_RECOMMENDATION: &str = "Hold - Needs Further Analysis";

/// The seven tracked signal labels, in presentation order.
pub const SIGNAL_LABELS: [&str; 7] = [
    "Hiring actively",
    "Recent product launch",
    "Enterprise customers",
    "Strong technical team",
    "Market expansion",
    "Revenue growth",
    "Partnership activity",
];

/// Templated executive summary from whatever fields the caller supplied.
pub fn summary(company: &CompanyInput) -> String {
    format!(
        "{} is a {} company based in {}. {} Founded in {}, they have grown to {} team.",
        company.name,
        field(company.industry.as_deref(), "technology"),
        field(company.location.as_deref(), "the US"),
        field(
            company.description.as_deref(),
            "They provide innovative solutions in their market.",
        ),
        field(company.founded.as_deref(), "recent years"),
        field(company.employees.as_deref(), "a dedicated"),
    )
}

/// Five generic points about the company's offering.
pub fn what_they_do(company: &CompanyInput) -> Vec<String> {
    let description_point = company
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| d.split('.').next().unwrap_or(d).trim().to_string())
        .unwrap_or_else(|| "Offers innovative platform services".into());

    vec![
        format!(
            "Provides {} solutions",
            field(company.industry.as_deref(), "technology")
        ),
        description_point,
        "Serves enterprise and SMB customers".into(),
        "Focuses on user experience and scalability".into(),
        format!(
            "Operates from {}",
            field(company.location.as_deref(), "multiple locations")
        ),
    ]
}

pub fn business_model() -> String {
    "SaaS / Technology".into()
}

pub fn target_customers() -> String {
    "Businesses and enterprises".into()
}

pub fn key_products(company: &CompanyInput) -> Vec<String> {
    vec![format!("{} Platform", company.name)]
}

pub fn tech_stack() -> Vec<String> {
    vec!["Cloud".into(), "Modern Web Stack".into()]
}

pub fn funding_stage() -> String {
    "Unknown".into()
}

pub fn competitors() -> Vec<String> {
    vec!["Various competitors".into()]
}

pub fn market_position() -> String {
    "Emerging player".into()
}

/// All seven signals, undetected, each with a manual-verification hint.
pub fn signals() -> Vec<Signal> {
    let evidence = [
        "Check careers page for verification",
        "Review blog/news for updates",
        "Check case studies section",
        "Review LinkedIn profiles",
        "Check press releases",
        "Review funding announcements",
        "Check integrations page",
    ];

    SIGNAL_LABELS
        .iter()
        .zip(evidence)
        .map(|(label, evidence)| Signal {
            label: (*label).into(),
            detected: false,
            evidence: evidence.into(),
        })
        .collect()
}

pub fn key_insight() -> String {
    "Further analysis needed.".into()
}

/// Templated thesis naming the company and industry.
pub fn thesis(company: &CompanyInput) -> String {
    format!(
        "{} operates in the {} space. Manual review recommended to validate investment potential.",
        company.name,
        field(company.industry.as_deref(), "technology"),
    )
}

pub fn strengths() -> Vec<String> {
    vec![
        "Established web presence".into(),
        "Clear product focus".into(),
        "Active in growing market".into(),
    ]
}

pub fn risks() -> Vec<String> {
    vec![
        "Limited data available".into(),
        "Competitive market".into(),
        "Further due diligence needed".into(),
    ]
}

pub fn next_steps() -> Vec<String> {
    vec![
        "Schedule founder call".into(),
        "Review financials".into(),
        "Analyze competitive landscape".into(),
    ]
}

/// A field value, or the template default when absent/blank.
fn field<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}
