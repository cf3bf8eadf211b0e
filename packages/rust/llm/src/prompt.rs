//! Analysis prompt rendering.
//!
//! The prompt is the contract the normalizer validates against: it names
//! every output field, the enumerated value sets, and the expected list
//! lengths. Rendering is fully deterministic — missing company fields
//! become explicit "Unknown"/"N/A" placeholders, never empty interpolations.

use dealscope_shared::CompanyInput;

/// System instruction pinning JSON-only output.
pub const SYSTEM_PROMPT: &str =
    "You are a VC analyst. Always respond with valid JSON only, no markdown formatting.";

/// Notice injected when scraping produced nothing usable.
pub const NO_CONTENT_NOTICE: &str =
    "No website content available - analyze based on provided info only.";

/// Render the analysis prompt for one company.
///
/// `content` is the aggregated website excerpt; `None` (or empty) renders
/// the explicit no-content notice so the model never sees a silent blank.
pub fn build_analysis_prompt(company: &CompanyInput, content: Option<&str>) -> String {
    let content = content.map(str::trim).filter(|c| !c.is_empty());

    format!(
        r#"You are a VC analyst. Analyze this company comprehensively for investment evaluation.

=== COMPANY INFO ===
Name: {name}
Website: {website}
Industry: {industry}
Description: {description}
Founded: {founded}
Employees: {employees}

=== SCRAPED WEBSITE CONTENT ===
{content}

=== TASK ===
Extract structured data and provide investment analysis. Return a JSON object with ALL these fields:

{{
  "summary": "2-3 sentence executive summary",
  "whatTheyDo": ["5 specific points about their products/services"],
  "businessModel": "How they make money",
  "targetCustomers": "Who their customers are",
  "keyProducts": ["Main products/services list"],
  "techStack": ["Technologies they likely use"],
  "fundingStage": "Seed/Series A/B/C/Growth/Public/Unknown",
  "competitors": ["3-5 direct competitors"],
  "marketPosition": "Their market position description",

  "signals": [
    {{"label": "Hiring actively", "detected": true/false, "evidence": "brief reason"}},
    {{"label": "Recent product launch", "detected": true/false, "evidence": "brief reason"}},
    {{"label": "Enterprise customers", "detected": true/false, "evidence": "brief reason"}},
    {{"label": "Strong technical team", "detected": true/false, "evidence": "brief reason"}},
    {{"label": "Market expansion", "detected": true/false, "evidence": "brief reason"}},
    {{"label": "Revenue growth", "detected": true/false, "evidence": "brief reason"}},
    {{"label": "Partnership activity", "detected": true/false, "evidence": "brief reason"}}
  ],
  "signalStrength": "Strong/Moderate/Weak",
  "keyInsight": "One key insight for investors",

  "score": 0-100,
  "grade": "A/B/C/D/F",
  "recommendation": "Strong Buy/Buy/Hold/Pass",
  "thesis": "2-3 sentences on investment thesis",
  "strengths": ["3 key strengths"],
  "risks": ["3 key risks"],
  "nextSteps": ["2-3 due diligence steps"]
}}

Return ONLY valid JSON, no markdown formatting or extra text."#,
        name = company.name,
        website = placeholder(company.website.as_deref(), "N/A"),
        industry = placeholder(company.industry.as_deref(), "Unknown"),
        description = placeholder(company.description.as_deref(), "N/A"),
        founded = placeholder(company.founded.as_deref(), "Unknown"),
        employees = placeholder(company.employees.as_deref(), "Unknown"),
        content = content.unwrap_or(NO_CONTENT_NOTICE),
    )
}

/// A field value, or an explicit placeholder when absent/blank.
fn placeholder<'a>(value: Option<&'a str>, absent: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => absent,
    }
}
