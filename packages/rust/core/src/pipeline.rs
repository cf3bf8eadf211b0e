//! End-to-end enrichment pipeline: scrape → analyze → normalize.
//!
//! The flow is linear and failure-absorbing: a failed scrape feeds empty
//! content to the analysis phase, a failed analysis feeds fallback mode to
//! normalization, and either way the caller gets one complete, labeled
//! [`EnrichmentRecord`]. The only hard error is a company with no name —
//! there is nothing meaningful to enrich.

use tracing::{info, instrument, warn};

use dealscope_llm::{LlmClient, LlmConfig, build_analysis_prompt};
use dealscope_scrape::SiteFetcher;
use dealscope_shared::{CompanyInput, DealscopeError, EnrichmentRecord, Result, ScrapeConfig};

use crate::normalize::{LlmAnalysis, LlmOutcome, normalize};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for enrichment phases.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
}

// ---------------------------------------------------------------------------
// Enricher
// ---------------------------------------------------------------------------

/// The enrichment orchestrator.
///
/// Holds a site fetcher and an LLM client; both are stateless, so one
/// `Enricher` can serve many concurrent enrichments.
pub struct Enricher {
    fetcher: SiteFetcher,
    llm: LlmClient,
}

impl Enricher {
    /// Create an enricher from runtime configuration.
    pub fn new(scrape_config: &ScrapeConfig, llm_config: LlmConfig) -> Result<Self> {
        Ok(Self {
            fetcher: SiteFetcher::new(scrape_config)?,
            llm: LlmClient::new(llm_config)?,
        })
    }

    /// Enrich one company.
    ///
    /// Always returns a complete record for a named company; scrape and
    /// LLM failures surface only through the record's `source` tag.
    #[instrument(skip_all, fields(company = %company.name))]
    pub async fn enrich(
        &self,
        company: &CompanyInput,
        progress: &dyn ProgressReporter,
    ) -> Result<EnrichmentRecord> {
        if company.name.trim().is_empty() {
            return Err(DealscopeError::validation(
                "company has no name; nothing to enrich",
            ));
        }

        info!("starting enrichment");

        // --- Phase 1: Scrape ---
        progress.phase("Scraping website");
        let scrape = self.fetcher.scrape_site(company.website_url()).await;
        if !scrape.success {
            info!(
                error = scrape.error.as_deref().unwrap_or("unknown"),
                "scrape produced no content, continuing without it"
            );
        }

        // --- Phase 2: Analyze ---
        progress.phase("Running analysis");
        let outcome = if !self.llm.has_credential() {
            info!("no API key configured, using fallback data");
            LlmOutcome::Unavailable
        } else {
            let content = if scrape.success {
                Some(scrape.content.as_str())
            } else {
                None
            };
            let prompt = build_analysis_prompt(company, content);

            match self.llm.call(&prompt).await {
                Ok(value) => LlmOutcome::Analyzed(LlmAnalysis::from_value(value)),
                Err(e) => {
                    warn!(error = %e, "analysis unavailable, using fallback data");
                    LlmOutcome::Unavailable
                }
            }
        };

        // --- Phase 3: Normalize ---
        progress.phase("Building record");
        let record = normalize(company, &scrape, outcome);

        info!(
            source = %record.source,
            website_scraped = record.website_scraped,
            pages = record.sources.len(),
            "enrichment complete"
        );

        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use dealscope_llm::{NO_CONTENT_NOTICE, RetryPolicy};
    use dealscope_shared::{EnrichmentSource, Grade};

    fn llm_config(server: &MockServer, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            model: "test-model".into(),
            api_key: api_key.map(String::from),
            temperature: 0.4,
            max_tokens: 2048,
            retry: RetryPolicy {
                max_attempts: 3,
                backoff_base: Duration::from_millis(5),
                rate_limit_cooldown: Duration::from_millis(5),
            },
        }
    }

    fn enricher(llm_server: &MockServer, api_key: Option<&str>) -> Enricher {
        Enricher::new(&ScrapeConfig::default(), llm_config(llm_server, api_key))
            .expect("build enricher")
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    fn viable_page(marker: &str) -> String {
        format!(
            "<html><body><p>{}</p></body></html>",
            format!("{marker} ships robots to warehouses. ").repeat(12)
        )
    }

    #[tokio::test]
    async fn unnamed_company_is_the_only_hard_error() {
        let llm = MockServer::start().await;
        let err = enricher(&llm, None)
            .enrich(&CompanyInput::named("   "), &SilentProgress)
            .await
            .expect_err("blank name must fail");
        assert!(matches!(err, DealscopeError::Validation { .. }));
    }

    #[tokio::test]
    async fn keyless_run_yields_complete_fallback_record() {
        let llm = MockServer::start().await;

        // Without a credential the LLM endpoint must never be contacted.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("{}")))
            .expect(0)
            .mount(&llm)
            .await;

        let record = enricher(&llm, None)
            .enrich(&CompanyInput::named("Acme"), &SilentProgress)
            .await
            .expect("fallback record");

        assert_eq!(record.source, EnrichmentSource::FallbackData);
        assert!(!record.website_scraped);
        assert!(record.sources.is_empty());
        assert_eq!(record.score, Some(65));
        assert_eq!(record.grade, Some(Grade::B));
        assert_eq!(record.signals.len(), 7);
    }

    #[tokio::test]
    async fn llm_exhaustion_routes_to_fallback() {
        let llm = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&llm)
            .await;

        let record = enricher(&llm, Some("sk-test"))
            .enrich(&CompanyInput::named("Acme"), &SilentProgress)
            .await
            .expect("fallback record, not an error");

        assert_eq!(record.source, EnrichmentSource::FallbackData);
        assert_eq!(record.score, Some(65));
        assert_eq!(record.grade, Some(Grade::B));
    }

    #[tokio::test]
    async fn rate_limits_resolve_within_budget() {
        let llm = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&llm)
            .await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body(r#"{"summary": "Recovered.", "score": 70}"#)),
            )
            .expect(1)
            .mount(&llm)
            .await;

        let record = enricher(&llm, Some("sk-test"))
            .enrich(&CompanyInput::named("Acme"), &SilentProgress)
            .await
            .expect("third attempt succeeds");

        assert_eq!(record.source, EnrichmentSource::LlmPipeline);
        assert_eq!(record.summary, "Recovered.");
        assert_eq!(record.score, Some(70));
        assert_eq!(llm.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_scrape_tells_the_model_explicitly() {
        let site = MockServer::start().await;
        let llm = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&site)
            .await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_body(r#"{"summary": "ok"}"#)),
            )
            .mount(&llm)
            .await;

        let company = CompanyInput {
            name: "Acme".into(),
            website: Some(site.uri()),
            ..CompanyInput::default()
        };

        let record = enricher(&llm, Some("sk-test"))
            .enrich(&company, &SilentProgress)
            .await
            .expect("record");

        assert!(!record.website_scraped);
        assert!(record.sources.is_empty());
        assert_eq!(record.source, EnrichmentSource::LlmPipeline);

        let requests = llm.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        let prompt = body["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains(NO_CONTENT_NOTICE));
    }

    #[tokio::test]
    async fn scraped_content_reaches_the_prompt() {
        let site = MockServer::start().await;
        let llm = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(viable_page("acmecorp")),
            )
            .mount(&site)
            .await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body(r#"{"summary": "From the site."}"#)),
            )
            .mount(&llm)
            .await;

        let company = CompanyInput {
            name: "Acme".into(),
            website: Some(site.uri()),
            ..CompanyInput::default()
        };

        let record = enricher(&llm, Some("sk-test"))
            .enrich(&company, &SilentProgress)
            .await
            .expect("record");

        assert!(record.website_scraped);
        assert_eq!(record.sources, vec![site.uri()]);
        assert_eq!(record.summary, "From the site.");

        let requests = llm.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        let prompt = body["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("acmecorp ships robots"));
        assert!(prompt.contains(&format!("=== {} ===", site.uri())));
    }

    #[tokio::test]
    async fn phases_are_reported_in_order() {
        struct Recording(std::sync::Mutex<Vec<String>>);
        impl ProgressReporter for Recording {
            fn phase(&self, name: &str) {
                self.0.lock().unwrap().push(name.to_string());
            }
        }

        let llm = MockServer::start().await;
        let progress = Recording(std::sync::Mutex::new(Vec::new()));

        enricher(&llm, None)
            .enrich(&CompanyInput::named("Acme"), &progress)
            .await
            .expect("record");

        let phases = progress.0.into_inner().unwrap();
        assert_eq!(
            phases,
            vec!["Scraping website", "Running analysis", "Building record"]
        );
    }
}
