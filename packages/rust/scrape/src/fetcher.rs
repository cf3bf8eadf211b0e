//! Candidate-page fetcher for company websites.
//!
//! Given a base website URL, fetches a small fixed set of conventional
//! pages (home, about, company) and aggregates their extracted text into
//! one bounded excerpt. Individual page failures are tolerated; the whole
//! scrape fails only when nothing viable was extracted anywhere.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};
use url::Url;

use dealscope_shared::{DealscopeError, Result, ScrapeConfig, ScrapeResult};

use crate::extract::{self, PAGE_EXCERPT_CHARS};

/// Browser-like User-Agent — company sites routinely serve bot UAs an
/// empty shell or a 403.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Path suffixes probed under the base URL, in order. The base URL itself
/// is always the first candidate.
const CANDIDATE_PATHS: &[&str] = &["", "/about", "/about-us", "/company"];

/// Maximum number of redirects to follow per page.
const MAX_REDIRECTS: usize = 5;

/// Cap on the aggregated, multi-page excerpt.
pub const AGGREGATE_EXCERPT_CHARS: usize = 10_000;

// ---------------------------------------------------------------------------
// SiteFetcher
// ---------------------------------------------------------------------------

/// Fetches and extracts text from a company website's candidate pages.
///
/// Stateless apart from the connection pool; one instance can serve many
/// concurrent scrapes.
pub struct SiteFetcher {
    client: Client,
}

impl SiteFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DealscopeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Scrape the candidate pages of `website` into one aggregated excerpt.
    ///
    /// Never returns an error: any failure mode is reported inside the
    /// [`ScrapeResult`]. An absent/blank website short-circuits with zero
    /// network calls.
    #[instrument(skip_all, fields(website = website.unwrap_or("<none>")))]
    pub async fn scrape_site(&self, website: Option<&str>) -> ScrapeResult {
        let Some(website) = website.map(str::trim).filter(|w| !w.is_empty()) else {
            debug!("no website URL provided, skipping scrape");
            return ScrapeResult::failed("no website URL provided");
        };

        if let Err(e) = Url::parse(website) {
            warn!(error = %e, "website URL is not parseable");
            return ScrapeResult::failed(format!("invalid website URL: {e}"));
        }

        let mut aggregate = String::new();
        let mut sources: Vec<String> = Vec::new();

        for page_url in candidate_urls(website) {
            match self.fetch_page(&page_url).await {
                Ok(html) => match extract::extract_text(&html) {
                    Some(text) => {
                        let excerpt = extract::truncate_chars(&text, PAGE_EXCERPT_CHARS);
                        aggregate.push_str(&format!("\n\n=== {page_url} ===\n{excerpt}"));
                        debug!(url = %page_url, chars = text.len(), "page contributed content");
                        sources.push(page_url);
                    }
                    None => {
                        debug!(url = %page_url, "page text below viability threshold, skipping");
                    }
                },
                Err(e) => {
                    // A single unavailable page is never fatal to the scrape.
                    debug!(url = %page_url, error = %e, "page unavailable, skipping");
                }
            }
        }

        if aggregate.is_empty() {
            return ScrapeResult::failed("no content extracted");
        }

        info!(
            pages = sources.len(),
            chars = aggregate.len(),
            "scrape complete"
        );

        ScrapeResult {
            success: true,
            content: extract::truncate_chars(&aggregate, AGGREGATE_EXCERPT_CHARS).to_string(),
            sources,
            error: None,
        }
    }

    /// Fetch a single page's raw HTML. Non-2xx statuses are errors.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DealscopeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DealscopeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| DealscopeError::Network(format!("{url}: body read failed: {e}")))
    }
}

/// Build the ordered candidate URL list for a base website URL.
pub fn candidate_urls(website: &str) -> Vec<String> {
    let base = website.trim_end_matches('/');
    CANDIDATE_PATHS
        .iter()
        .map(|path| format!("{base}{path}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A page with enough visible text to clear the viability threshold,
    /// carrying a recognizable marker.
    fn viable_page(marker: &str) -> String {
        format!(
            "<html><body><main><h1>{marker}</h1><p>{}</p></main></body></html>",
            format!("{marker} builds software for growing teams. ").repeat(10)
        )
    }

    fn fetcher() -> SiteFetcher {
        SiteFetcher::new(&ScrapeConfig::default()).expect("build fetcher")
    }

    #[test]
    fn candidate_urls_trim_trailing_slash() {
        let urls = candidate_urls("https://acme.example/");
        assert_eq!(
            urls,
            vec![
                "https://acme.example",
                "https://acme.example/about",
                "https://acme.example/about-us",
                "https://acme.example/company",
            ]
        );
    }

    #[tokio::test]
    async fn missing_website_short_circuits() {
        let server = MockServer::start().await;

        // Zero requests must reach the server; verified on drop.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(viable_page("acme")))
            .expect(0)
            .mount(&server)
            .await;

        let result = fetcher().scrape_site(None).await;
        assert!(!result.success);
        assert!(result.sources.is_empty());
        assert!(result.content.is_empty());

        let result = fetcher().scrape_site(Some("   ")).await;
        assert!(!result.success);
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn unparseable_website_fails_without_fetching() {
        let result = fetcher().scrape_site(Some("not a url")).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("invalid website URL"));
    }

    #[tokio::test]
    async fn aggregates_pages_in_candidate_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(viable_page("homepage")))
            .mount(&server)
            .await;

        // /about is down; the scrape must carry on
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/about-us"))
            .respond_with(ResponseTemplate::new(200).set_body_string(viable_page("aboutpage")))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/company"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let base = server.uri();
        let result = fetcher().scrape_site(Some(&base)).await;

        assert!(result.success);
        assert_eq!(
            result.sources,
            vec![base.clone(), format!("{base}/about-us")]
        );

        // Each contribution is prefixed with its source URL; order follows
        // the candidate list, not response timing.
        let home_at = result
            .content
            .find(&format!("=== {base} ==="))
            .expect("homepage delimiter");
        let about_at = result
            .content
            .find(&format!("=== {base}/about-us ==="))
            .expect("about-us delimiter");
        assert!(home_at < about_at);
        assert!(result.content.contains("homepage"));
        assert!(result.content.contains("aboutpage"));
    }

    #[tokio::test]
    async fn all_pages_failing_reports_scrape_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = fetcher().scrape_site(Some(&server.uri())).await;
        assert!(!result.success);
        assert!(result.sources.is_empty());
        assert_eq!(result.error.as_deref(), Some("no content extracted"));
    }

    #[tokio::test]
    async fn thin_pages_contribute_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"),
            )
            .mount(&server)
            .await;

        let result = fetcher().scrape_site(Some(&server.uri())).await;
        assert!(!result.success);
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn page_contribution_is_capped() {
        let server = MockServer::start().await;

        let huge = format!(
            "<html><body><p>{}</p></body></html>",
            "verbose marketing copy. ".repeat(2000)
        );
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(huge))
            .mount(&server)
            .await;

        let base = server.uri();
        let result = fetcher().scrape_site(Some(&base)).await;
        assert!(result.success);

        // One page: delimiter plus at most PAGE_EXCERPT_CHARS of text.
        let delimiter = format!("\n\n=== {base} ===\n");
        let body_len = result.content.len() - delimiter.len();
        assert!(
            body_len <= PAGE_EXCERPT_CHARS,
            "page contribution {body_len} exceeds cap"
        );
    }
}
