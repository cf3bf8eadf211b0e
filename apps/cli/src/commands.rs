//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use dealscope_core::{Enricher, ProgressReporter, SilentProgress};
use dealscope_llm::LlmConfig;
use dealscope_shared::{
    AppConfig, CompanyInput, EnrichmentRecord, EnrichmentSource, ScrapeConfig, init_config,
    load_config,
};

use crate::cache;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// dealscope — company research enrichment from the command line.
#[derive(Parser)]
#[command(
    name = "dealscope",
    version,
    about = "Scrape company websites and build LLM-backed investment analyses.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich a single company and cache the record.
    Enrich {
        /// Company name.
        name: String,

        /// Company website URL (omit to analyze from metadata alone).
        #[arg(short, long)]
        website: Option<String>,

        /// Industry / sector label.
        #[arg(short, long)]
        industry: Option<String>,

        /// Short company description.
        #[arg(short, long)]
        description: Option<String>,

        /// Headquarters location.
        #[arg(short, long)]
        location: Option<String>,

        /// Founding year.
        #[arg(long)]
        founded: Option<String>,

        /// Headcount or range.
        #[arg(long)]
        employees: Option<String>,

        /// Directory for cached records (defaults to config output_dir).
        #[arg(short, long)]
        out: Option<String>,

        /// Re-enrich even if a cached record exists.
        #[arg(long)]
        force: bool,
    },

    /// Enrich every company in a JSON list file, concurrently.
    Batch {
        /// Path to a JSON array of company records.
        input: PathBuf,

        /// Directory for cached records (defaults to config output_dir).
        #[arg(short, long)]
        out: Option<String>,

        /// Concurrent enrichments (defaults to config concurrency).
        #[arg(short, long)]
        concurrency: Option<u32>,

        /// Re-enrich companies that already have cached records.
        #[arg(long)]
        force: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dealscope=info",
        1 => "dealscope=debug",
        _ => "dealscope=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich {
            name,
            website,
            industry,
            description,
            location,
            founded,
            employees,
            out,
            force,
        } => {
            let company = CompanyInput {
                name,
                website,
                description,
                industry,
                location,
                founded,
                employees,
            };
            cmd_enrich(company, out.as_deref(), force).await
        }
        Command::Batch {
            input,
            out,
            concurrency,
            force,
        } => cmd_batch(&input, out.as_deref(), concurrency, force).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

async fn cmd_enrich(company: CompanyInput, out: Option<&str>, force: bool) -> Result<()> {
    let config = load_config()?;
    let records_dir = resolve_records_dir(out, &config)?;
    let record_path = cache::record_path(&records_dir, &company);

    if !force {
        if let Some(cached) = cache::load(&record_path) {
            info!(company = %company.name, "using cached record (pass --force to re-enrich)");
            print_summary(&company.name, &cached, &record_path, true);
            return Ok(());
        }
    }

    let enricher = build_enricher(&config)?;

    info!(company = %company.name, "starting enrichment");

    let progress = CliProgress::new();
    let record = enricher.enrich(&company, &progress).await?;
    progress.finish();

    cache::store(&record_path, &record)?;
    print_summary(&company.name, &record, &record_path, false);

    Ok(())
}

/// Print the post-enrichment summary block.
fn print_summary(name: &str, record: &EnrichmentRecord, path: &Path, from_cache: bool) {
    println!();
    if from_cache {
        println!("  Cached record (re-run with --force to refresh):");
    } else {
        println!("  Enrichment complete!");
    }
    println!("  Company: {name}");
    println!("  Source:  {}", record.source);
    if record.website_scraped {
        println!("  Scraped: yes ({} pages)", record.sources.len());
    } else {
        println!("  Scraped: no");
    }
    match (record.score, record.grade) {
        (Some(score), Some(grade)) => println!("  Score:   {score}/100 (grade {grade})"),
        (Some(score), None) => println!("  Score:   {score}/100"),
        _ => println!("  Score:   unscored"),
    }
    if let Some(recommendation) = &record.recommendation {
        println!("  Call:    {recommendation}");
    }
    if record.source == EnrichmentSource::FallbackData {
        println!("  Note:    fallback data — live analysis was unavailable");
    }
    println!("  Record:  {}", path.display());
    println!();
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

async fn cmd_batch(
    input: &Path,
    out: Option<&str>,
    concurrency: Option<u32>,
    force: bool,
) -> Result<()> {
    let config = load_config()?;
    let records_dir = resolve_records_dir(out, &config)?;

    let content = std::fs::read_to_string(input)
        .map_err(|e| eyre!("cannot read company list '{}': {e}", input.display()))?;
    let companies: Vec<CompanyInput> = serde_json::from_str(&content)
        .map_err(|e| eyre!("invalid company list '{}': {e}", input.display()))?;

    if companies.is_empty() {
        return Err(eyre!("company list '{}' is empty", input.display()));
    }

    let concurrency = concurrency.unwrap_or(config.defaults.concurrency).max(1);
    let enricher = Arc::new(build_enricher(&config)?);
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency as usize));

    info!(
        companies = companies.len(),
        concurrency, "starting batch enrichment"
    );

    let bar = ProgressBar::new(companies.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let mut skipped = 0usize;
    let mut handles = Vec::new();

    for company in companies {
        let record_path = cache::record_path(&records_dir, &company);

        if !force && cache::load(&record_path).is_some() {
            skipped += 1;
            bar.inc(1);
            continue;
        }

        let enricher = enricher.clone();
        let semaphore = semaphore.clone();
        let bar = bar.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            bar.set_message(company.name.clone());

            let outcome = match enricher.enrich(&company, &SilentProgress).await {
                Ok(record) => match cache::store(&record_path, &record) {
                    Ok(()) => Ok(record.source),
                    Err(e) => Err(e.to_string()),
                },
                Err(e) => Err(e.to_string()),
            };

            bar.inc(1);
            (company.name, outcome)
        }));
    }

    let mut enriched = 0usize;
    let mut degraded = 0usize;
    let mut failures: Vec<(String, String)> = Vec::new();

    for handle in handles {
        match handle.await {
            Ok((_, Ok(EnrichmentSource::LlmPipeline))) => enriched += 1,
            Ok((_, Ok(EnrichmentSource::FallbackData))) => degraded += 1,
            Ok((name, Err(error))) => failures.push((name, error)),
            Err(e) => failures.push(("<task>".into(), e.to_string())),
        }
    }

    bar.finish_and_clear();

    println!();
    println!("  Batch complete!");
    println!("  Enriched: {enriched}");
    println!("  Fallback: {degraded}");
    println!("  Cached:   {skipped} (skipped)");
    println!("  Failed:   {}", failures.len());
    println!("  Records:  {}", records_dir.display());
    for (name, error) in &failures {
        println!("    {name}: {error}");
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the enricher from app config, resolving the API key from env.
fn build_enricher(config: &AppConfig) -> Result<Enricher> {
    let llm_config = LlmConfig::from_app(config);
    if llm_config.api_key.is_none() {
        info!(
            env_var = %config.llm.api_key_env,
            "no API key in environment; records will use fallback data"
        );
    }
    Ok(Enricher::new(&ScrapeConfig::from(config), llm_config)?)
}

/// Resolve the records directory: flag overrides config, `~` expands to home.
fn resolve_records_dir(out: Option<&str>, config: &AppConfig) -> Result<PathBuf> {
    let raw = out.unwrap_or(&config.defaults.output_dir);
    expand_home(raw)
}

/// Expand a leading `~/` against the user's home directory.
fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| eyre!("cannot determine home directory"))?;
        if path == "~" {
            return Ok(home);
        }
        return Ok(home.join(&path[2..]));
    }
    Ok(PathBuf::from(path))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_passthrough_for_absolute_paths() {
        assert_eq!(
            expand_home("/var/records").unwrap(),
            PathBuf::from("/var/records")
        );
        assert_eq!(expand_home("relative").unwrap(), PathBuf::from("relative"));
    }

    #[test]
    fn expand_home_resolves_tilde() {
        let home = dirs::home_dir().expect("home dir in test env");
        assert_eq!(expand_home("~").unwrap(), home);
        assert_eq!(expand_home("~/records").unwrap(), home.join("records"));
        // A tilde mid-path is not expansion syntax
        assert_eq!(expand_home("a/~/b").unwrap(), PathBuf::from("a/~/b"));
    }

    #[test]
    fn records_dir_prefers_flag_over_config() {
        let config = AppConfig::default();
        let dir = resolve_records_dir(Some("/tmp/override"), &config).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/override"));

        let dir = resolve_records_dir(None, &config).unwrap();
        assert!(dir.ends_with("dealscope-records"));
    }
}
