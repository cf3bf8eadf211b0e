//! Application configuration for dealscope.
//!
//! User config lives at `~/.dealscope/dealscope.toml`.
//! CLI flags override config file values, which override defaults.
//! The LLM credential itself is never stored — only the name of the
//! environment variable that holds it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DealscopeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dealscope.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dealscope";

// ---------------------------------------------------------------------------
// Config structs (matching dealscope.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// LLM endpoint settings.
    #[serde(default)]
    pub llm: LlmSettings,

    /// Website scraping settings.
    #[serde(default)]
    pub scrape: ScrapeSettings,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default directory for cached enrichment records.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default concurrent enrichments for batch runs.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_output_dir() -> String {
    "~/dealscope-records".into()
}
fn default_concurrency() -> u32 {
    4
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model to request for analysis.
    #[serde(default = "default_model")]
    pub model: String,

    /// Attempt budget per analysis call (rate limits included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_max_attempts() -> u32 {
    3
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSettings {
    /// Per-page fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration consumed by the site fetcher.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Per-page fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
        }
    }
}

impl From<&AppConfig> for ScrapeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.scrape.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dealscope/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DealscopeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dealscope/dealscope.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DealscopeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DealscopeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DealscopeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DealscopeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DealscopeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the LLM API key from the configured environment variable.
///
/// Absence is a valid runtime state, not an error: the pipeline routes
/// keyless runs to fallback mode.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.llm.api_key_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}
