//! Shared types, error model, and configuration for dealscope.
//!
//! This crate is the foundation depended on by all other dealscope crates.
//! It provides:
//! - [`DealscopeError`] — the unified error type
//! - Domain types ([`CompanyInput`], [`ScrapeResult`], [`EnrichmentRecord`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, LlmSettings, ScrapeConfig, ScrapeSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{DealscopeError, Result};
pub use types::{
    CompanyInput, EnrichmentRecord, EnrichmentSource, Grade, ScrapeResult, Signal, SignalStrength,
};
