//! Disk cache of enrichment records.
//!
//! The pipeline itself holds no memory across calls; this cache is the
//! caller-side persistence the dashboard would otherwise keep. Records are
//! stored one JSON file per company, keyed by a slug plus a hash of the
//! company's identity (name + website), so renaming a company or changing
//! its website gets a fresh record.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use dealscope_shared::{CompanyInput, DealscopeError, EnrichmentRecord, Result};

/// Hex digits of the identity hash kept in the file name.
const KEY_HASH_LEN: usize = 12;

/// Compute the cache file path for a company under `dir`.
pub fn record_path(dir: &Path, company: &CompanyInput) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(company.name.as_bytes());
    hasher.update(b"|");
    hasher.update(company.website_url().unwrap_or_default().as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    dir.join(format!(
        "{}-{}.json",
        slugify(&company.name),
        &hash[..KEY_HASH_LEN]
    ))
}

/// Load a cached record, if one exists and parses.
pub fn load(path: &Path) -> Option<EnrichmentRecord> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(?path, error = %e, "ignoring unreadable cached record");
            None
        }
    }
}

/// Write a record to its cache path, creating parent directories.
pub fn store(path: &Path, record: &EnrichmentRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DealscopeError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| DealscopeError::validation(format!("record serialization failed: {e}")))?;

    std::fs::write(path, json).map_err(|e| DealscopeError::io(path, e))
}

/// Reduce a company name to a filesystem-safe slug.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "company".into() } else { slug }
}
