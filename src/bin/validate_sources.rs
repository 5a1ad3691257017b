//! Source Validation Binary
//!
//! Validates tracking/sources.yml and tracking/profile.yml:
//! - Checks scraper types are supported
//! - Checks URL overrides are absolute http(s) URLs
//! - Flags zero timeouts in the profile
//! - Reports configuration issues before a scheduled run

use std::path::PathBuf;

use anyhow::{Context, Result};

use job_digest::config::{load_profile, load_sources, profile_warnings, validate_sources};
use job_digest::scrapers::SUPPORTED_SCRAPERS;

fn main() -> Result<()> {
    let root = PathBuf::from(std::env::var("ROOT").unwrap_or_else(|_| ".".to_string()));

    println!("=== Source Configuration Validator ===");

    let profile = load_profile(&root).context("Failed to load profile.yml")?;
    let sources = load_sources(&root).context("Failed to load sources.yml")?;

    let mut report = validate_sources(&sources, SUPPORTED_SCRAPERS);
    report.warnings.extend(profile_warnings(&profile));

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("✓ All {} sources are valid", sources.len());
        return Ok(());
    }

    if !report.errors.is_empty() {
        println!("\n❌ ERRORS (must fix):");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }

    if !report.warnings.is_empty() {
        println!("\n⚠️  WARNINGS:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    if !report.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
