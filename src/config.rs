//! Run configuration.
//!
//! Everything the pipeline needs is passed in explicitly. Values come from
//! `tracking/profile.yml` and `tracking/sources.yml` under the root directory,
//! with a few environment overrides on top.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const PROFILE_FILE: &str = "tracking/profile.yml";
const SOURCES_FILE: &str = "tracking/sources.yml";

pub const DEFAULT_LOCATION: &str = "Bangalore";
pub const DEFAULT_TITLE_KEYWORDS: &[&str] = &["lead", "architect"];
pub const DEFAULT_HOT_KEYWORDS: &[&str] =
    &["rapid scale", "hyper-growth", "fast-growing", "scaling fast"];
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Search profile for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunProfile {
    pub run_date: NaiveDate,
    pub target_location: String,
    pub title_keywords: Vec<String>,
    pub hot_keywords: Vec<String>,
}

impl RunProfile {
    pub fn run_date_string(&self) -> String {
        self.run_date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_redirects: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 20,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorSettings {
    pub adapter_timeout_secs: u64,
    pub run_timeout_secs: u64,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            adapter_timeout_secs: 30,
            run_timeout_secs: 90,
        }
    }
}

/// Shape of `tracking/profile.yml`. Every field is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileFile {
    pub target_location: String,
    pub title_keywords: Vec<String>,
    pub hot_keywords: Vec<String>,
    pub http: HttpSettings,
    pub aggregator: AggregatorSettings,
}

impl Default for ProfileFile {
    fn default() -> Self {
        Self {
            target_location: DEFAULT_LOCATION.to_string(),
            title_keywords: to_strings(DEFAULT_TITLE_KEYWORDS),
            hot_keywords: to_strings(DEFAULT_HOT_KEYWORDS),
            http: HttpSettings::default(),
            aggregator: AggregatorSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

/// One listing source. `scraper` selects the adapter implementation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub name: String,
    pub scraper: String,
    /// Overrides the adapter's built-in search URL
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Built-in source list, in dedup priority order
pub fn default_sources() -> Vec<SourceConfig> {
    ["linkedin", "naukri", "iimjobs"]
        .iter()
        .map(|kind| SourceConfig {
            name: kind.to_string(),
            scraper: kind.to_string(),
            url: None,
            enabled: true,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub profile: RunProfile,
    pub http: HttpSettings,
    pub aggregator: AggregatorSettings,
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load files under `root`, then apply environment overrides
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let profile_file = load_profile(root)?;
        let sources = load_sources(root)?;
        let mut config = Self::from_parts(profile_file, sources, Local::now().date_naive());
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_parts(file: ProfileFile, sources: Vec<SourceConfig>, run_date: NaiveDate) -> Self {
        Self {
            profile: RunProfile {
                run_date,
                target_location: file.target_location.trim().to_string(),
                title_keywords: clean_keywords(file.title_keywords),
                hot_keywords: clean_keywords(file.hot_keywords),
            },
            http: file.http,
            aggregator: file.aggregator,
            sources,
        }
    }

    /// Apply `JOB_DIGEST_LOCATION`, `JOB_DIGEST_RUN_DATE` and
    /// `JOB_DIGEST_RUN_TIMEOUT_SECS` from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(location) = lookup("JOB_DIGEST_LOCATION").filter(|v| !v.trim().is_empty()) {
            self.profile.target_location = location.trim().to_string();
        }

        if let Some(date) = lookup("JOB_DIGEST_RUN_DATE") {
            self.profile.run_date = parse_run_date(&date)?;
        }

        if let Some(secs) = lookup("JOB_DIGEST_RUN_TIMEOUT_SECS") {
            self.aggregator.run_timeout_secs =
                secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "JOB_DIGEST_RUN_TIMEOUT_SECS",
                    value: secs.clone(),
                })?;
        }

        Ok(())
    }
}

pub fn parse_run_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

pub fn load_profile(root: &Path) -> Result<ProfileFile, ConfigError> {
    let path = PathBuf::from(root).join(PROFILE_FILE);
    match read_optional(&path)? {
        Some(content) => serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        }),
        None => Ok(ProfileFile::default()),
    }
}

pub fn load_sources(root: &Path) -> Result<Vec<SourceConfig>, ConfigError> {
    let path = PathBuf::from(root).join(SOURCES_FILE);
    match read_optional(&path)? {
        Some(content) => {
            let file: SourcesFile =
                serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            Ok(file.sources)
        }
        None => Ok(default_sources()),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(None);
    }
    fs::read_to_string(path).map(Some).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Problems found in a source list
#[derive(Debug, Default, PartialEq)]
pub struct SourceValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a source list before running the pipeline
pub fn validate_sources(sources: &[SourceConfig], supported: &[&str]) -> SourceValidation {
    let mut report = SourceValidation::default();
    let mut names = std::collections::HashSet::new();

    for source in sources {
        if source.name.trim().is_empty() {
            report.errors.push(format!("Source with scraper '{}' has empty name", source.scraper));
        } else if !names.insert(source.name.to_lowercase()) {
            report.warnings.push(format!("Source '{}' is listed more than once", source.name));
        }

        if !supported.contains(&source.scraper.as_str()) {
            report.errors.push(format!(
                "Source '{}' has unsupported scraper type: '{}'. Supported types: {:?}",
                source.name, source.scraper, supported
            ));
        }

        if let Some(url) = &source.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                report.errors.push(format!(
                    "Source '{}' has URL without http/https scheme: {}",
                    source.name, url
                ));
            } else if url::Url::parse(url).is_err() {
                report.errors.push(format!("Source '{}' has an invalid URL: {}", source.name, url));
            }
        }
    }

    if !sources.iter().any(|s| s.enabled) {
        report.warnings.push("No source is enabled; every digest will be empty".to_string());
    }

    report
}

/// Settings in a profile file that make every run useless
pub fn profile_warnings(profile: &ProfileFile) -> Vec<String> {
    let mut warnings = Vec::new();

    if profile.target_location.trim().is_empty() {
        warnings.push(
            "target_location is empty; every posting will pass the location filter".to_string(),
        );
    }

    let timeouts = [
        ("http.request_timeout_secs", profile.http.request_timeout_secs),
        ("aggregator.adapter_timeout_secs", profile.aggregator.adapter_timeout_secs),
        ("aggregator.run_timeout_secs", profile.aggregator.run_timeout_secs),
    ];
    for (key, secs) in timeouts {
        if secs == 0 {
            warnings.push(format!("{} is 0; every source will time out", key));
        }
    }

    warnings
}

fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
