use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::SourceError;

/// Sentinel used when a card has no company or location text
pub const UNKNOWN: &str = "Unknown";

/// Sentinel used when a card has no posting date
pub const NOT_AVAILABLE: &str = "N/A";

/// Posting date as the source printed it.
///
/// Ordering compares the raw text lexicographically. Sources that print
/// different date formats will therefore interleave oddly; changing the
/// ordering policy only requires touching the `Ord` impl below.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostedDate(String);

impl PostedDate {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(NOT_AVAILABLE.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn unknown() -> Self {
        Self(NOT_AVAILABLE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for PostedDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for PostedDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PostedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized job posting. Built once by an adapter and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub posted_date: PostedDate,
    pub source_name: String,
    /// Lowercased text used for keyword tagging only
    pub description_text: String,
}

impl JobRecord {
    /// Build a record from raw card fields.
    ///
    /// `title` and `url` are required; empty optional fields fall back to the
    /// `Unknown` / `N/A` sentinels. `description` is appended to the lowercased
    /// title to form `description_text`.
    pub fn new(
        source_name: &str,
        title: &str,
        company: Option<&str>,
        location: Option<&str>,
        url: &str,
        posted_date: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, SourceError> {
        let title = collapse_whitespace(title);
        if title.is_empty() {
            return Err(SourceError::MissingField("title"));
        }
        let url = url.trim();
        if url.is_empty() {
            return Err(SourceError::MissingField("url"));
        }

        let mut description_text = title.to_lowercase();
        if let Some(extra) = description.map(collapse_whitespace).filter(|d| !d.is_empty()) {
            description_text.push(' ');
            description_text.push_str(&extra.to_lowercase());
        }

        Ok(Self {
            title,
            company: or_sentinel(company, UNKNOWN),
            location: or_sentinel(location, UNKNOWN),
            url: url.to_string(),
            posted_date: posted_date.map(PostedDate::new).unwrap_or_else(PostedDate::unknown),
            source_name: source_name.to_string(),
            description_text,
        })
    }
}

/// A record after the tagging stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedJob {
    pub record: JobRecord,
    pub hot: bool,
}

/// Health of a single source for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Disabled,
    NotFound,
    Forbidden,
    RateLimited,
    ServerError,
    HttpError,
    Timeout,
    NetworkError,
    ParseError,
    Panicked,
    Unknown,
}

impl SourceStatus {
    /// Map a non-success HTTP status code
    pub fn from_http_code(code: u16) -> Self {
        match code {
            200..=299 => SourceStatus::Ok,
            404 => SourceStatus::NotFound,
            403 => SourceStatus::Forbidden,
            429 => SourceStatus::RateLimited,
            500..=599 => SourceStatus::ServerError,
            _ => SourceStatus::HttpError,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, SourceStatus::Ok | SourceStatus::Disabled)
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceStatus::Ok => "ok",
            SourceStatus::Disabled => "disabled",
            SourceStatus::NotFound => "not_found",
            SourceStatus::Forbidden => "forbidden",
            SourceStatus::RateLimited => "rate_limited",
            SourceStatus::ServerError => "server_error",
            SourceStatus::HttpError => "http_error",
            SourceStatus::Timeout => "timeout",
            SourceStatus::NetworkError => "network_error",
            SourceStatus::ParseError => "parse_error",
            SourceStatus::Panicked => "panicked",
            SourceStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// What an adapter hands back to the aggregator. Adapters never return an
/// error; a failed fetch is an outcome with a non-ok status.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub source_name: String,
    pub records: Vec<JobRecord>,
    pub status: SourceStatus,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn ok(source_name: &str, records: Vec<JobRecord>) -> Self {
        Self {
            source_name: source_name.to_string(),
            records,
            status: SourceStatus::Ok,
            error: None,
        }
    }

    pub fn disabled(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            records: vec![],
            status: SourceStatus::Disabled,
            error: None,
        }
    }

    pub fn failed(source_name: &str, status: SourceStatus, error: impl Into<String>) -> Self {
        Self {
            source_name: source_name.to_string(),
            records: vec![],
            status,
            error: Some(error.into()),
        }
    }

    /// Convert a source error into an empty outcome
    pub fn from_error(source_name: &str, err: &SourceError) -> Self {
        Self::failed(source_name, err.status(), err.to_string())
    }
}

/// Per-adapter line of the run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source_name: String,
    pub status: SourceStatus,
    pub record_count: usize,
    pub error: Option<String>,
}

/// Stage counts for one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_date: String,
    pub fetched: usize,
    pub after_filter: usize,
    pub after_dedup: usize,
    pub hot_count: usize,
    pub sources: Vec<SourceReport>,
}

/// Lowercase, trim and collapse runs of whitespace
pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn or_sentinel(value: Option<&str>, sentinel: &str) -> String {
    value
        .map(collapse_whitespace)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}
