//! URL Canonicalization and Deduplication Module
//!
//! Provides functions to:
//! - Canonicalize posting URLs (https, lowercase, no query string or fragment)
//! - Build the (title, company) content key
//! - Deduplicate records across sources, keeping the first one seen

use std::collections::HashSet;

use crate::types::{normalize_text, JobRecord, NOT_AVAILABLE, UNKNOWN};

/// Canonicalize a posting URL for comparison
///
/// Rules:
/// 1. Trim and lowercase
/// 2. Force HTTPS
/// 3. Drop the query string and fragment (tracking suffixes live there)
/// 4. Remove the trailing slash for non-root paths
pub fn canonical_url(url: &str) -> String {
    let url = url.trim().to_lowercase();

    let end = url.find(['?', '#']).unwrap_or(url.len());
    let url = &url[..end];

    let (scheme, rest) = match url.find("://") {
        Some(pos) => (&url[..pos], &url[pos + 3..]),
        None => return url.trim_end_matches('/').to_string(),
    };
    let scheme = if scheme == "http" { "https" } else { scheme };

    let (host, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, "/"),
    };

    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    let path = if path.is_empty() { "/" } else { path };

    format!("{}://{}{}", scheme, host, path)
}

/// Content key: normalized title and company.
///
/// `None` when the company is a placeholder; such records match on URL only.
pub fn content_key(record: &JobRecord) -> Option<(String, String)> {
    if record.company == UNKNOWN || record.company == NOT_AVAILABLE {
        return None;
    }
    Some((normalize_text(&record.title), normalize_text(&record.company)))
}

/// Deduplication result statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DedupStats {
    pub total_input: usize,
    pub unique_output: usize,
    pub duplicates_removed: usize,
}

/// Deduplicate records, keeping the first one seen for each key
///
/// Two records are duplicates if they share a canonical URL or a content key.
pub fn dedupe(records: Vec<JobRecord>) -> Vec<JobRecord> {
    dedupe_with_stats(records).0
}

/// Deduplicate records and return statistics
pub fn dedupe_with_stats(records: Vec<JobRecord>) -> (Vec<JobRecord>, DedupStats) {
    let total_input = records.len();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_content: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        let url_key = canonical_url(&record.url);
        let content = content_key(&record);

        let known_content = content.as_ref().is_some_and(|key| seen_content.contains(key));
        if seen_urls.contains(&url_key) || known_content {
            tracing::debug!(
                title = %record.title,
                source = %record.source_name,
                url = %url_key,
                "dropping duplicate"
            );
            continue;
        }

        seen_urls.insert(url_key);
        if let Some(key) = content {
            seen_content.insert(key);
        }
        unique.push(record);
    }

    let stats = DedupStats {
        total_input,
        unique_output: unique.len(),
        duplicates_removed: total_input - unique.len(),
    };
    (unique, stats)
}
