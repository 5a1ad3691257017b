//! Integration tests for the job digest pipeline
//! Runs full pipelines over fake adapters and fixture listing pages

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use job_digest::aggregate::Aggregator;
use job_digest::config::{default_sources, RunProfile};
use job_digest::digest::{self, Digest, HOT_MARKER};
use job_digest::error::{NotificationError, PipelineError, SourceError};
use job_digest::notify::Notifier;
use job_digest::pipeline::Pipeline;
use job_digest::scrapers::{
    build_adapters, HttpFetch, NaukriAdapter, SourceAdapter, NAUKRI_SEARCH_URL,
};
use job_digest::types::{FetchOutcome, JobRecord, SourceStatus};

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn profile(hot: &[&str]) -> RunProfile {
    RunProfile {
        run_date: run_date(),
        target_location: "Bangalore".to_string(),
        title_keywords: vec!["lead".to_string(), "architect".to_string()],
        hot_keywords: hot.iter().map(|s| s.to_string()).collect(),
    }
}

fn aggregator() -> Aggregator {
    Aggregator::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
}

fn job(
    source: &str,
    title: &str,
    location: &str,
    url: &str,
    date: &str,
    description: Option<&str>,
) -> JobRecord {
    let company = Some("Acme Analytics");
    JobRecord::new(source, title, company, Some(location), url, Some(date), description).unwrap()
}

/// Adapter returning a fixed batch of records
struct Static {
    name: &'static str,
    records: Vec<JobRecord>,
}

#[async_trait]
impl SourceAdapter for Static {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self) -> FetchOutcome {
        FetchOutcome::ok(self.name, self.records.clone())
    }
}

/// Notifier that records every digest it is handed
#[derive(Clone, Default)]
struct Recording {
    sent: Arc<Mutex<Vec<Digest>>>,
}

impl Recording {
    fn sent(&self) -> Vec<Digest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Recording {
    fn channel(&self) -> &str {
        "recording"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(digest.clone());
        Ok(())
    }
}

struct Refusing;

#[async_trait]
impl Notifier for Refusing {
    fn channel(&self) -> &str {
        "refusing"
    }

    async fn send(&self, _digest: &Digest) -> Result<(), NotificationError> {
        Err(NotificationError::Smtp("connection refused".to_string()))
    }
}

/// Serves fixture pages by host; anything else is a network error
struct Fixtures;

#[async_trait]
impl HttpFetch for Fixtures {
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        if url.contains("naukri.com") {
            Ok(fixture("naukri.html"))
        } else if url.contains("iimjobs.com") {
            Ok(fixture("iimjobs.html"))
        } else {
            Err(SourceError::fetch(SourceStatus::NetworkError, format!("no fixture for {}", url)))
        }
    }
}

struct Offline;

#[async_trait]
impl HttpFetch for Offline {
    async fn get_text(&self, _url: &str) -> Result<String, SourceError> {
        Err(SourceError::fetch(SourceStatus::Timeout, "request timed out"))
    }
}

fn three_sources(description: Option<&str>) -> Vec<Arc<dyn SourceAdapter>> {
    let url = "https://www.naukri.com/job-listings-lead-data-engineer-acme-1";
    let tracked = format!("{}?src=email", url);
    vec![
        Arc::new(Static {
            name: "a",
            records: vec![job(
                "a",
                "Lead Data Engineer",
                "Bangalore, India",
                url,
                "2024-06-02",
                description,
            )],
        }),
        Arc::new(Static {
            name: "b",
            records: vec![job(
                "b",
                "Lead Engineer, Data",
                "Bangalore",
                &tracked,
                "2024-06-03",
                None,
            )],
        }),
        Arc::new(Static {
            name: "c",
            records: vec![job(
                "c",
                "Data Analyst",
                "Mumbai",
                "https://www.iimjobs.com/j/analyst-2",
                "2024-06-04",
                None,
            )],
        }),
    ]
}

#[tokio::test]
async fn test_duplicate_and_off_target_records_collapse_to_one_row() {
    let notifier = Recording::default();
    let pipeline = Pipeline::new(
        profile(&["hyper-growth"]),
        three_sources(Some("Join a hyper-growth team")),
        aggregator(),
        Box::new(notifier.clone()),
    );

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.after_filter, 2);
    assert_eq!(summary.after_dedup, 1);
    assert_eq!(summary.hot_count, 1);
    assert!(summary.sources.iter().all(|s| s.status == SourceStatus::Ok));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1, "digest must be delivered exactly once");
    let digest = &sent[0];
    assert_eq!(digest.row_count, 1);
    assert_eq!(digest.subject, "Bangalore Tech Job Alerts (2024-06-01)");
    assert!(digest.html.contains("Lead Data Engineer"));
    assert!(digest.html.contains(HOT_MARKER));
    assert!(!digest.html.contains("Data Analyst"));
}

#[tokio::test]
async fn test_record_without_hot_keyword_is_not_tagged() {
    let pipeline = Pipeline::new(
        profile(&["hyper-growth"]),
        three_sources(None),
        aggregator(),
        Box::new(Recording::default()),
    );

    let prepared = pipeline.prepare().await;

    assert_eq!(prepared.ranked.len(), 1);
    assert_eq!(prepared.ranked[0].record.source_name, "a");
    assert!(!prepared.ranked[0].hot);
    assert!(!prepared.digest.html.contains(HOT_MARKER));
}

#[tokio::test]
async fn test_fixture_pages_end_to_end() {
    let adapters = build_adapters(&default_sources(), "Bangalore", Arc::new(Fixtures));
    let notifier = Recording::default();
    let pipeline = Pipeline::new(
        profile(&["hyper-growth"]),
        adapters,
        aggregator(),
        Box::new(notifier.clone()),
    );

    let prepared = pipeline.prepare().await;

    let statuses: Vec<_> = prepared
        .summary
        .sources
        .iter()
        .map(|s| (s.source_name.as_str(), s.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("linkedin", SourceStatus::Disabled),
            ("naukri", SourceStatus::Ok),
            ("iimjobs", SourceStatus::Ok),
        ]
    );

    // naukri: 3 Bangalore cards with links, iimjobs: 2
    assert_eq!(prepared.summary.fetched, 5);
    // "Senior Data Analyst" fails the title filter
    assert_eq!(prepared.summary.after_filter, 4);
    // iimjobs repeats Acme's "Lead Data Engineer"
    assert_eq!(prepared.summary.after_dedup, 3);

    let titles: Vec<_> = prepared.ranked.iter().map(|j| j.record.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Azure Solutions Architect", "Lead Data Engineer", "Principal Cloud Architect"]
    );

    let lead = &prepared.ranked[1];
    assert_eq!(lead.record.source_name, "naukri");
    assert!(lead.hot);
    assert!(lead
        .record
        .url
        .starts_with("https://www.naukri.com/job-listings-lead-data-engineer-acme-analytics"));

    let azure = &prepared.ranked[0].record;
    assert_eq!(
        azure.url,
        "https://www.iimjobs.com/j/hooli-azure-solutions-architect-10-15-yrs-1400002.html?ref=cl_search"
    );
    assert_eq!(azure.company, "Hooli");

    let principal = &prepared.ranked[2].record;
    assert_eq!(principal.company, "Unknown");
    assert_eq!(principal.posted_date.as_str(), "2024-05-30");

    assert_eq!(prepared.digest.row_count, 3);
    assert_eq!(prepared.digest.html.matches(HOT_MARKER).count(), 1);
    assert!(notifier.sent().is_empty(), "prepare must not deliver");
}

#[tokio::test]
async fn test_failing_transport_yields_empty_outcome() {
    let url = NAUKRI_SEARCH_URL.to_string();
    let adapter = NaukriAdapter::new("naukri", url, "Bangalore", Arc::new(Offline));

    let outcome = adapter.fetch().await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.status, SourceStatus::Timeout);
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn test_all_sources_down_still_sends_empty_digest() {
    let adapters = build_adapters(&default_sources(), "Bangalore", Arc::new(Offline));
    let notifier = Recording::default();
    let pipeline = Pipeline::new(profile(&[]), adapters, aggregator(), Box::new(notifier.clone()));

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.fetched, 0);
    assert!(summary.sources.iter().any(|s| s.status == SourceStatus::Timeout));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].row_count, 0);
    assert!(sent[0].text.contains("2024-06-01"));
}

#[tokio::test]
async fn test_notifier_failure_fails_the_run() {
    let pipeline =
        Pipeline::new(profile(&[]), three_sources(None), aggregator(), Box::new(Refusing));

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::Notification(NotificationError::Smtp(_))));
}

#[test]
fn test_empty_digest_mentions_run_date() {
    let digest = digest::render(&[], run_date());

    assert_eq!(digest.row_count, 0);
    assert!(digest.text.contains("2024-06-01"));
    assert!(!digest.html.contains("<td>"));
}
