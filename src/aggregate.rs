//! Fan-out over all adapters.
//!
//! Every adapter runs in its own task. Results are merged in adapter-list
//! order no matter which task finishes first; dedup relies on that order to
//! pick the surviving record.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::AggregatorSettings;
use crate::scrapers::SourceAdapter;
use crate::types::{FetchOutcome, JobRecord, SourceReport, SourceStatus};

pub struct Aggregator {
    adapter_timeout: Duration,
    run_timeout: Duration,
}

impl Aggregator {
    pub fn new(settings: &AggregatorSettings) -> Self {
        Self::with_timeouts(
            Duration::from_secs(settings.adapter_timeout_secs),
            Duration::from_secs(settings.run_timeout_secs),
        )
    }

    pub fn with_timeouts(adapter_timeout: Duration, run_timeout: Duration) -> Self {
        Self {
            adapter_timeout,
            run_timeout,
        }
    }

    /// Run every adapter and concatenate their records.
    ///
    /// A failing, panicking or slow adapter contributes zero records and a
    /// report entry; it never stops the others.
    pub async fn run_all(
        &self,
        adapters: &[Arc<dyn SourceAdapter>],
    ) -> (Vec<JobRecord>, Vec<SourceReport>) {
        // Out-of-range timeouts mean no run deadline
        let deadline = Instant::now().checked_add(self.run_timeout);
        let adapter_timeout = self.adapter_timeout;

        let handles: Vec<_> = adapters
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let name = adapter.name().to_string();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(adapter_timeout, adapter.fetch()).await {
                        Ok(outcome) => outcome,
                        Err(_) => FetchOutcome::failed(
                            adapter.name(),
                            SourceStatus::Timeout,
                            format!("no result within {}s", adapter_timeout.as_secs_f32()),
                        ),
                    }
                });
                (name, handle)
            })
            .collect();

        let mut records = Vec::new();
        let mut reports = Vec::with_capacity(handles.len());

        for (name, mut handle) in handles {
            let joined = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, &mut handle).await,
                None => Ok((&mut handle).await),
            };
            let outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    let status = if e.is_panic() {
                        SourceStatus::Panicked
                    } else {
                        SourceStatus::Unknown
                    };
                    tracing::error!(source = %name, error = %e, "adapter task failed");
                    FetchOutcome::failed(&name, status, e.to_string())
                }
                Err(_) => {
                    handle.abort();
                    FetchOutcome::failed(&name, SourceStatus::Timeout, "run deadline reached")
                }
            };

            let report = SourceReport {
                source_name: name,
                status: outcome.status,
                record_count: outcome.records.len(),
                error: outcome.error,
            };
            if report.status.is_healthy() {
                tracing::info!(
                    source = %report.source_name,
                    count = report.record_count,
                    status = %report.status,
                    "jobs found"
                );
            } else {
                tracing::warn!(
                    source = %report.source_name,
                    count = report.record_count,
                    status = %report.status,
                    error = report.error.as_deref().unwrap_or(""),
                    "jobs found"
                );
            }

            records.extend(outcome.records);
            reports.push(report);
        }

        (records, reports)
    }
}
