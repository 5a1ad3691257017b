//! One run: aggregate → filter → dedupe → tag/sort → render → notify.

use std::sync::Arc;

use crate::aggregate::Aggregator;
use crate::config::RunProfile;
use crate::digest::{self, Digest};
use crate::error::PipelineError;
use crate::notify::Notifier;
use crate::scrapers::SourceAdapter;
use crate::types::{RunSummary, TaggedJob};
use crate::{filter, normalize, sorter};

pub struct Pipeline {
    profile: RunProfile,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    aggregator: Aggregator,
    notifier: Box<dyn Notifier>,
}

/// Result of the stages before delivery
pub struct Prepared {
    pub ranked: Vec<TaggedJob>,
    pub digest: Digest,
    pub summary: RunSummary,
}

impl Pipeline {
    pub fn new(
        profile: RunProfile,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        aggregator: Aggregator,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            profile,
            adapters,
            aggregator,
            notifier,
        }
    }

    /// Everything up to and including rendering. No delivery.
    pub async fn prepare(&self) -> Prepared {
        let profile = &self.profile;
        let (records, sources) = self.aggregator.run_all(&self.adapters).await;
        let fetched = records.len();

        let filtered = filter::apply(records, &profile.target_location, &profile.title_keywords);
        let after_filter = filtered.len();

        let (unique, stats) = normalize::dedupe_with_stats(filtered);
        if stats.duplicates_removed > 0 {
            tracing::info!(removed = stats.duplicates_removed, "removed duplicate postings");
        }

        let ranked = sorter::tag_and_sort(unique, &profile.hot_keywords);
        let hot_count = sorter::hot_count(&ranked);
        let digest = digest::render_for(&ranked, profile.run_date, &profile.target_location);

        let summary = RunSummary {
            run_date: profile.run_date_string(),
            fetched,
            after_filter,
            after_dedup: stats.unique_output,
            hot_count,
            sources,
        };

        Prepared { ranked, digest, summary }
    }

    /// Run the whole pipeline and deliver the digest exactly once
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        tracing::info!(
            run_date = %self.profile.run_date_string(),
            adapters = self.adapters.len(),
            "starting job digest run"
        );

        let Prepared { digest, summary, .. } = self.prepare().await;

        if digest.row_count == 0 {
            tracing::info!("no new jobs found");
        } else {
            tracing::info!(
                fetched = summary.fetched,
                matched = summary.after_filter,
                unique = summary.after_dedup,
                hot = summary.hot_count,
                "found jobs"
            );
        }

        self.notifier.send(&digest).await?;

        tracing::info!(rows = digest.row_count, "job digest run completed");
        Ok(summary)
    }
}
