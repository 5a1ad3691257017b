use async_trait::async_trait;

use super::SourceAdapter;
use crate::types::FetchOutcome;

/// LinkedIn has no scrapeable public listing page; live retrieval needs the
/// official API. Always returns an empty, disabled outcome.
pub struct LinkedInAdapter {
    name: String,
}

impl LinkedInAdapter {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

#[async_trait]
impl SourceAdapter for LinkedInAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FetchOutcome {
        tracing::info!(source = %self.name, "fetching jobs (placeholder, no live retrieval)");
        FetchOutcome::disabled(&self.name)
    }
}
