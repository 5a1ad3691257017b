use std::sync::Arc;

use async_trait::async_trait;

use super::{fetch_and_parse, parse_cards, CardSelectors, HttpFetch, SourceAdapter};
use crate::types::FetchOutcome;

pub const IIMJOBS_SEARCH_URL: &str =
    "https://www.iimjobs.com/search/data-engineer-azure-cloud-architect-bangalore";
pub const IIMJOBS_BASE_URL: &str = "https://www.iimjobs.com";

const SELECTORS: CardSelectors = CardSelectors {
    card: "div.job-tuple",
    link: "a",
    company: ".job-comp-name",
    location: ".job-location",
    date: ".job-post-date",
    description: ".job-description",
};

pub struct IimJobsAdapter {
    name: String,
    url: String,
    target_location: String,
    http: Arc<dyn HttpFetch>,
}

impl IimJobsAdapter {
    pub fn new(name: &str, url: String, target_location: &str, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            name: name.to_string(),
            url,
            target_location: target_location.to_string(),
            http,
        }
    }
}

#[async_trait]
impl SourceAdapter for IimJobsAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FetchOutcome {
        fetch_and_parse(&self.name, self.http.as_ref(), &self.url, |html| {
            parse_cards(html, IIMJOBS_BASE_URL, &SELECTORS, &self.name, &self.target_location)
        })
        .await
    }
}
