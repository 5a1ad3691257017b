use std::sync::Arc;

use async_trait::async_trait;

use super::{fetch_and_parse, parse_cards, CardSelectors, HttpFetch, SourceAdapter};
use crate::types::FetchOutcome;

pub const NAUKRI_SEARCH_URL: &str = "https://www.naukri.com/lead-data-engineer-jobs-in-bangalore";
pub const NAUKRI_BASE_URL: &str = "https://www.naukri.com";

/// Both the classic `.jobTuple` layout and the newer srp wrapper
const SELECTORS: CardSelectors = CardSelectors {
    card: ".jobTuple, .srp-jobtuple-wrapper",
    link: "a.title",
    company: ".subTitle, .comp-name",
    location: ".loc, .locWdth",
    date: ".type br + span, .job-post-day",
    description: ".job-description, .job-desc",
};

pub struct NaukriAdapter {
    name: String,
    url: String,
    target_location: String,
    http: Arc<dyn HttpFetch>,
}

impl NaukriAdapter {
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
impl SourceAdapter for NaukriAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FetchOutcome {
        fetch_and_parse(&self.name, self.http.as_ref(), &self.url, |html| {
            parse_cards(html, NAUKRI_BASE_URL, &SELECTORS, &self.name, &self.target_location)
        })
        .await
    }
}
