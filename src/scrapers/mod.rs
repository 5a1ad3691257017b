mod cards;
mod iimjobs;
mod linkedin;
mod naukri;

pub use cards::{parse_cards, CardSelectors};
pub use iimjobs::{IimJobsAdapter, IIMJOBS_BASE_URL, IIMJOBS_SEARCH_URL};
pub use linkedin::LinkedInAdapter;
pub use naukri::{NaukriAdapter, NAUKRI_BASE_URL, NAUKRI_SEARCH_URL};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{HttpSettings, SourceConfig};
use crate::error::SourceError;
use crate::types::{FetchOutcome, JobRecord};

/// Values accepted in a source's `scraper` field
pub const SUPPORTED_SCRAPERS: &[&str] = &["linkedin", "naukri", "iimjobs"];

/// One external listing source.
///
/// `fetch` has no error path: whatever goes wrong inside an adapter ends up in
/// the returned outcome's status.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> FetchOutcome;
}

/// Read-only page transport used by adapters
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Default transport: a shared reqwest client with a browser-like user agent
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}

/// Fetch one page and run `parse` over it, folding every failure into the
/// outcome
pub(crate) async fn fetch_and_parse<F>(
    name: &str,
    http: &dyn HttpFetch,
    url: &str,
    parse: F,
) -> FetchOutcome
where
    F: FnOnce(&str) -> Result<Vec<JobRecord>, SourceError>,
{
    tracing::info!(source = name, url, "fetching jobs");

    let body = match http.get_text(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(source = name, error = %e, "failed to fetch");
            return FetchOutcome::from_error(name, &e);
        }
    };

    match parse(&body) {
        Ok(records) => FetchOutcome::ok(name, records),
        Err(e) => {
            tracing::error!(source = name, error = %e, "failed to parse");
            FetchOutcome::from_error(name, &e)
        }
    }
}

/// Build adapters for the enabled sources, keeping their order
pub fn build_adapters(
    sources: &[SourceConfig],
    target_location: &str,
    http: Arc<dyn HttpFetch>,
) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    for source in sources.iter().filter(|s| s.enabled) {
        match source.scraper.as_str() {
            "linkedin" => adapters.push(Arc::new(LinkedInAdapter::new(&source.name))),
            "naukri" => {
                let url = source.url.clone().unwrap_or_else(|| NAUKRI_SEARCH_URL.to_string());
                let adapter = NaukriAdapter::new(&source.name, url, target_location, http.clone());
                adapters.push(Arc::new(adapter));
            }
            "iimjobs" => {
                let url = source.url.clone().unwrap_or_else(|| IIMJOBS_SEARCH_URL.to_string());
                let adapter = IimJobsAdapter::new(&source.name, url, target_location, http.clone());
                adapters.push(Arc::new(adapter));
            }
            other => {
                tracing::warn!(
                    source = %source.name,
                    scraper = other,
                    "unknown scraper type, skipping"
                );
            }
        }
    }

    adapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sources;

    struct NoNetwork;

    #[async_trait]
    impl HttpFetch for NoNetwork {
        async fn get_text(&self, _url: &str) -> Result<String, SourceError> {
            Err(SourceError::fetch(crate::types::SourceStatus::NetworkError, "offline"))
        }
    }

    #[test]
    fn test_build_adapters_keeps_order_and_skips() {
        let mut sources = default_sources();
        sources.push(SourceConfig {
            name: "monster".to_string(),
            scraper: "monster".to_string(),
            url: None,
            enabled: true,
        });
        sources[2].enabled = false;

        let adapters = build_adapters(&sources, "Bangalore", Arc::new(NoNetwork));
        let names: Vec<_> = adapters.iter().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["linkedin", "naukri"]);
    }
}
