//! Card extraction shared by the HTML adapters.
//!
//! A listing page is a sequence of card elements. Each card yields one
//! record: the link supplies title and URL, the remaining fields are looked up
//! with optional selectors.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::SourceError;
use crate::filter::location_matches;
use crate::types::JobRecord;

/// Selector set for one source's card layout. Each field may be a selector
/// group (`"a, b"`); the first match inside the card wins.
#[derive(Debug, Clone, Copy)]
pub struct CardSelectors {
    pub card: &'static str,
    pub link: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub date: &'static str,
    pub description: &'static str,
}

struct Compiled {
    card: Selector,
    link: Selector,
    company: Selector,
    location: Selector,
    date: Selector,
    description: Selector,
}

impl CardSelectors {
    fn compile(&self) -> Result<Compiled, SourceError> {
        Ok(Compiled {
            card: compile(self.card)?,
            link: compile(self.link)?,
            company: compile(self.company)?,
            location: compile(self.location)?,
            date: compile(self.date)?,
            description: compile(self.description)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, SourceError> {
    Selector::parse(selector)
        .map_err(|e| SourceError::Parse(format!("bad selector {:?}: {:?}", selector, e)))
}

/// Parse every card on the page into records located in `target_location`.
///
/// Cards missing a title or link are skipped. A page with no cards at all is
/// reported as a parse error, since that usually means the markup changed.
pub fn parse_cards(
    html: &str,
    base_url: &str,
    selectors: &CardSelectors,
    source_name: &str,
    target_location: &str,
) -> Result<Vec<JobRecord>, SourceError> {
    let sel = selectors.compile()?;
    let base = Url::parse(base_url)
        .map_err(|e| SourceError::Parse(format!("bad base url {}: {}", base_url, e)))?;
    let document = Html::parse_document(html);

    let mut records = Vec::new();
    let mut cards_seen = 0usize;
    let mut skipped = 0usize;

    for card in document.select(&sel.card) {
        cards_seen += 1;
        match parse_card(&card, &sel, &base, source_name) {
            Ok(record) if location_matches(&record.location, target_location) => {
                records.push(record)
            }
            Ok(record) => {
                tracing::trace!(
                    source = source_name,
                    location = %record.location,
                    "card outside target location"
                );
            }
            Err(e) => {
                skipped += 1;
                tracing::debug!(source = source_name, error = %e, "skipping card");
            }
        }
    }

    if cards_seen == 0 {
        return Err(SourceError::Parse(format!("no elements matched {:?}", selectors.card)));
    }

    tracing::debug!(
        source = source_name,
        cards = cards_seen,
        skipped,
        kept = records.len(),
        "parsed listing page"
    );
    Ok(records)
}

fn parse_card(
    card: &ElementRef,
    sel: &Compiled,
    base: &Url,
    source_name: &str,
) -> Result<JobRecord, SourceError> {
    let link = card.select(&sel.link).next().ok_or(SourceError::MissingField("link"))?;
    let title = element_text(&link);
    let href = link
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SourceError::MissingField("url"))?;
    let url = base
        .join(href)
        .map_err(|e| SourceError::Parse(format!("bad link {}: {}", href, e)))?;

    let company = first_text(card, &sel.company);
    let location = first_text(card, &sel.location);
    let date = first_text(card, &sel.date);
    let description = first_text(card, &sel.description);

    JobRecord::new(
        source_name,
        &title,
        company.as_deref(),
        location.as_deref(),
        url.as_str(),
        date.as_deref(),
        description.as_deref(),
    )
}

fn first_text(card: &ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTORS: CardSelectors = CardSelectors {
        card: "li.job",
        link: "a",
        company: ".company",
        location: ".where",
        date: ".when",
        description: ".blurb",
    };

    #[test]
    fn test_parse_cards_resolves_and_filters() {
        let html = r#"
            <ul>
              <li class="job"><a href="/jobs/1">Lead  Engineer</a><span class="company">Acme</span>
                  <span class="where">Bangalore</span><span class="when">2024-06-02</span></li>
              <li class="job"><a href="https://other.test/2">Architect</a>
                  <span class="where">Chennai</span></li>
              <li class="job"><span class="where">Bangalore</span></li>
              <li class="job"><a href="/jobs/4">Principal Architect</a>
                  <span class="where">BANGALORE, India</span>
                  <p class="blurb">Scaling fast</p></li>
            </ul>"#;

        let records =
            parse_cards(html, "https://jobs.test", &SELECTORS, "test", "bangalore").unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "Lead Engineer");
        assert_eq!(records[0].url, "https://jobs.test/jobs/1");
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].posted_date.as_str(), "2024-06-02");

        assert_eq!(records[1].company, "Unknown");
        assert_eq!(records[1].posted_date.as_str(), "N/A");
        assert_eq!(records[1].description_text, "principal architect scaling fast");
    }

    #[test]
    fn test_parse_cards_no_cards_is_parse_error() {
        let html = "<html><body><p>Access denied</p></body></html>";
        let err = parse_cards(html, "https://jobs.test", &SELECTORS, "test", "bangalore")
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
