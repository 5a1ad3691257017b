//! Location and title filters applied to aggregated records.

use crate::types::JobRecord;

/// Case-insensitive substring match. An empty target matches everything.
pub fn location_matches(location: &str, target: &str) -> bool {
    let target = target.trim().to_lowercase();
    target.is_empty() || location.to_lowercase().contains(&target)
}

/// True if `title` contains any non-blank keyword, or if there are none
pub fn title_matches(title: &str, keywords: &[String]) -> bool {
    let mut keywords = keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty()).peekable();
    if keywords.peek().is_none() {
        return true;
    }
    let title_lower = title.to_lowercase();
    keywords.any(|k| title_lower.contains(&k.to_lowercase()))
}

/// Keep records in `location` whose title carries one of `title_keywords`.
/// Order is preserved.
pub fn apply(records: Vec<JobRecord>, location: &str, title_keywords: &[String]) -> Vec<JobRecord> {
    records
        .into_iter()
        .filter(|r| {
            let keep = location_matches(&r.location, location)
                && title_matches(&r.title, title_keywords);
            if !keep {
                tracing::debug!(title = %r.title, location = %r.location, "filtered out");
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, location: &str) -> JobRecord {
        let url = format!("https://x.test/{}", title.len());
        JobRecord::new("test", title, Some("Acme"), Some(location), &url, None, None).unwrap()
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_location_and_title() {
        let records = vec![
            job("Lead Data Engineer", "Bangalore, India"),
            job("Data Analyst", "Bangalore"),
            job("Cloud ARCHITECT", "bangalore"),
            job("Tech Lead", "Mumbai"),
        ];

        let kept = apply(records, "Bangalore", &kw(&["lead", "architect"]));
        let titles: Vec<_> = kept.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Lead Data Engineer", "Cloud ARCHITECT"]);
    }

    #[test]
    fn test_no_keywords_keeps_all_in_location() {
        let records = vec![job("Data Analyst", "Bangalore"), job("Tech Lead", "Mumbai")];
        let kept = apply(records, "bangalore", &kw(&["", "  "]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Data Analyst");
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            job("Lead Data Engineer", "Bangalore"),
            job("Architect", "Pune"),
            job("Engineering Lead", "BANGALORE"),
        ];
        let keywords = kw(&["lead"]);
        let once = apply(records, "Bangalore", &keywords);
        let twice = apply(once.clone(), "Bangalore", &keywords);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
