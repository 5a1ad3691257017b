//! HOT tagging and newest-first ordering.

use crate::types::{JobRecord, TaggedJob};

/// HOT if any non-blank keyword is a case-insensitive substring of the
/// description text
pub fn is_hot(record: &JobRecord, hot_keywords: &[String]) -> bool {
    let description = record.description_text.to_lowercase();
    hot_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && description.contains(&k))
}

/// Tag every record, then sort by posted date, newest first.
///
/// The sort is stable, so records with the same date keep their input order.
pub fn tag_and_sort(records: Vec<JobRecord>, hot_keywords: &[String]) -> Vec<TaggedJob> {
    let mut tagged: Vec<TaggedJob> = records
        .into_iter()
        .map(|record| {
            let hot = is_hot(&record, hot_keywords);
            TaggedJob { record, hot }
        })
        .collect();

    // Primary: posted date (descending); ties keep input order
    tagged.sort_by(|a, b| b.record.posted_date.cmp(&a.record.posted_date));
    tagged
}

pub fn hot_count(jobs: &[TaggedJob]) -> usize {
    jobs.iter().filter(|j| j.hot).count()
}
