//! Digest rendering. Pure functions of the ranked records and run date.

use chrono::NaiveDate;

use crate::types::TaggedJob;

pub const HOT_MARKER: &str = "[HOT]";

/// Rendered notification payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
    pub text: String,
    pub row_count: usize,
}

/// Render the digest with a location-neutral subject
pub fn render(ranked: &[TaggedJob], run_date: NaiveDate) -> Digest {
    render_for(ranked, run_date, "")
}

/// Render the digest; `location` prefixes the subject line when non-empty
pub fn render_for(ranked: &[TaggedJob], run_date: NaiveDate, location: &str) -> Digest {
    let date = run_date.format("%Y-%m-%d").to_string();
    let subject = match location.trim() {
        "" => format!("Tech Job Alerts ({})", date),
        loc => format!("{} Tech Job Alerts ({})", loc, date),
    };

    if ranked.is_empty() {
        let notice = format!("No new matching job postings since {}.", date);
        return Digest {
            subject,
            html: format!("<p>{}</p>", notice),
            text: notice,
            row_count: 0,
        };
    }

    let summary = format!("Here are the new job postings for {}:", date);

    Digest {
        subject,
        html: render_html(ranked, &summary),
        text: render_text(ranked, &summary),
        row_count: ranked.len(),
    }
}

fn render_html(ranked: &[TaggedJob], summary: &str) -> String {
    let mut rows = String::new();
    for job in ranked {
        let r = &job.record;
        let tag = if job.hot { format!("<b>{}</b>", HOT_MARKER) } else { String::new() };
        rows.push_str(&format!(
            "\n    <tr><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"{}\">Link</a></td><td>{}</td><td>{}</td></tr>",
            escape_html(&r.title),
            escape_html(&r.company),
            escape_html(&r.location),
            escape_html(&r.url),
            escape_html(r.posted_date.as_str()),
            tag,
        ));
    }

    format!(
        "<html><body>\n<p>{}</p>\n<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\n    \
         <tr><th>Title</th><th>Company</th><th>Location</th>\
         <th>URL</th><th>Date</th><th>Tags</th></tr>{}\n\
         </table>\n</body></html>\n",
        escape_html(summary),
        rows
    )
}

fn render_text(ranked: &[TaggedJob], summary: &str) -> String {
    let mut out = String::from(summary);
    for job in ranked {
        let r = &job.record;
        out.push_str(&format!(
            "\n- {}{} | {} | {} | {} | {}",
            if job.hot { "[HOT] " } else { "" },
            r.title,
            r.company,
            r.location,
            r.posted_date,
            r.url
        ));
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
