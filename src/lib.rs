//! Job Digest Library
//!
//! Fetches postings from a fixed set of listing sites, filters, dedupes and
//! ranks them, and renders a single digest per run.

pub mod aggregate;
pub mod config;
pub mod digest;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod scrapers;
pub mod sorter;
pub mod types;

pub use types::*;
