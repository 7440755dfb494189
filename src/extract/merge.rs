//! Extraction merger
//!
//! Structured metadata is schema-validated by the source, so it outranks
//! positional selectors for every field both can provide.

use crate::extract::fallback::FallbackExtractor;
use crate::extract::normalize::{clean_optional, html_to_text, normalize_location};
use crate::extract::structured::extract_structured;
use crate::extract::{first_present, ExtractedFields, JobRecord};
use chrono::{DateTime, Utc};
use scraper::Html;

/// Resolves every field with structured data first, fallback second
///
/// `date_posted` and `valid_through` have no fallback source.
pub fn merge_fields(structured: ExtractedFields, fallback: ExtractedFields) -> ExtractedFields {
    ExtractedFields {
        title: first_present([structured.title, fallback.title]),
        company: first_present([structured.company, fallback.company]),
        location: first_present([structured.location, fallback.location]),
        salary: first_present([structured.salary, fallback.salary]),
        contract_type: first_present([structured.contract_type, fallback.contract_type]),
        description_html: first_present([structured.description_html, fallback.description_html]),
        date_posted: first_present([structured.date_posted]),
        valid_through: first_present([structured.valid_through]),
    }
}

/// Normalizes merged fields into a record
///
/// Returns `None` when the title is blank after cleanup; such postings are
/// never persisted.
pub fn build_record(
    merged: ExtractedFields,
    source: &str,
    url: &str,
    job_id: Option<String>,
    scraped_at: DateTime<Utc>,
) -> Option<JobRecord> {
    let title = clean_optional(merged.title)?;

    let description_html = merged
        .description_html
        .map(|html| html.trim().to_string())
        .filter(|html| !html.is_empty());
    let description_text = description_html
        .as_deref()
        .map(html_to_text)
        .unwrap_or_default();

    Some(JobRecord {
        source: source.to_string(),
        job_id,
        url: url.to_string(),
        title,
        company: clean_optional(merged.company),
        location: merged
            .location
            .as_deref()
            .map(normalize_location)
            .unwrap_or_default(),
        salary: clean_optional(merged.salary),
        contract_type: clean_optional(merged.contract_type),
        description_html,
        description_text,
        date_posted: clean_optional(merged.date_posted),
        valid_through: clean_optional(merged.valid_through),
        scraped_at,
    })
}

/// Runs both extractors over a detail page and builds the record
pub struct DetailExtractor {
    source: String,
    fallback: FallbackExtractor,
}

impl DetailExtractor {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fallback: FallbackExtractor::new(),
        }
    }

    /// Extracts a record from page markup
    ///
    /// # Arguments
    ///
    /// * `html` - The detail page body
    /// * `url` - The detail page URL
    /// * `job_id` - The posting identifier derived from the URL, if any
    ///
    /// # Returns
    ///
    /// * `Some(JobRecord)` - A record with a non-empty title
    /// * `None` - No title could be found
    pub fn extract(&self, html: &str, url: &str, job_id: Option<String>) -> Option<JobRecord> {
        let document = Html::parse_document(html);
        let structured = extract_structured(&document);
        let fallback = self.fallback.extract(&document);

        build_record(
            merge_fields(structured, fallback),
            &self.source,
            url,
            job_id,
            Utc::now(),
        )
    }
}
