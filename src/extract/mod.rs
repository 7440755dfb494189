//! Extraction pipeline for job detail pages
//!
//! A detail page is read two ways: the structured extractor parses embedded
//! JSON-LD `JobPosting` metadata, and the fallback extractor applies ordered
//! CSS selector strategies to the visible markup. The merger resolves each
//! field with structured data first, then normalizes the result into a
//! [`JobRecord`].

mod fallback;
mod merge;
pub mod normalize;
mod structured;

pub use fallback::{Capture, FallbackExtractor, Strategy};
pub use merge::{build_record, merge_fields, DetailExtractor};
pub use normalize::{clean_text, html_to_text, normalize_location};
pub use structured::{extract_structured, render_salary};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partial record produced independently by each extractor
///
/// Every member is optional; an extractor fills what its source provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub contract_type: Option<String>,
    pub description_html: Option<String>,
    pub date_posted: Option<String>,
    pub valid_through: Option<String>,
}

impl ExtractedFields {
    /// Fills every missing member from `other`, keeping values already present
    pub fn fill_from(&mut self, other: ExtractedFields) {
        fn fill(slot: &mut Option<String>, candidate: Option<String>) {
            if slot.is_none() {
                *slot = candidate;
            }
        }

        fill(&mut self.title, other.title);
        fill(&mut self.company, other.company);
        fill(&mut self.location, other.location);
        fill(&mut self.salary, other.salary);
        fill(&mut self.contract_type, other.contract_type);
        fill(&mut self.description_html, other.description_html);
        fill(&mut self.date_posted, other.date_posted);
        fill(&mut self.valid_through, other.valid_through);
    }
}

/// A fully merged, normalized job posting
///
/// Serialized one JSON object per posting; field names and shapes are the
/// dataset format consumed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub source: String,
    pub job_id: Option<String>,
    pub url: String,
    pub title: String,
    pub company: Option<String>,
    pub location: String,
    pub salary: Option<String>,
    pub contract_type: Option<String>,
    pub description_html: Option<String>,
    pub description_text: String,
    pub date_posted: Option<String>,
    pub valid_through: Option<String>,
    #[serde(with = "iso_millis")]
    pub scraped_at: DateTime<Utc>,
}

/// Returns the first candidate holding a non-blank value
///
/// This is the single priority-resolution rule shared by the fallback
/// strategies and the merger.
pub fn first_present<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_first_present_skips_blank() {
        let value = first_present([None, Some("  ".to_string()), Some("Engineer".to_string())]);
        assert_eq!(value, Some("Engineer".to_string()));
    }

    #[test]
    fn test_first_present_all_missing() {
        assert_eq!(first_present([None, Some(String::new())]), None);
    }

    #[test]
    fn test_fill_from_keeps_existing() {
        let mut fields = ExtractedFields {
            title: Some("Structured".to_string()),
            ..Default::default()
        };
        fields.fill_from(ExtractedFields {
            title: Some("Other".to_string()),
            company: Some("Acme".to_string()),
            ..Default::default()
        });

        assert_eq!(fields.title.as_deref(), Some("Structured"));
        assert_eq!(fields.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_record_wire_format() {
        let record = JobRecord {
            source: "rozee.pk".to_string(),
            job_id: Some("42".to_string()),
            url: "https://www.rozee.pk/acme-jobs-42".to_string(),
            title: "Developer".to_string(),
            company: None,
            location: "Lahore".to_string(),
            salary: None,
            contract_type: None,
            description_html: None,
            description_text: String::new(),
            date_posted: None,
            valid_through: None,
            scraped_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["job_id"], "42");
        assert_eq!(json["scraped_at"], "2024-03-01T12:30:00.000Z");
        assert!(json["company"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 13);

        let back: JobRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
