//! Structured extractor for embedded JSON-LD `JobPosting` metadata

use crate::extract::{first_present, ExtractedFields};
use scraper::{Html, Selector};
use serde_json::Value;

const JOB_POSTING_TYPE: &str = "JobPosting";

/// Extracts job fields from every JSON-LD block on the page
///
/// Blocks that fail to parse are skipped. Blocks may hold a single object, an
/// array, or an `@graph` container; every object typed `JobPosting`
/// contributes, and for each field the first posting that provides a value
/// wins.
pub fn extract_structured(document: &Html) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return fields;
    };

    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                continue;
            }
        };

        let mut postings = Vec::new();
        collect_postings(&value, &mut postings);

        for posting in postings {
            fields.fill_from(fields_from_posting(posting));
        }
    }

    fields
}

/// Walks arrays and `@graph` containers collecting `JobPosting` objects
fn collect_postings<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_postings(item, out);
            }
        }
        Value::Object(map) => {
            if is_job_posting(value) {
                out.push(value);
            }
            if let Some(graph) = map.get("@graph") {
                collect_postings(graph, out);
            }
        }
        _ => {}
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == JOB_POSTING_TYPE,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(JOB_POSTING_TYPE)),
        _ => false,
    }
}

fn fields_from_posting(posting: &Value) -> ExtractedFields {
    ExtractedFields {
        title: scalar_text(posting.get("title")),
        company: posting.get("hiringOrganization").and_then(named_text),
        location: posting.get("jobLocation").and_then(location_text),
        salary: posting.get("baseSalary").and_then(render_salary),
        contract_type: posting.get("employmentType").and_then(list_text),
        description_html: scalar_text(posting.get("description")),
        date_posted: scalar_text(posting.get("datePosted")),
        valid_through: scalar_text(posting.get("validThrough")),
    }
}

/// Renders a `baseSalary` value as display text
///
/// A `value` object with both bounds renders as `"<currency> <min>–<max>"`;
/// with a single amount or bound, that amount is rendered after the currency.
/// Scalar values render as-is.
///
/// # Examples
///
/// ```
/// use rozee_jobs::extract::render_salary;
/// use serde_json::json;
///
/// let salary = json!({"value": {"minValue": 50000, "maxValue": 80000, "currency": "PKR"}});
/// assert_eq!(render_salary(&salary).as_deref(), Some("PKR 50000–80000"));
/// ```
pub fn render_salary(base_salary: &Value) -> Option<String> {
    let Some(value) = base_salary.get("value") else {
        return scalar_text(Some(base_salary));
    };

    if !value.is_object() {
        return scalar_text(Some(value));
    }

    let currency = first_present([
        scalar_text(value.get("currency")),
        scalar_text(base_salary.get("currency")),
    ]);

    let min = scalar_text(value.get("minValue"));
    let max = scalar_text(value.get("maxValue"));
    let amount = match (min, max) {
        (Some(min), Some(max)) => Some(format!("{}–{}", min, max)),
        (min, max) => first_present([scalar_text(value.get("value")), min, max]),
    };

    let rendered = [currency, amount]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    first_present([Some(rendered)])
}

/// Text of a string or number, trimmed; `None` when blank or another type
fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        _ => return None,
    };
    first_present([Some(text)])
}

/// A string, or the `name` of an object
fn named_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => scalar_text(value.get("name")),
        other => scalar_text(Some(other)),
    }
}

/// A string, or the entries of an array joined with ", "
fn list_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(|i| scalar_text(Some(i))).collect();
            first_present([Some(parts.join(", "))])
        }
        other => scalar_text(Some(other)),
    }
}

/// Locality, region and country of the first `jobLocation`
fn location_text(value: &Value) -> Option<String> {
    let place = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    let address = place.get("address")?;
    if !address.is_object() {
        return scalar_text(Some(address));
    }

    let parts: Vec<String> = ["addressLocality", "addressRegion", "addressCountry"]
        .iter()
        .filter_map(|key| address.get(*key).and_then(named_text))
        .collect();
    first_present([Some(parts.join(", "))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_blocks(blocks: &[&str]) -> Html {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        Html::parse_document(&format!("<html><head>{}</head><body></body></html>", scripts))
    }

    #[test]
    fn test_full_posting() {
        let block = r#"{
            "@context": "https://schema.org",
            "@type": "JobPosting",
            "title": "Senior Rust Developer",
            "hiringOrganization": {"@type": "Organization", "name": "Acme Pvt Ltd"},
            "jobLocation": {"@type": "Place", "address": {
                "addressLocality": "Lahore", "addressRegion": "Punjab", "addressCountry": "Pakistan"
            }},
            "baseSalary": {"@type": "MonetaryAmount", "value": {
                "minValue": 50000, "maxValue": 80000, "currency": "PKR"
            }},
            "employmentType": "FULL_TIME",
            "description": "<p>Build things</p>",
            "datePosted": "2024-03-01",
            "validThrough": "2024-04-01"
        }"#;

        let fields = extract_structured(&page_with_blocks(&[block]));

        assert_eq!(fields.title.as_deref(), Some("Senior Rust Developer"));
        assert_eq!(fields.company.as_deref(), Some("Acme Pvt Ltd"));
        assert_eq!(fields.location.as_deref(), Some("Lahore, Punjab, Pakistan"));
        assert_eq!(fields.salary.as_deref(), Some("PKR 50000–80000"));
        assert_eq!(fields.contract_type.as_deref(), Some("FULL_TIME"));
        assert_eq!(fields.description_html.as_deref(), Some("<p>Build things</p>"));
        assert_eq!(fields.date_posted.as_deref(), Some("2024-03-01"));
        assert_eq!(fields.valid_through.as_deref(), Some("2024-04-01"));
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let broken = r#"{"@type": "JobPosting", "title": "#;
        let good = r#"{"@type": "JobPosting", "title": "QA Engineer"}"#;

        let fields = extract_structured(&page_with_blocks(&[broken, good]));
        assert_eq!(fields.title.as_deref(), Some("QA Engineer"));
    }

    #[test]
    fn test_non_posting_blocks_ignored() {
        let org = r#"{"@type": "Organization", "name": "Rozee", "title": "Not a job"}"#;
        let fields = extract_structured(&page_with_blocks(&[org]));
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_first_non_null_wins_across_blocks() {
        let first = r#"{"@type": "JobPosting", "title": "Data Analyst"}"#;
        let second = r#"{"@type": "JobPosting", "title": "Ignored", "hiringOrganization": "Beta Co"}"#;

        let fields = extract_structured(&page_with_blocks(&[first, second]));
        assert_eq!(fields.title.as_deref(), Some("Data Analyst"));
        assert_eq!(fields.company.as_deref(), Some("Beta Co"));
    }

    #[test]
    fn test_graph_and_type_array() {
        let block = r#"{"@context": "https://schema.org", "@graph": [
            {"@type": "WebPage", "name": "Listing"},
            {"@type": ["JobPosting", "Thing"], "title": "DevOps Engineer",
             "employmentType": ["FULL_TIME", "CONTRACTOR"]}
        ]}"#;

        let fields = extract_structured(&page_with_blocks(&[block]));
        assert_eq!(fields.title.as_deref(), Some("DevOps Engineer"));
        assert_eq!(fields.contract_type.as_deref(), Some("FULL_TIME, CONTRACTOR"));
    }

    #[test]
    fn test_top_level_array_and_location_array() {
        let block = r#"[{"@type": "JobPosting", "title": "Accountant",
            "jobLocation": [
                {"address": {"addressLocality": "Karachi", "addressCountry": {"@type": "Country", "name": "PK"}}},
                {"address": {"addressLocality": "Lahore"}}
            ]}]"#;

        let fields = extract_structured(&page_with_blocks(&[block]));
        assert_eq!(fields.location.as_deref(), Some("Karachi, PK"));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let block = r#"{"@type": "JobPosting", "title": "   ", "description": ""}"#;
        let fields = extract_structured(&page_with_blocks(&[block]));
        assert_eq!(fields.title, None);
        assert_eq!(fields.description_html, None);
    }

    #[test]
    fn test_salary_single_bound() {
        let salary = json!({"value": {"minValue": 40000, "currency": "PKR"}});
        assert_eq!(render_salary(&salary).as_deref(), Some("PKR 40000"));

        let salary = json!({"value": {"maxValue": 90000.0}});
        assert_eq!(render_salary(&salary).as_deref(), Some("90000"));
    }

    #[test]
    fn test_salary_value_amount_and_outer_currency() {
        let salary = json!({"currency": "USD", "value": {"value": 1200.5}});
        assert_eq!(render_salary(&salary).as_deref(), Some("USD 1200.5"));
    }

    #[test]
    fn test_salary_scalar() {
        let salary = json!({"value": "  Negotiable "});
        assert_eq!(render_salary(&salary).as_deref(), Some("Negotiable"));

        assert_eq!(render_salary(&json!(" 75,000 PKR ")).as_deref(), Some("75,000 PKR"));
        assert_eq!(render_salary(&json!({"value": {}})), None);
    }
}
