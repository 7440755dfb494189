//! Fallback extractor built on conventional markup selectors

use crate::extract::normalize::clean_text;
use crate::extract::{first_present, ExtractedFields};
use scraper::{ElementRef, Html, Selector};

/// What a matched element contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Whitespace-collapsed text content
    Text,
    /// Raw inner markup
    InnerHtml,
}

/// One selector candidate for a field
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub selector: &'static str,
    pub capture: Capture,
}

impl Strategy {
    pub const fn text(selector: &'static str) -> Self {
        Self {
            selector,
            capture: Capture::Text,
        }
    }

    pub const fn inner_html(selector: &'static str) -> Self {
        Self {
            selector,
            capture: Capture::InnerHtml,
        }
    }
}

const TITLE: &[Strategy] = &[
    Strategy::text("h1"),
    Strategy::text("h2"),
    Strategy::text(".job-title"),
];

const COMPANY: &[Strategy] = &[
    Strategy::text(".company-name"),
    Strategy::text(".cp-name"),
    Strategy::text(r#"[itemprop="hiringOrganization"]"#),
];

const LOCATION: &[Strategy] = &[
    Strategy::text(".location"),
    Strategy::text(".job-location"),
    Strategy::text(r#"[itemprop="jobLocation"]"#),
];

const SALARY: &[Strategy] = &[Strategy::text(".salary"), Strategy::text(".job-salary")];

const CONTRACT_TYPE: &[Strategy] = &[
    Strategy::text(".job-type"),
    Strategy::text(".employment-type"),
];

const DESCRIPTION: &[Strategy] = &[
    Strategy::inner_html(".job-description"),
    Strategy::inner_html("#job-description"),
    Strategy::inner_html(r#"[itemprop="description"]"#),
];

/// Ordered, pre-compiled selector strategies for one field
struct FieldRule {
    candidates: Vec<(Selector, Capture)>,
}

impl FieldRule {
    fn compile(strategies: &[Strategy]) -> Self {
        let candidates = strategies
            .iter()
            .filter_map(|s| match Selector::parse(s.selector) {
                Ok(selector) => Some((selector, s.capture)),
                Err(e) => {
                    tracing::warn!("Ignoring invalid selector {:?}: {:?}", s.selector, e);
                    None
                }
            })
            .collect();
        Self { candidates }
    }

    /// First selector whose first non-blank match yields a value
    fn resolve(&self, document: &Html) -> Option<String> {
        first_present(self.candidates.iter().map(|(selector, capture)| {
            document
                .select(selector)
                .find_map(|element| capture_value(element, *capture))
        }))
    }
}

fn capture_value(element: ElementRef<'_>, capture: Capture) -> Option<String> {
    let value = match capture {
        Capture::Text => clean_text(&element.text().collect::<Vec<_>>().join(" ")),
        Capture::InnerHtml => element.inner_html().trim().to_string(),
    };
    first_present([Some(value)])
}

/// Extracts job fields from conventional page layout
///
/// Heading text supplies the title, class-based selectors the company,
/// location, salary and contract type, and a content container the
/// description markup. Posting dates have no markup source.
pub struct FallbackExtractor {
    title: FieldRule,
    company: FieldRule,
    location: FieldRule,
    salary: FieldRule,
    contract_type: FieldRule,
    description_html: FieldRule,
}

impl FallbackExtractor {
    pub fn new() -> Self {
        Self {
            title: FieldRule::compile(TITLE),
            company: FieldRule::compile(COMPANY),
            location: FieldRule::compile(LOCATION),
            salary: FieldRule::compile(SALARY),
            contract_type: FieldRule::compile(CONTRACT_TYPE),
            description_html: FieldRule::compile(DESCRIPTION),
        }
    }

    pub fn extract(&self, document: &Html) -> ExtractedFields {
        ExtractedFields {
            title: self.title.resolve(document),
            company: self.company.resolve(document),
            location: self.location.resolve(document),
            salary: self.salary.resolve(document),
            contract_type: self.contract_type.resolve(document),
            description_html: self.description_html.resolve(document),
            date_posted: None,
            valid_through: None,
        }
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(body: &str) -> ExtractedFields {
        let document = Html::parse_document(&format!("<html><body>{}</body></html>", body));
        FallbackExtractor::new().extract(&document)
    }

    #[test]
    fn test_conventional_layout() {
        let fields = extract(
            r#"
            <h1> Backend   Engineer </h1>
            <div class="company-name">Acme <span>Pvt</span> Ltd</div>
            <span class="location">Lahore, Punjab</span>
            <span class="salary">PKR 100,000</span>
            <span class="job-type">Full Time</span>
            <div class="job-description"><p>Write services</p></div>
            "#,
        );

        assert_eq!(fields.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(fields.company.as_deref(), Some("Acme Pvt Ltd"));
        assert_eq!(fields.location.as_deref(), Some("Lahore, Punjab"));
        assert_eq!(fields.salary.as_deref(), Some("PKR 100,000"));
        assert_eq!(fields.contract_type.as_deref(), Some("Full Time"));
        assert_eq!(fields.description_html.as_deref(), Some("<p>Write services</p>"));
        assert_eq!(fields.date_posted, None);
    }

    #[test]
    fn test_later_candidates_used_when_earlier_missing() {
        let fields = extract(
            r#"
            <h2>Support Agent</h2>
            <div class="cp-name">Beta Co</div>
            <div itemprop="jobLocation">Karachi</div>
            <span class="job-salary">Negotiable</span>
            <span class="employment-type">Contract</span>
            <section id="job-description">Answer calls</section>
            "#,
        );

        assert_eq!(fields.title.as_deref(), Some("Support Agent"));
        assert_eq!(fields.company.as_deref(), Some("Beta Co"));
        assert_eq!(fields.location.as_deref(), Some("Karachi"));
        assert_eq!(fields.salary.as_deref(), Some("Negotiable"));
        assert_eq!(fields.contract_type.as_deref(), Some("Contract"));
        assert_eq!(fields.description_html.as_deref(), Some("Answer calls"));
    }

    #[test]
    fn test_blank_match_falls_through() {
        let fields = extract(r#"<h1>   </h1><h2>Real Title</h2>"#);
        assert_eq!(fields.title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(extract(""), ExtractedFields::default());
    }
}
