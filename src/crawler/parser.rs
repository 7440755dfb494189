//! HTML parser for search-result (list) pages
//!
//! This module handles parsing a list page to extract:
//! - Links to posting detail pages
//! - The link to the next result page, when the page declares one
//! - The visible text used for block detection

use crate::url::{is_job_url, resolve_link};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from a list page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Posting links in document order, without duplicates (absolute URLs)
    pub job_urls: Vec<Url>,

    /// Target of a `rel="next"` link, if any
    pub next_page_url: Option<Url>,
}

/// Parses a list page and extracts posting links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` whose href carries a `-jobs-<digits>` marker
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Links repeated elsewhere on the same page
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the page was fetched from, for resolving relative links
///
/// # Returns
///
/// The posting links and next-page link found on the page
///
/// # Example
///
/// ```
/// use rozee_jobs::crawler::parse_list_page;
/// use url::Url;
///
/// let html = r#"<a href="/acme-developer-jobs-123">Developer</a><a href="/about">About</a>"#;
/// let base_url = Url::parse("https://www.rozee.pk/job/jsearch/q/all/fc/1").unwrap();
/// let page = parse_list_page(html, &base_url);
/// assert_eq!(page.job_urls.len(), 1);
/// assert_eq!(page.job_urls[0].as_str(), "https://www.rozee.pk/acme-developer-jobs-123");
/// ```
pub fn parse_list_page(html: &str, base_url: &Url) -> ListPage {
    let document = Html::parse_document(html);

    ListPage {
        job_urls: extract_job_links(&document, base_url),
        next_page_url: extract_next_link(&document, base_url),
    }
}

/// Collects the visible text of a page, lowercased, for block detection
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn extract_job_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse(r#"a[href*="-jobs-"]"#) {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_job_url(href) {
                continue;
            }

            if let Some(absolute_url) = resolve_link(href, base_url) {
                if seen.insert(absolute_url.as_str().to_string()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

fn extract_next_link(document: &Html, base_url: &Url) -> Option<Url> {
    let next_selector = Selector::parse(r#"a[rel~="next"][href], link[rel~="next"][href]"#).ok()?;

    document
        .select(&next_selector)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| resolve_link(href, base_url))
}
