//! URL handling module for Rozee-Jobs
//!
//! This module builds canonical search URLs, derives posting identifiers from
//! detail URLs, and resolves links found on pages.

mod job_id;
mod search;

use url::Url;

// Re-export main functions
pub use job_id::{extract_job_id, is_job_url};
pub use search::{build_search_url, keyword_from_search_url, page_from_search_url, JOBS_PER_PAGE};

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    // Same posting reached through different anchors is one posting
    absolute_url.set_fragment(None);
    Some(absolute_url)
}
