use crate::{UrlError, UrlResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Postings shown per search-result page
pub const JOBS_PER_PAGE: u32 = 20;

/// Keyword used when the configured keyword is blank
const UNRESTRICTED_KEYWORD: &str = "all";

/// Characters escaped in a keyword path segment (everything but `A-Za-z0-9-_.!~*'()`)
const KEYWORD_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds the canonical search URL for a keyword and page number
///
/// Page 1 uses the `/fc/1` form; later pages carry the result offset
/// `(page - 1) * 20` in an `/fpn/<offset>` segment.
///
/// # Examples
///
/// ```
/// use rozee_jobs::url::build_search_url;
///
/// let url = build_search_url("https://www.rozee.pk", "developer", 2).unwrap();
/// assert_eq!(url.as_str(), "https://www.rozee.pk/job/jsearch/q/developer/fpn/20");
/// ```
pub fn build_search_url(base_url: &str, keyword: &str, page: u32) -> UrlResult<Url> {
    let keyword = match keyword.trim() {
        "" => UNRESTRICTED_KEYWORD,
        kw => kw,
    };
    let encoded = utf8_percent_encode(keyword, KEYWORD_SEGMENT);
    let base = base_url.trim_end_matches('/');

    let raw = if page <= 1 {
        format!("{}/job/jsearch/q/{}/fc/1", base, encoded)
    } else {
        let offset = (page - 1) * JOBS_PER_PAGE;
        format!("{}/job/jsearch/q/{}/fpn/{}", base, encoded, offset)
    };

    let url = Url::parse(&raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    Ok(url)
}

/// Recovers the keyword from a canonical search URL
///
/// Returns `None` for URLs that are not of the `/job/jsearch/q/<keyword>/...`
/// form.
pub fn keyword_from_search_url(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let position = segments
        .windows(3)
        .position(|w| w[0] == "job" && w[1] == "jsearch" && w[2] == "q")?;

    let raw = segments.get(position + 3).filter(|s| !s.is_empty())?;
    let keyword = percent_decode_str(raw).decode_utf8().ok()?;
    Some(keyword.into_owned())
}

/// Recovers the page number from a canonical search URL
///
/// The `/fpn/<offset>` form maps back to `offset / 20 + 1`; every other form
/// is page 1.
pub fn page_from_search_url(url: &Url) -> u32 {
    let Some(segments) = url.path_segments() else {
        return 1;
    };
    let segments: Vec<&str> = segments.collect();

    segments
        .windows(2)
        .find(|w| w[0] == "fpn")
        .and_then(|w| w[1].parse::<u32>().ok())
        .map(|offset| offset / JOBS_PER_PAGE + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.rozee.pk";

    #[test]
    fn test_first_page_url() {
        let url = build_search_url(BASE, "developer", 1).unwrap();
        assert_eq!(url.as_str(), "https://www.rozee.pk/job/jsearch/q/developer/fc/1");
    }

    #[test]
    fn test_second_page_uses_offset() {
        let url = build_search_url(BASE, "developer", 2).unwrap();
        assert_eq!(url.as_str(), "https://www.rozee.pk/job/jsearch/q/developer/fpn/20");

        let url = build_search_url(BASE, "developer", 5).unwrap();
        assert!(url.as_str().ends_with("/fpn/80"));
    }

    #[test]
    fn test_blank_keyword_is_unrestricted() {
        let url = build_search_url(BASE, "   ", 1).unwrap();
        assert_eq!(url.as_str(), "https://www.rozee.pk/job/jsearch/q/all/fc/1");
    }

    #[test]
    fn test_keyword_is_encoded() {
        let url = build_search_url(BASE, "c++ developer", 1).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.rozee.pk/job/jsearch/q/c%2B%2B%20developer/fc/1"
        );
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let url = build_search_url("http://127.0.0.1:8080/", "qa", 1).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/job/jsearch/q/qa/fc/1");
    }

    #[test]
    fn test_invalid_base() {
        assert!(build_search_url("not a base", "qa", 1).is_err());
    }

    #[test]
    fn test_keyword_round_trip_through_url() {
        let url = build_search_url(BASE, "c++ developer", 3).unwrap();
        assert_eq!(keyword_from_search_url(&url), Some("c++ developer".to_string()));
    }

    #[test]
    fn test_keyword_from_foreign_url() {
        let url = Url::parse("https://www.rozee.pk/company/acme").unwrap();
        assert_eq!(keyword_from_search_url(&url), None);
    }

    #[test]
    fn test_page_from_search_url() {
        for page in [1, 2, 7] {
            let url = build_search_url(BASE, "developer", page).unwrap();
            assert_eq!(page_from_search_url(&url), page);
        }

        let other = Url::parse("https://www.rozee.pk/jobs-in-lahore").unwrap();
        assert_eq!(page_from_search_url(&other), 1);
    }
}
