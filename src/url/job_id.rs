use regex::Regex;
use std::sync::LazyLock;

/// Digits following the `-jobs-` marker of a posting URL
static JOBS_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-jobs-(\d+)").unwrap());

/// Digits at the very end of a URL, optionally followed by one slash
static TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)/?$").unwrap());

/// Derives the site-assigned posting identifier from a detail URL
///
/// The first digit run after a `-jobs-` marker wins; otherwise the trailing
/// digit run of the URL is used.
///
/// # Examples
///
/// ```
/// use rozee_jobs::url::extract_job_id;
///
/// assert_eq!(extract_job_id("https://example/site-jobs-482913"), Some("482913".to_string()));
/// assert_eq!(extract_job_id("https://example/about"), None);
/// ```
pub fn extract_job_id(url: &str) -> Option<String> {
    JOBS_MARKER
        .captures(url)
        .or_else(|| TRAILING_DIGITS.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns true if the link points at a posting (`-jobs-<digits>`)
pub fn is_job_url(href: &str) -> bool {
    JOBS_MARKER.is_match(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_id() {
        assert_eq!(
            extract_job_id("https://example/site-jobs-482913"),
            Some("482913".to_string())
        );
    }

    #[test]
    fn test_marker_wins_over_trailing_digits() {
        assert_eq!(
            extract_job_id("https://www.rozee.pk/acme-senior-developer-lahore-jobs-1234?ref=55"),
            Some("1234".to_string())
        );
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        assert_eq!(
            extract_job_id("https://www.rozee.pk/ACME-JOBS-77"),
            Some("77".to_string())
        );
    }

    #[test]
    fn test_trailing_digits_fallback() {
        assert_eq!(
            extract_job_id("https://www.rozee.pk/job/view/98765/"),
            Some("98765".to_string())
        );
    }

    #[test]
    fn test_no_identifier() {
        assert_eq!(extract_job_id("https://www.rozee.pk/companies"), None);
        assert_eq!(extract_job_id(""), None);
    }

    #[test]
    fn test_is_job_url() {
        assert!(is_job_url("/acme-developer-jobs-42"));
        assert!(!is_job_url("/jobs-in-lahore"));
        assert!(!is_job_url("/acme-developer-jobs-"));
    }
}
