//! Block signal detection
//!
//! A blocked response is an anti-automation page served with a normal
//! status. Detection is a heuristic, so it sits behind a trait and the
//! controller only sees a yes/no answer.

use crate::crawler::parser::page_text;

/// Decides whether a fetched list page is a block page
pub trait BlockDetector: Send + Sync {
    fn is_blocked(&self, body: &str) -> bool;
}

/// Matches configured phrases against the page text, ignoring case
#[derive(Debug, Clone)]
pub struct PhraseBlockDetector {
    phrases: Vec<String>,
}

impl PhraseBlockDetector {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }
}

impl BlockDetector for PhraseBlockDetector {
    fn is_blocked(&self, body: &str) -> bool {
        if self.phrases.is_empty() {
            return false;
        }

        let text = page_text(body);
        self.phrases.iter().any(|phrase| text.contains(phrase.as_str()))
    }
}

/// Never reports a block
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlockDetection;

impl BlockDetector for NoBlockDetection {
    fn is_blocked(&self, _body: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PhraseBlockDetector {
        PhraseBlockDetector::new(["forbidden", "Access Denied", "blocked"])
    }

    #[test]
    fn test_detects_phrase_case_insensitively() {
        assert!(detector().is_blocked("<html><body><h1>ACCESS DENIED</h1></body></html>"));
        assert!(detector().is_blocked("<p>403 Forbidden</p>"));
    }

    #[test]
    fn test_ignores_markup_only_matches() {
        // Attribute values are not page text
        assert!(!detector().is_blocked(r#"<div class="blocked-banner">Latest jobs</div>"#));
    }

    #[test]
    fn test_normal_page() {
        assert!(!detector().is_blocked("<a href='/a-jobs-1'>Developer</a>"));
        assert!(!NoBlockDetection.is_blocked("forbidden"));
    }

    #[test]
    fn test_blank_phrases_are_ignored() {
        let detector = PhraseBlockDetector::new(["  ", ""]);
        assert!(!detector.is_blocked("anything at all"));
    }
}
