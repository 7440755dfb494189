//! Field normalization
//!
//! Pure functions that canonicalize raw text and HTML fragments pulled off a
//! page.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

/// Segments kept by [`normalize_location`]
const MAX_LOCATION_SEGMENTS: usize = 3;

/// Location segments that carry no information
const LOCATION_PLACEHOLDERS: &[&str] = &["null", "undefined", "n/a"];

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());

static BLOCK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*/\s*(p|div|li|h[1-6])\s*>").unwrap());

/// Collapses runs of whitespace (non-breaking spaces included) and trims
///
/// # Examples
///
/// ```
/// use rozee_jobs::extract::clean_text;
///
/// assert_eq!(clean_text("  Senior\u{a0}\u{a0}Developer \n"), "Senior Developer");
/// ```
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Converts an HTML fragment into plain text with line structure
///
/// `<br>` and closing `p`/`div`/`li`/`h1`-`h6` tags become line breaks, every
/// other tag is dropped, entities are decoded, carriage returns are removed
/// and runs of blank lines collapse to at most one.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let marked = LINE_BREAK.replace_all(html, "\n");
    let marked = BLOCK_CLOSE.replace_all(&marked, "\n");

    let fragment = Html::parse_fragment(&marked);
    let text = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\r', "");

    let mut lines: Vec<String> = Vec::new();
    for line in text.split('\n') {
        let cleaned = clean_text(line);
        if cleaned.is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push(String::new());
            }
        } else {
            lines.push(cleaned);
        }
    }

    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Canonicalizes a comma-separated location
///
/// Segments are cleaned; empty, purely numeric and placeholder segments are
/// dropped; duplicates are removed case-insensitively keeping the first
/// spelling; at most three segments survive.
///
/// # Examples
///
/// ```
/// use rozee_jobs::extract::normalize_location;
///
/// assert_eq!(
///     normalize_location("Lahore, Lahore, Punjab, Pakistan, 12345"),
///     "Lahore, Punjab, Pakistan"
/// );
/// ```
pub fn normalize_location(raw: &str) -> String {
    let mut kept: Vec<String> = Vec::new();

    for segment in raw.split(',') {
        let cleaned = clean_text(segment);
        if cleaned.is_empty() || is_numeric(&cleaned) || is_placeholder(&cleaned) {
            continue;
        }

        let lower = cleaned.to_lowercase();
        if kept.iter().any(|k| k.to_lowercase() == lower) {
            continue;
        }

        kept.push(cleaned);
        if kept.len() == MAX_LOCATION_SEGMENTS {
            break;
        }
    }

    kept.join(", ")
}

/// Cleans an optional value, mapping blank results to `None`
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v)).filter(|v| !v.is_empty())
}

fn is_numeric(segment: &str) -> bool {
    segment.chars().all(|c| c.is_ascii_digit())
}

fn is_placeholder(segment: &str) -> bool {
    segment.contains("[object")
        || LOCATION_PLACEHOLDERS
            .iter()
            .any(|p| segment.eq_ignore_ascii_case(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("a \t b\n\nc"), "a b c");
        assert_eq!(clean_text("\u{a0}Lahore\u{a0}"), "Lahore");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        let text = html_to_text("<p>First line</p><p>Second <b>bold</b> line</p>");
        assert_eq!(text, "First line\nSecond bold line");
    }

    #[test]
    fn test_html_to_text_line_breaks() {
        let text = html_to_text("Skills:<br>Rust<BR/>Go<br />SQL");
        assert_eq!(text, "Skills:\nRust\nGo\nSQL");
    }

    #[test]
    fn test_html_to_text_lists() {
        let text = html_to_text("<ul><li>One</li><li>Two</li></ul>");
        assert_eq!(text, "One\nTwo");
    }

    #[test]
    fn test_html_to_text_collapses_blank_runs() {
        let text = html_to_text("<div>Intro</div><br><br><br><div>Outro</div>");
        assert_eq!(text, "Intro\n\nOutro");
    }

    #[test]
    fn test_html_to_text_removes_carriage_returns_and_entities() {
        let text = html_to_text("Salary &amp; benefits\r\n<p>Tom &lt;3 Rust</p>");
        assert_eq!(text, "Salary & benefits\nTom <3 Rust");
    }

    #[test]
    fn test_html_to_text_empty() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<p> </p>"), "");
    }

    #[test]
    fn test_normalize_location_example() {
        assert_eq!(
            normalize_location("Lahore, Lahore, Punjab, Pakistan, 12345"),
            "Lahore, Punjab, Pakistan"
        );
    }

    #[test]
    fn test_normalize_location_case_insensitive_dedup() {
        assert_eq!(normalize_location("Karachi, KARACHI, Sindh"), "Karachi, Sindh");
    }

    #[test]
    fn test_normalize_location_drops_placeholders() {
        assert_eq!(
            normalize_location("Islamabad, [object Object], null, , Pakistan"),
            "Islamabad, Pakistan"
        );
    }

    #[test]
    fn test_normalize_location_keeps_three() {
        assert_eq!(normalize_location("A, B, C, D, E"), "A, B, C");
    }

    #[test]
    fn test_normalize_location_is_idempotent() {
        let inputs = [
            "Lahore, Lahore, Punjab, Pakistan, 12345",
            "  karachi ,Karachi,  Sindh\u{a0}Province , PK",
            "",
            ", , 123, n/a",
            "Multan,Multan,Multan",
            "A, b, B, a, C, D",
        ];

        for input in inputs {
            let once = normalize_location(input);
            assert_eq!(normalize_location(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  Acme  Corp ".to_string())), Some("Acme Corp".to_string()));
        assert_eq!(clean_optional(Some("   ".to_string())), None);
        assert_eq!(clean_optional(None), None);
    }
}
