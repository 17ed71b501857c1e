//! Free-text clean-up for user-supplied notes and messages.
//!
//! Markup is stripped rather than escaped: borrow-request text is displayed
//! as plain text by every client.

use std::sync::OnceLock;

use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_ENTITY_RE: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "the pattern is a compile-time constant"
)]
fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

#[expect(
    clippy::expect_used,
    reason = "the pattern is a compile-time constant"
)]
fn numeric_entity_regex() -> &'static Regex {
    NUMERIC_ENTITY_RE
        .get_or_init(|| Regex::new(r"&#([xX][0-9a-fA-F]+|[0-9]+);").expect("valid entity regex"))
}

fn decode_numeric_entity(raw: &str) -> Option<char> {
    let code = match raw.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => raw.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

fn decode_entities(text: &str) -> String {
    let numeric = numeric_entity_regex().replace_all(text, |caps: &regex::Captures<'_>| {
        caps.get(1)
            .and_then(|m| decode_numeric_entity(m.as_str()))
            .map_or_else(String::new, String::from)
    });
    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Clean optional user text.
///
/// Trims, strips markup tags, decodes common HTML entities and removes NUL
/// characters. Returns `None` when nothing is left.
///
/// # Examples
/// ```
/// use hippo_backend::domain::sanitize::clean_text;
///
/// assert_eq!(
///     clean_text(Some("  <b>Back</b> by Friday &amp; thanks ")),
///     Some("Back by Friday & thanks".to_owned())
/// );
/// assert_eq!(clean_text(Some("   ")), None);
/// ```
pub fn clean_text(input: Option<&str>) -> Option<String> {
    let trimmed = input?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = tag_regex().replace_all(trimmed, "");
    let decoded = decode_entities(&stripped);
    let cleaned: String = decoded.chars().filter(|c| *c != '\0').collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}
