//! Payload boundary extraction for model replies.
//!
//! Models are asked to wrap their answer in a fenced block (```` ```json ````
//! or ```` ```html ````). This module finds that block with a plain text scan.
//! It is deliberately a heuristic and not a grammar: replies that forget the
//! closing fence are still recoverable.

use crate::output_parser::error::ParseError;

/// Fence delimiter used by markdown code blocks.
const FENCE: &str = "```";

/// Locates the payload embedded in a raw model reply.
///
/// Implementations must be pure: same reply in, same payload out.
pub trait PayloadExtractor: Send + Sync {
    /// Fence tag / content type this extractor looks for (for diagnostics).
    fn tag(&self) -> &str;

    /// Return the payload text, or a [`ParseError`] if no boundary is found.
    fn extract(&self, reply: &str) -> Result<String, ParseError>;
}

/// Default [`PayloadExtractor`]: finds the first fence opener tagged with
/// `tag` and takes everything up to the next closing fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceExtractor {
    tag: String,
}

impl FenceExtractor {
    /// Extractor for an arbitrary fence tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Extractor for ```` ```json ```` blocks.
    pub fn json() -> Self {
        Self::new("json")
    }

    /// Extractor for ```` ```html ```` blocks.
    pub fn html() -> Self {
        Self::new("html")
    }
}

impl PayloadExtractor for FenceExtractor {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn extract(&self, reply: &str) -> Result<String, ParseError> {
        let cleaned = preprocess(reply);
        extract_fenced(&cleaned, &self.tag).map(str::to_string)
    }
}

/// Preprocessing applied to every reply before scanning.
///
/// Strips `<think>` and `<thinking>` blocks, then trims whitespace.
pub fn preprocess(text: &str) -> String {
    let stripped = strip_think_tags(text);
    stripped.trim().to_string()
}

/// Strip all `<think>...</think>` and `<thinking>...</thinking>` blocks from text.
///
/// Handles complete blocks, incomplete blocks (no closing tag),
/// and multiple sequential blocks.
///
/// # Examples
///
/// ```
/// use niche_analyst::output_parser::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>reasoning</think>result"), "result");
/// assert_eq!(strip_think_tags("<think>no closing tag"), "");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    let result = strip_tag_variant(text, "<think>", "</think>");
    strip_tag_variant(&result, "<thinking>", "</thinking>")
}

/// Strip a specific open/close tag pair from text.
fn strip_tag_variant(text: &str, open: &str, close: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find(open) {
        if let Some(end_offset) = result[start..].find(close) {
            let end = start + end_offset + close.len();
            result = format!("{}{}", &result[..start], &result[end..]);
        } else {
            // No closing tag: the rest is unfinished reasoning
            result.truncate(start);
            break;
        }
    }
    result
}

/// Extract the body of the first fenced block tagged `tag`.
///
/// - No opener: [`ParseError::MissingFence`].
/// - Opener without a closing fence: the remainder of the text.
/// - Surrounding whitespace and stray backticks from a cut-off closing
///   fence are trimmed.
///
/// The tag is matched ASCII case-insensitively and must not run into
/// further identifier characters (```` ```jsonl ```` does not match `json`).
///
/// # Examples
///
/// ```
/// use niche_analyst::output_parser::extract_fenced;
///
/// let reply = "Sure!\n```json\n{\"a\": 1}\n```\nAnything else?";
/// assert_eq!(extract_fenced(reply, "json").unwrap(), "{\"a\": 1}");
/// ```
pub fn extract_fenced<'a>(text: &'a str, tag: &str) -> Result<&'a str, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let body_start = find_opener(text, tag).ok_or_else(|| ParseError::MissingFence {
        tag: tag.to_string(),
    })?;

    let rest = &text[body_start..];
    let body = match rest.find(FENCE) {
        Some(close) => &rest[..close],
        None => rest,
    };

    Ok(body.trim().trim_matches('`').trim())
}

/// Byte offset just past the first ```` ```<tag> ```` opener, if any.
fn find_opener(text: &str, tag: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(FENCE) {
        let after_fence = search_from + offset + FENCE.len();
        let candidate = &text[after_fence..];

        if candidate.len() >= tag.len()
            && candidate.is_char_boundary(tag.len())
            && candidate[..tag.len()].eq_ignore_ascii_case(tag)
        {
            let boundary = candidate[tag.len()..]
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '-'));
            if boundary {
                return Some(after_fence + tag.len());
            }
        }

        search_from = after_fence;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── strip_think_tags ──

    #[test]
    fn strip_think_tags_complete() {
        assert_eq!(strip_think_tags("<think>reasoning</think>result"), "result");
    }

    #[test]
    fn strip_think_tags_incomplete() {
        assert_eq!(strip_think_tags("<think>reasoning without close"), "");
    }

    #[test]
    fn strip_mixed_think_and_thinking() {
        let input = "<think>a</think>mid<thinking>b</thinking>end";
        assert_eq!(strip_think_tags(input), "midend");
    }

    #[test]
    fn preprocess_strips_and_trims() {
        let input = "  <think>stuff</think>  hello world  ";
        assert_eq!(preprocess(input), "hello world");
    }

    // ── extract_fenced ──

    #[test]
    fn fenced_json_with_commentary() {
        let input = "Here is the analysis:\n```json\n{\"a\": 1}\n```\nLet me know!";
        assert_eq!(extract_fenced(input, "json").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn fenced_json_on_same_line() {
        let input = "```json{\"a\": 1}```";
        assert_eq!(extract_fenced(input, "json").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn no_opener_is_missing_fence() {
        let input = "{\"a\": 1}";
        let err = extract_fenced(input, "json").unwrap_err();
        assert!(matches!(err, ParseError::MissingFence { ref tag } if tag == "json"));
    }

    #[test]
    fn bare_fence_does_not_count() {
        let input = "```\n{\"a\": 1}\n```";
        assert!(matches!(
            extract_fenced(input, "json"),
            Err(ParseError::MissingFence { .. })
        ));
    }

    #[test]
    fn missing_closer_takes_remainder() {
        let input = "```json\n{\"a\": [1, 2]}\n";
        assert_eq!(extract_fenced(input, "json").unwrap(), "{\"a\": [1, 2]}");
    }

    #[test]
    fn truncated_closer_backticks_are_noise() {
        let input = "```json\n{\"a\": 1}\n``";
        assert_eq!(extract_fenced(input, "json").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn tag_is_case_insensitive() {
        let input = "```JSON\n{}\n```";
        assert_eq!(extract_fenced(input, "json").unwrap(), "{}");
    }

    #[test]
    fn tag_must_end_at_boundary() {
        let input = "```jsonl\n{}\n```\n```json\n[1]\n```";
        assert_eq!(extract_fenced(input, "json").unwrap(), "[1]");
    }

    #[test]
    fn skips_blocks_with_other_tags() {
        let input = "```python\nprint(1)\n```\n```json\n{\"k\": \"v\"}\n```";
        assert_eq!(extract_fenced(input, "json").unwrap(), "{\"k\": \"v\"}");
    }

    #[test]
    fn html_fence() {
        let input = "```html\n<html><body>hi</body></html>\n```";
        assert_eq!(
            extract_fenced(input, "html").unwrap(),
            "<html><body>hi</body></html>"
        );
    }

    #[test]
    fn empty_reply_is_empty_response() {
        assert!(matches!(
            extract_fenced("   \n", "json"),
            Err(ParseError::EmptyResponse)
        ));
    }

    // ── FenceExtractor ──

    #[test]
    fn extractor_strips_think_blocks_first() {
        let reply = "<think>```json\n{\"draft\": true}\n```</think>\n```json\n{\"final\": true}\n```";
        let payload = FenceExtractor::json().extract(reply).unwrap();
        assert_eq!(payload, "{\"final\": true}");
    }

    #[test]
    fn extractor_reports_tag() {
        assert_eq!(FenceExtractor::html().tag(), "html");
    }
}
