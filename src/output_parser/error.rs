//! Error types for model output parsers.

/// Errors returned by output parsers.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The model response was empty or whitespace-only.
    #[error("empty model response")]
    EmptyResponse,

    /// No fenced block opener with the expected tag was found.
    #[error("no ```{tag} fence found in model response")]
    MissingFence {
        /// The fence tag that was searched for (e.g. `json`, `html`).
        tag: String,
    },

    /// The extracted payload is not valid JSON (or not the requested shape).
    #[error("payload is not valid JSON: {reason}")]
    InvalidJson {
        /// The serde error message.
        reason: String,
        /// The payload text that failed to parse.
        text: String,
    },
}

/// Truncate a string to at most `max_len` bytes on a char boundary, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
