//! Strict JSON parsing of extracted payloads.
//!
//! No repair is attempted: a trailing comma or a truncated object is a
//! failure that carries the offending text, never a default value.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::output_parser::error::ParseError;

/// Parse an extracted payload into a `serde_json::Value`.
///
/// # Examples
///
/// ```
/// use niche_analyst::output_parser::parse_payload;
///
/// let value = parse_payload("{\"summary\": \"ok\"}").unwrap();
/// assert_eq!(value["summary"], "ok");
/// assert!(parse_payload("{\"summary\": \"ok\",}").is_err());
/// ```
pub fn parse_payload(payload: &str) -> Result<Value, ParseError> {
    parse_payload_as(payload)
}

/// Parse an extracted payload directly into a typed `T`.
pub fn parse_payload_as<T: DeserializeOwned>(payload: &str) -> Result<T, ParseError> {
    let trimmed = payload.trim();
    serde_json::from_str::<T>(trimmed).map_err(|e| ParseError::InvalidJson {
        reason: e.to_string(),
        text: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Kv {
        key: String,
    }

    #[test]
    fn object_parses() {
        let value = parse_payload(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn array_parses() {
        let value = parse_payload("[1, 2, 3]").unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn typed_parse() {
        let kv: Kv = parse_payload_as(r#" {"key": "v"} "#).unwrap();
        assert_eq!(kv.key, "v");
    }

    #[test]
    fn trailing_comma_is_rejected_with_text() {
        let err = parse_payload(r#"{"key": "value",}"#).unwrap_err();
        match err {
            ParseError::InvalidJson { text, .. } => assert_eq!(text, r#"{"key": "value",}"#),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn single_quotes_are_rejected() {
        assert!(matches!(
            parse_payload("{'key': 'value'}"),
            Err(ParseError::InvalidJson { .. })
        ));
    }

    #[test]
    fn empty_payload_is_invalid() {
        // An empty fence body is a payload that failed to parse, not a missing one
        assert!(matches!(
            parse_payload("  "),
            Err(ParseError::InvalidJson { ref text, .. }) if text.is_empty()
        ));
    }
}
