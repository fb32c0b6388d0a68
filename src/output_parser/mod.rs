//! # Model Output Parser
//!
//! Extracts and parses the structured payload embedded in free-form model
//! replies. Extraction is a heuristic fence scan; parsing is strict JSON with
//! no repair, so a malformed reply is rejected instead of silently patched.
//!
//! | Item | Use |
//! |------|-----|
//! | [`PayloadExtractor`] | Seam for locating the payload inside a reply |
//! | [`FenceExtractor`] | Default extractor: ```` ```json ```` / ```` ```html ```` fences |
//! | [`extract_fenced`] | Free-function form of the fence scan |
//! | [`parse_payload`] | Strict JSON parse of an extracted payload |
//! | [`strip_think_tags`] | Remove `<think>` blocks before scanning |

pub mod error;
pub mod extract;
pub mod json;

pub use error::ParseError;
pub use extract::{extract_fenced, preprocess, strip_think_tags, FenceExtractor, PayloadExtractor};
pub use json::{parse_payload, parse_payload_as};
