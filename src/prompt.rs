//! Prompt rendering.
//!
//! [`build_prompt`] is the single entry point used by the pipeline: it renders
//! a use case's template, restates the topic, enumerates every schema field
//! and closes with a fenced JSON skeleton the extractor can anchor on.

use crate::schema::SchemaDescriptor;
use std::collections::BTreeMap;

/// Placeholder values substituted into templates, keyed by placeholder name.
pub type PromptVars = BTreeMap<String, String>;

/// Build a prompt string with variable substitution.
///
/// Replaces `{key}` placeholders in the template with values from `vars`.
/// The special `{topic}` placeholder is replaced by the `topic` parameter.
/// Unknown placeholders are left untouched.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
///
/// # Example
///
/// ```
/// use niche_analyst::prompt::{render, PromptVars};
///
/// let mut vars = PromptVars::new();
/// vars.insert("count".into(), "4".into());
/// let result = render("Top {count} rivals in {topic}: {{\"k\": 1}}", "edtech", &vars);
/// assert_eq!(result, r#"Top 4 rivals in edtech: {"k": 1}"#);
/// ```
pub fn render(template: &str, topic: &str, vars: &PromptVars) -> String {
    // Single left-to-right scan: substituted values are never rescanned.
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        rendered.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            rendered.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(close) = tail.find('}') {
                let key = &tail[1..close];
                let value = if key == "topic" {
                    Some(topic)
                } else {
                    vars.get(key).map(String::as_str)
                };
                if let Some(value) = value {
                    rendered.push_str(value);
                    rest = &tail[close + 1..];
                    continue;
                }
            }
        }

        rendered.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    rendered.push_str(rest);
    rendered
}

/// Create a numbered list from items (1-indexed).
pub fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap text in a labeled section for structured prompts.
pub fn section(label: &str, content: &str) -> String {
    format!("## {}\n{}", label, content)
}

/// Render the complete prompt for one generation.
///
/// Pure function of its inputs. The output always:
/// 1. contains the rendered template,
/// 2. restates the topic,
/// 3. lists every schema field path with its type and instruction,
/// 4. asks for a single JSON object inside a ```` ```json ```` fence and
///    shows the expected skeleton in such a fence.
pub fn build_prompt(template: &str, topic: &str, schema: &SchemaDescriptor, vars: &PromptVars) -> String {
    let body = render(template, topic, vars);

    let fields: Vec<String> = schema
        .field_paths()
        .into_iter()
        .map(|(path, field)| {
            if field.instruction.is_empty() {
                format!("{} ({})", path, field.ty.label())
            } else {
                format!("{} ({}): {}", path, field.ty.label(), field.instruction)
            }
        })
        .collect();

    // Serializing a Value cannot fail; fall back to compact form just in case.
    let skeleton = serde_json::to_string_pretty(&schema.skeleton())
        .unwrap_or_else(|_| schema.skeleton().to_string());

    let format = format!(
        "Respond as a single JSON object with exactly these fields. \
         Put the JSON inside a fenced code block that starts with ```json and ends with ```, \
         and do not add any other code blocks.\n```json\n{}\n```",
        skeleton
    );

    [
        body.trim().to_string(),
        section("Topic", topic),
        section("Fields", &numbered_list(&fields)),
        section("Output format", &format),
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn vars(pairs: &[(&str, &str)]) -> PromptVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_basic() {
        let result = render("Hello {name}, analyze {topic}", "fintech", &vars(&[("name", "Alice")]));
        assert_eq!(result, "Hello Alice, analyze fintech");
    }

    #[test]
    fn test_render_unknown_placeholder_kept() {
        let result = render("List {count} items", "x", &PromptVars::new());
        assert_eq!(result, "List {count} items");
    }

    #[test]
    fn test_render_escaped_braces() {
        let result = render("JSON: {{\"key\": \"{topic}\"}}", "edtech", &PromptVars::new());
        assert_eq!(result, r#"JSON: {"key": "edtech"}"#);
    }

    #[test]
    fn test_render_does_not_expand_inserted_values() {
        let v = vars(&[("competitors", "Acme {features}"), ("features", "speed")]);
        let result = render("{competitors} / {features}", "{complete} market", &v);
        assert_eq!(result, "Acme {features} / speed");

        let result = render("Niche: {topic}. {complete}", "{complete} market", &vars(&[("complete", "REPORT")]));
        assert_eq!(result, "Niche: {complete} market. REPORT");
    }

    #[test]
    fn test_numbered_list() {
        let items = vec!["First".to_string(), "Second".to_string()];
        assert_eq!(numbered_list(&items), "1. First\n2. Second");
        assert_eq!(numbered_list(&[]), "");
    }

    #[test]
    fn test_section() {
        assert_eq!(section("Topic", "edtech"), "## Topic\nedtech");
    }

    #[test]
    fn test_build_prompt_contract() {
        let schema = SchemaDescriptor::new("plan")
            .string("summary", "One paragraph summary")
            .list("risks", "", FieldType::string_list());
        let prompt = build_prompt("Plan a launch for {topic}.", "edtech", &schema, &PromptVars::new());

        assert!(prompt.starts_with("Plan a launch for edtech."));
        assert!(prompt.contains("## Topic\nedtech"));
        assert!(prompt.contains("1. summary (string): One paragraph summary"));
        assert!(prompt.contains("2. risks (list of strings)"));
        assert!(prompt.contains("single JSON object"));
        assert!(prompt.contains("```json\n{\n  \"summary\": \"string\""));
        assert!(prompt.trim_end().ends_with("```"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let schema = SchemaDescriptor::new("s").string("a", "x").integer("b", "y");
        let v = vars(&[("features", "speed, price"), ("competitors", "A, B")]);
        let first = build_prompt("{features} vs {competitors} in {topic}", "saas", &schema, &v);
        let second = build_prompt("{features} vs {competitors} in {topic}", "saas", &schema, &v);
        assert_eq!(first, second);
        assert!(first.starts_with("speed, price vs A, B in saas"));
    }
}
