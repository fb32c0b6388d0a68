//! Declared shapes for structured model output.
//!
//! A [`SchemaDescriptor`] lists the fields a use case asks the model for. It
//! serves two purposes: the prompt builder enumerates its fields and renders a
//! JSON skeleton as format instructions, and the pipeline validates the parsed
//! payload against it before anything is handed to the caller.

use crate::error::AnalysisError;
use serde_json::{json, Map, Value};

/// Type of a single schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A JSON string.
    String,
    /// A JSON integer (a float with no fractional part is accepted).
    Integer,
    /// A nested object with its own fields.
    Object(SchemaDescriptor),
    /// A list whose elements all have the given type.
    List(Box<FieldType>),
}

impl FieldType {
    /// List of strings.
    pub fn string_list() -> Self {
        FieldType::List(Box::new(FieldType::String))
    }

    /// List of objects of the given shape.
    pub fn object_list(schema: SchemaDescriptor) -> Self {
        FieldType::List(Box::new(FieldType::Object(schema)))
    }

    /// Short human-readable label used in prompts.
    pub fn label(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Object(_) => "object".to_string(),
            FieldType::List(inner) => match inner.as_ref() {
                FieldType::Object(_) => "list of objects".to_string(),
                other => format!("list of {}s", other.label()),
            },
        }
    }

    /// Example value of this type, used to build the format skeleton.
    fn skeleton(&self) -> Value {
        match self {
            FieldType::String => json!("string"),
            FieldType::Integer => json!(0),
            FieldType::Object(schema) => schema.skeleton(),
            FieldType::List(inner) => Value::Array(vec![inner.skeleton()]),
        }
    }
}

/// A named field of a [`SchemaDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// JSON key.
    pub name: String,
    /// Expected type.
    pub ty: FieldType,
    /// Short instruction shown to the model for this field.
    pub instruction: String,
    /// Whether the field must be present (and non-null).
    pub required: bool,
}

/// The declared shape a structured result is expected to match.
///
/// Built once per use case and never mutated afterwards.
///
/// # Example
///
/// ```
/// use niche_analyst::schema::{FieldType, SchemaDescriptor};
///
/// let statement = SchemaDescriptor::new("statement").string("stat", "One short statement");
/// let schema = SchemaDescriptor::new("competitor")
///     .list("strength", "Strengths", FieldType::object_list(statement))
///     .string("market_share", "Percentage or description");
///
/// assert_eq!(schema.fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<Field>,
}

impl SchemaDescriptor {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Schema name (for logs and errors).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Add a fully specified field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a required string field.
    pub fn string(self, name: impl Into<String>, instruction: impl Into<String>) -> Self {
        self.typed(name, instruction, FieldType::String)
    }

    /// Add a required integer field.
    pub fn integer(self, name: impl Into<String>, instruction: impl Into<String>) -> Self {
        self.typed(name, instruction, FieldType::Integer)
    }

    /// Add a required nested-object field.
    pub fn object(
        self,
        name: impl Into<String>,
        instruction: impl Into<String>,
        schema: SchemaDescriptor,
    ) -> Self {
        self.typed(name, instruction, FieldType::Object(schema))
    }

    /// Add a required list field. `list_type` should be a [`FieldType::List`].
    pub fn list(
        self,
        name: impl Into<String>,
        instruction: impl Into<String>,
        list_type: FieldType,
    ) -> Self {
        let ty = match list_type {
            list @ FieldType::List(_) => list,
            element => FieldType::List(Box::new(element)),
        };
        self.typed(name, instruction, ty)
    }

    /// Mark the most recently added field as optional.
    pub fn optional(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.required = false;
        }
        self
    }

    fn typed(self, name: impl Into<String>, instruction: impl Into<String>, ty: FieldType) -> Self {
        self.field(Field {
            name: name.into(),
            ty,
            instruction: instruction.into(),
            required: true,
        })
    }

    /// Every field path with its field, depth-first in declaration order.
    ///
    /// Nested objects use dotted paths (`a.b`); list elements use `a[].b`.
    pub fn field_paths(&self) -> Vec<(String, &Field)> {
        let mut out = Vec::new();
        collect_paths(self, "", &mut out);
        out
    }

    /// Example JSON object showing the expected shape.
    pub fn skeleton(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            map.insert(field.name.clone(), field.ty.skeleton());
        }
        Value::Object(map)
    }

    /// Check a parsed payload against this schema.
    ///
    /// Returns [`AnalysisError::SchemaViolation`] listing every missing required
    /// field path and every field present with an implausible type. Nothing
    /// is coerced or filled in.
    pub fn validate(&self, value: &Value) -> Result<(), AnalysisError> {
        let mut report = Violations::default();
        match value {
            Value::Object(map) => check_object(self, map, "", &mut report),
            _ => report.mistyped.push("(root)".to_string()),
        }

        if report.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::SchemaViolation {
                schema: self.name.clone(),
                missing: report.missing,
                mistyped: report.mistyped,
            })
        }
    }
}

#[derive(Default)]
struct Violations {
    missing: Vec<String>,
    mistyped: Vec<String>,
}

impl Violations {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.mistyped.is_empty()
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn collect_paths<'a>(schema: &'a SchemaDescriptor, prefix: &str, out: &mut Vec<(String, &'a Field)>) {
    for field in &schema.fields {
        let path = join(prefix, &field.name);
        out.push((path.clone(), field));
        collect_type_paths(&field.ty, &path, out);
    }
}

fn collect_type_paths<'a>(ty: &'a FieldType, path: &str, out: &mut Vec<(String, &'a Field)>) {
    match ty {
        FieldType::Object(nested) => collect_paths(nested, path, out),
        FieldType::List(inner) => collect_type_paths(inner, &format!("{}[]", path), out),
        FieldType::String | FieldType::Integer => {}
    }
}

fn check_object(schema: &SchemaDescriptor, map: &Map<String, Value>, prefix: &str, report: &mut Violations) {
    for field in &schema.fields {
        let path = join(prefix, &field.name);
        match map.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    report.missing.push(path);
                }
            }
            Some(value) => check_value(&field.ty, value, &path, report),
        }
    }
}

/// The value as an `i64`, if it is a number without a fractional part that
/// fits the range. `5.0` counts; `1.5` and `1e19` do not.
pub fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

fn check_value(ty: &FieldType, value: &Value, path: &str, report: &mut Violations) {
    match ty {
        FieldType::String => {
            if !value.is_string() {
                report.mistyped.push(path.to_string());
            }
        }
        FieldType::Integer => {
            if as_integer(value).is_none() {
                report.mistyped.push(path.to_string());
            }
        }
        FieldType::Object(nested) => match value.as_object() {
            Some(map) => check_object(nested, map, path, report),
            None => report.mistyped.push(path.to_string()),
        },
        FieldType::List(inner) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_value(inner, item, &format!("{}[{}]", path, i), report);
                }
            }
            None => report.mistyped.push(path.to_string()),
        },
    }
}
