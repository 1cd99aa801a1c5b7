//! Runtime schema validation for untrusted JSON payloads.
//!
//! Inbound rate requests and every carrier response shape are checked
//! against an explicit [`Schema`] before any field is read. Validation
//! walks the whole document and reports every violation as a
//! [`SchemaIssue`] (path + reason) rather than stopping at the first one.
//!
//! Supported keywords (a JSON Schema subset):
//!
//! | Keyword | Applies to |
//! |---------|------------|
//! | `type` (string or list) | any |
//! | `required`, `properties` | objects |
//! | `items`, `minItems` | arrays |
//! | `minLength`, `maxLength`, `enum` | strings |
//! | `exclusiveMinimum`, `minimum` | numbers |
//! | `anyOf` | any |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// `$`-rooted path to the offending value, e.g. `$.packages[0].weight`.
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for SchemaIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A named schema definition.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    definition: Value,
}

impl Schema {
    pub fn new(name: &'static str, definition: Value) -> Self {
        Self { name, definition }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validates `value`, returning every issue found.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<SchemaIssue>> {
        let mut issues = Vec::new();
        match self.definition.as_object() {
            Some(definition) => validate_value(value, definition, "$", &mut issues),
            None => issues.push(SchemaIssue::new("$", "schema must be an object")),
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}

fn validate_value(
    value: &Value,
    schema: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    if let Some(any_of) = schema.get("anyOf").and_then(Value::as_array) {
        let matched = any_of
            .iter()
            .filter_map(Value::as_object)
            .any(|candidate| {
                let mut scratch = Vec::new();
                validate_value(value, candidate, path, &mut scratch);
                scratch.is_empty()
            });
        if !matched {
            issues.push(SchemaIssue::new(
                path,
                format!(
                    "value of type '{}' does not match any allowed shape",
                    value_type_name(value)
                ),
            ));
            return;
        }
    }

    if let Some(schema_type) = schema.get("type") {
        if !type_matches(value, schema_type) {
            issues.push(SchemaIssue::new(
                path,
                format!(
                    "expected type '{}', found '{}'",
                    describe_type(schema_type),
                    value_type_name(value)
                ),
            ));
            // Nested keywords are meaningless on the wrong type.
            return;
        }
    }

    match value {
        Value::Object(object) => validate_object(object, schema, path, issues),
        Value::Array(items) => validate_array(items, schema, path, issues),
        Value::String(text) => validate_string(text, schema, path, issues),
        Value::Number(number) => {
            if let Some(number) = number.as_f64() {
                validate_number(number, schema, path, issues);
            }
        }
        Value::Null | Value::Bool(_) => {}
    }
}

fn validate_object(
    object: &Map<String, Value>,
    schema: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                issues.push(SchemaIssue::new(
                    child_path(path, field),
                    format!("required field '{field}' is missing"),
                ));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, property_schema) in properties {
            if let (Some(property_value), Some(property_schema)) =
                (object.get(key), property_schema.as_object())
            {
                validate_value(property_value, property_schema, &child_path(path, key), issues);
            }
        }
    }
}

fn validate_array(
    items: &[Value],
    schema: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min {
            issues.push(SchemaIssue::new(
                path,
                format!(
                    "array must have at least {min} item(s), found {}",
                    items.len()
                ),
            ));
        }
    }

    if let Some(item_schema) = schema.get("items").and_then(Value::as_object) {
        for (index, item) in items.iter().enumerate() {
            validate_value(item, item_schema, &format!("{path}[{index}]"), issues);
        }
    }
}

fn validate_string(
    text: &str,
    schema: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    let length = text.chars().count() as u64;

    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if length < min {
            issues.push(SchemaIssue::new(
                path,
                format!("string must have at least {min} character(s), found {length}"),
            ));
        }
    }

    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if length > max {
            issues.push(SchemaIssue::new(
                path,
                format!("string must have at most {max} character(s), found {length}"),
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.iter().any(|candidate| candidate.as_str() == Some(text)) {
            let allowed = allowed
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            issues.push(SchemaIssue::new(
                path,
                format!("value '{text}' is not one of: {allowed}"),
            ));
        }
    }
}

fn validate_number(
    number: f64,
    schema: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    if let Some(bound) = schema.get("exclusiveMinimum").and_then(Value::as_f64) {
        if number <= bound {
            issues.push(SchemaIssue::new(
                path,
                format!("number must be greater than {bound}, found {number}"),
            ));
        }
    }

    if let Some(bound) = schema.get("minimum").and_then(Value::as_f64) {
        if number < bound {
            issues.push(SchemaIssue::new(
                path,
                format!("number must be at least {bound}, found {number}"),
            ));
        }
    }
}

fn type_matches(value: &Value, schema_type: &Value) -> bool {
    match schema_type {
        Value::String(name) => type_name_matches(value, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| type_name_matches(value, name)),
        _ => false,
    }
}

fn type_name_matches(value: &Value, name: &str) -> bool {
    match (name, value) {
        ("object", Value::Object(_)) => true,
        ("array", Value::Array(_)) => true,
        ("string", Value::String(_)) => true,
        ("integer", Value::Number(n)) => n.is_i64() || n.is_u64(),
        ("number", Value::Number(_)) => true,
        ("boolean", Value::Bool(_)) => true,
        ("null", Value::Null) => true,
        _ => false,
    }
}

fn describe_type(schema_type: &Value) -> String {
    match schema_type {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

fn child_path(parent: &str, field: &str) -> String {
    format!("{parent}.{field}")
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
