//! Declarative per-field validation for form-shaped input.
//!
//! A `Schema` is declared at the call site, never persisted. Validation walks
//! fields in declaration order and reports the first violated rule only;
//! callers surface that single message and stop.

use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FieldRule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field_type: FieldType,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<usize>,
}

impl FieldRule {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            min: None,
            max: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Minimum value, checked for number fields only.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Maximum length in characters, checked for string fields only.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered collection of field rules. Declaration order matters: the first
/// violated rule across the schema is the one reported.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    /// Validate `data` against this schema. Rejects unexpected fields and
    /// enforces per-field type and bound checks. Returns the first violation
    /// as a human-readable message, or `None` when every rule passes.
    pub fn validate(&self, data: &Value) -> Option<String> {
        for (name, rule) in &self.fields {
            let value = data.get(name);

            if rule.required {
                let missing = match value {
                    None | Some(Value::Null) => true,
                    Some(Value::String(s)) => s.is_empty(),
                    Some(_) => false,
                };
                if missing {
                    return Some(format!("{name} is required."));
                }
            }

            let Some(value) = value else { continue };
            if value.is_null() {
                continue;
            }

            if !rule.field_type.matches(value) {
                return Some(format!("{name} must be a {}.", rule.field_type));
            }

            if rule.field_type == FieldType::String {
                if let (Some(max), Some(s)) = (rule.max, value.as_str()) {
                    if s.chars().count() > max {
                        return Some(format!("{name} exceeds maximum length of {max}."));
                    }
                }
            }

            if rule.field_type == FieldType::Number {
                if let (Some(min), Some(n)) = (rule.min, value.as_f64()) {
                    if n < min {
                        return Some(format!("{name} must be at least {min}."));
                    }
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
