//! Argument schemas for the exposed tools
//!
//! A [`Schema`] is a flat list of [`Field`]s. Validation is a pure function:
//! it either returns the normalized [`Arguments`] or a [`ValidationError`]
//! listing every offending field, never just the first one.
//!
//! Unknown fields in a payload are ignored and dropped from the normalized
//! arguments. Absent optional fields stay absent.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

/// Path reported when the payload itself is not an object
pub const ROOT_PATH: &str = "(root)";

/// Value type a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    /// JSON integer (no fractional part)
    Integer,
    /// Array whose every element is a string
    StringArray,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::StringArray => "array of string",
        }
    }

    fn json_schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }

    /// Push a violation for every part of `value` that does not fit.
    fn check(self, path: &str, value: &Value, violations: &mut Vec<FieldViolation>) {
        let fits = match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Integer if value.is_u64() && !value.is_i64() => {
                violations.push(FieldViolation::new(
                    path,
                    Constraint::Invalid(format!("{value} is out of range for an integer")),
                ));
                return;
            }
            Self::Integer => value.is_i64(),
            Self::StringArray => {
                let Some(items) = value.as_array() else {
                    violations.push(FieldViolation::wrong_type(path, self.name(), value));
                    return;
                };
                for (index, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        violations.push(FieldViolation::wrong_type(
                            &format!("{path}.{index}"),
                            FieldType::String.name(),
                            item,
                        ));
                    }
                }
                return;
            }
        };

        if !fits {
            violations.push(FieldViolation::wrong_type(path, self.name(), value));
        }
    }
}

/// One named field of a schema
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub description: &'static str,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Structural validator for one tool's arguments
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [Field],
}

impl Schema {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check `payload` against every field and collect all violations.
    pub fn validate(&self, payload: &Value) -> Result<Arguments, ValidationError> {
        let Some(object) = payload.as_object() else {
            return Err(ValidationError::new(vec![FieldViolation::wrong_type(
                ROOT_PATH, "object", payload,
            )]));
        };

        let mut normalized = Map::new();
        let mut violations = Vec::new();

        for field in self.fields {
            match object.get(field.name) {
                None if field.required => {
                    violations.push(FieldViolation::new(field.name, Constraint::MissingRequired));
                }
                None => {}
                Some(value) => {
                    let before = violations.len();
                    field.kind.check(field.name, value, &mut violations);
                    if violations.len() == before {
                        normalized.insert(field.name.to_owned(), value.clone());
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(Arguments(normalized))
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Render as a JSON Schema object for tool discovery.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields {
            let mut property = field.kind.json_schema();
            if let Some(object) = property.as_object_mut() {
                object.insert("description".to_owned(), Value::from(field.description));
            }
            properties.insert(field.name.to_owned(), property);
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Arguments that passed validation; only declared fields remain.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Convert into a typed request.
    ///
    /// Only fails when the target type is stricter than the schema (for
    /// instance an integer outside its range), reported at the root path.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, ValidationError> {
        serde_json::from_value(self.into_value()).map_err(|e| {
            ValidationError::new(vec![FieldViolation::new(
                ROOT_PATH,
                Constraint::Invalid(e.to_string()),
            )])
        })
    }
}

/// What a field violated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    MissingRequired,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    Invalid(String),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "missing required field"),
            Self::WrongType { expected, found } => {
                write!(f, "wrong type: expected {expected}, found {found}")
            }
            Self::Invalid(reason) => write!(f, "invalid value: {reason}"),
        }
    }
}

/// A single offending field, addressed by dotted path (`labels.1`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub constraint: Constraint,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            path: path.into(),
            constraint,
        }
    }

    fn wrong_type(path: &str, expected: &'static str, found: &Value) -> Self {
        Self::new(
            path,
            Constraint::WrongType {
                expected,
                found: json_type_name(found),
            },
        )
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.constraint)
    }
}

impl Serialize for FieldViolation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json!({
            "path": self.path,
            "constraint": self.constraint.to_string(),
        })
        .serialize(serializer)
    }
}

/// Every violation found in one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation is reported at exactly `path`
    pub fn names(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid arguments: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
