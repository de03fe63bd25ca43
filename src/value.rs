//! Untyped frontmatter values, as produced by a YAML or JSON header parser.
//!
//! This is the input side of the schema: anything a document header can hold, plus
//! [`Value::Date`] for callers that already hold a structured date.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use crate::date::PostDate;

/// A raw frontmatter record: the header of one document, before validation.
pub type RawFrontmatter = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(PostDate),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Name of the value's shape, as shown in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Sequence(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Mapping(fields) => write!(
                f,
                "{{{}}}",
                fields.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
            ),
        }
    }
}

fn number(int: Option<i64>, float: Option<f64>) -> Value {
    match (int, float) {
        (Some(i), _) => Value::Integer(i),
        (None, Some(x)) => Value::Float(x),
        (None, None) => Value::Null,
    }
}

//----- YAML

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;
        match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => number(n.as_i64(), n.as_f64()),
            Yaml::String(s) => Value::String(s),
            Yaml::Sequence(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Yaml::Mapping(map) => Value::Mapping(from_yaml_mapping(map)),
            // Tags like `!draft` carry no meaning for the schema
            Yaml::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// Converts a parsed YAML mapping into a raw record. Scalar keys are stringified,
/// composite keys are dropped since they can't name a field.
pub fn from_yaml_mapping(map: serde_yaml::Mapping) -> RawFrontmatter {
    use serde_yaml::Value as Yaml;
    map.into_iter()
        .filter_map(|(key, value)| {
            let key = match key {
                Yaml::String(s) => s,
                Yaml::Number(n) => n.to_string(),
                Yaml::Bool(b) => b.to_string(),
                other => {
                    tracing::debug!(key = ?other, "dropping non-scalar frontmatter key");
                    return None;
                }
            };
            Some((key, Value::from(value)))
        })
        .collect()
}

//----- JSON

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => number(n.as_i64(), n.as_f64()),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Mapping(from_json_object(map)),
        }
    }
}

pub fn from_json_object(map: serde_json::Map<String, serde_json::Value>) -> RawFrontmatter {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

//----- Native values

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<PostDate> for Value {
    fn from(d: PostDate) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<RawFrontmatter> for Value {
    fn from(fields: RawFrontmatter) -> Self {
        Value::Mapping(fields)
    }
}
