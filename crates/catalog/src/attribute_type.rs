//! Attribute value kinds and their type-checking predicates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use skuforge_core::ValueObject;

use crate::error::AttributeRejection;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
});

/// A dynamically-typed attribute value.
///
/// Serialized untagged, so the JSON forms `true`, `3`, `2.5`, `"red"` and
/// `["a", "b"]` map directly onto the variants. Integers and doubles stay
/// distinct: `3` is an `Integer`, `3.0` is a `Double`. Deserializing goes
/// through [`AttributeValue::from_json`], so integers outside the `i64` range
/// are rejected rather than read as doubles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    TextList(Vec<String>),
}

impl ValueObject for AttributeValue {}

impl AttributeValue {
    /// Short name of the payload kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Double(_) => "double",
            AttributeValue::Text(_) => "text",
            AttributeValue::TextList(_) => "text list",
        }
    }

    /// Convert a raw JSON value from the wire.
    ///
    /// `null` yields `Ok(None)`; objects, arrays with non-text elements and
    /// integers outside the `i64` range have no attribute representation.
    pub fn from_json(value: &JsonValue) -> Result<Option<Self>, AttributeRejection> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Bool(b) => Ok(Some(AttributeValue::Boolean(*b))),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(AttributeValue::Integer(i)))
                } else if n.is_f64() {
                    n.as_f64()
                        .map(|f| Some(AttributeValue::Double(f)))
                        .ok_or_else(|| AttributeRejection::unsupported("number"))
                } else {
                    Err(AttributeRejection::unsupported("integer out of range"))
                }
            }
            JsonValue::String(s) => Ok(Some(AttributeValue::Text(s.clone()))),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    JsonValue::String(s) => Ok(s.clone()),
                    _ => Err(AttributeRejection::unsupported("array with non-text element")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|list| Some(AttributeValue::TextList(list))),
            JsonValue::Object(_) => Err(AttributeRejection::unsupported("object")),
        }
    }

    /// Value identity as used when comparing against a schema default.
    ///
    /// Doubles compare by bit pattern, so `-0.0` differs from `0.0` and every
    /// NaN equals every other NaN.
    pub fn same_value(&self, other: &AttributeValue) -> bool {
        match (self, other) {
            (AttributeValue::Double(a), AttributeValue::Double(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            _ => self == other,
        }
    }
}

impl TryFrom<JsonValue> for AttributeValue {
    type Error = AttributeRejection;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        AttributeValue::from_json(&value)?.ok_or(AttributeRejection::NullValue)
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        AttributeValue::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl core::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Double(d) => write!(f, "{d:?}"),
            AttributeValue::Text(s) => write!(f, "{s:?}"),
            AttributeValue::TextList(items) => write!(f, "{items:?}"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::TextList(value)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(value: Vec<&str>) -> Self {
        AttributeValue::TextList(value.into_iter().map(str::to_string).collect())
    }
}

/// Closed set of attribute kinds declared by a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    /// Non-blank text.
    String,
    Integer,
    Double,
    Boolean,
    /// Text shaped like `#rgb` or `#rrggbb`.
    ColorHex,
    /// Sequence of non-blank text items (possibly empty).
    ListString,
}

impl AttributeType {
    pub const ALL: [AttributeType; 6] = [
        AttributeType::String,
        AttributeType::Integer,
        AttributeType::Double,
        AttributeType::Boolean,
        AttributeType::ColorHex,
        AttributeType::ListString,
    ];

    /// Classify `value` against this kind.
    ///
    /// Total: never panics, never coerces between numeric kinds.
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        match (self, value) {
            (AttributeType::String, AttributeValue::Text(s)) => is_non_blank(s),
            (AttributeType::Integer, AttributeValue::Integer(_)) => true,
            (AttributeType::Double, AttributeValue::Double(_)) => true,
            (AttributeType::Boolean, AttributeValue::Boolean(_)) => true,
            (AttributeType::ColorHex, AttributeValue::Text(s)) => HEX_COLOR.is_match(s),
            (AttributeType::ListString, AttributeValue::TextList(items)) => {
                items.iter().all(|item| is_non_blank(item))
            }
            _ => false,
        }
    }

    /// Human-readable name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Integer => "integer",
            AttributeType::Double => "double",
            AttributeType::Boolean => "boolean",
            AttributeType::ColorHex => "hex color",
            AttributeType::ListString => "list of strings",
        }
    }
}

impl core::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.describe())
    }
}

fn is_non_blank(s: &str) -> bool {
    !s.trim().is_empty()
}
