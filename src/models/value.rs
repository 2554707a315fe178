// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Resolved per-field values held by a repeater row.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// One row: field id to resolved value, in stored key order.
pub type Row = IndexMap<String, FieldValue>;

/// Ordered rows; display order equals storage order.
pub type Collection = Vec<Row>;

/// Resolved `{id, url}` shape of an image field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    pub url: String,
    /// Any other keys a host stored next to `id`/`url`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageRef {
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            url: url.into(),
            extra: Map::new(),
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(integer_of))
}

/// A single field value inside a row.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Empty,
    Bool(bool),
    Number(Number),
    Text(String),
    Image(ImageRef),
    /// Arrays and objects kept verbatim.
    Opaque(Value),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl FieldValue {
    /// Convert a stored JSON value without resolving anything.
    ///
    /// Objects carrying a string `url` become [`FieldValue::Image`] only when
    /// `image_field` is set; everywhere else they stay opaque.
    pub fn from_json(value: &Value, image_field: bool) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Object(map) if image_field && map.get("url").is_some_and(Value::is_string) => {
                serde_json::from_value::<ImageRef>(value.clone())
                    .map(Self::Image)
                    .unwrap_or_else(|_| Self::Opaque(Value::Object(map.clone())))
            }
            other => Self::Opaque(other.clone()),
        }
    }

    /// Stored JSON form. Images keep their `id` so older readers still find it.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
            Self::Image(image) => serde_json::to_value(image).unwrap_or(Value::Null),
            Self::Opaque(v) => v.clone(),
        }
    }

    /// Truthiness used by checkboxes and the image "is set" checks.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::Text(s) => !s.is_empty(),
            Self::Image(_) | Self::Opaque(_) => true,
        }
    }

    /// Plain text shown in inputs and row headers.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Image(image) => image.url.clone(),
            Self::Opaque(v) => v.to_string(),
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Integer carried by the value, if it looks like an attachment id.
    pub fn as_integer(&self) -> Option<i64> {
        integer_of(&self.to_json())
    }

    /// Loose match against a choice key.
    ///
    /// Both sides are compared in string form and nothing else. Booleans
    /// normalize to `"1"` and `"0"`; numbers use their canonical JSON text, with
    /// integral floats written as integers so `1.0` selects the key `"1"`.
    /// Strings are never reinterpreted, so `"01"` and `"1"` stay distinct.
    pub fn matches_key(&self, key: &str) -> bool {
        self.key_form() == key
    }

    fn key_form(&self) -> String {
        match self {
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::Number(n) => canonical_number(n),
            other => other.display(),
        }
    }
}

fn canonical_number(n: &Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.is_finite()
        && f.fract() == 0.0
        && f.abs() < 9_007_199_254_740_992.0
    {
        return (f as i64).to_string();
    }
    n.to_string()
}

/// Integer form of a JSON number or a string that parses as `i64`.
pub fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
