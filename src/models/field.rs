// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Repeater field definitions and schema normalization.
//! Normalization is pure so every control instance can run it on its own schema.

use std::collections::BTreeSet;

use email_address::EmailAddress;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;
use url::Url;

/// Field kinds the row template engine knows how to render.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Url,
    Email,
    Tel,
    Date,
    Hidden,
    Checkbox,
    Select,
    Radio,
    RadioImage,
    Textarea,
    Image,
    CroppedImage,
    /// Unrecognized or missing (`""`) type token, kept verbatim and never rendered.
    Unknown(String),
}

impl FieldType {
    /// Creates a `FieldType` from a configuration type token.
    ///
    /// Maps the known tokens (`"text"`, `"radio-image"`, `"cropped_image"`, …)
    /// to their variants; anything else is returned as `FieldType::Unknown`
    /// holding the original string.
    ///
    /// # Examples
    ///
    /// ```
    /// use repeater::models::field::FieldType;
    ///
    /// assert_eq!(FieldType::from_token("radio-image"), FieldType::RadioImage);
    /// assert_eq!(FieldType::from_token("color"), FieldType::Unknown("color".to_string()));
    /// ```
    pub fn from_token(raw: &str) -> Self {
        match raw {
            "text" => Self::Text,
            "url" => Self::Url,
            "email" => Self::Email,
            "tel" => Self::Tel,
            "date" => Self::Date,
            "hidden" => Self::Hidden,
            "checkbox" => Self::Checkbox,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "radio-image" => Self::RadioImage,
            "textarea" => Self::Textarea,
            "image" => Self::Image,
            "cropped_image" => Self::CroppedImage,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// String form used when emitting configuration JSON.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Date => "date",
            Self::Hidden => "hidden",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::RadioImage => "radio-image",
            Self::Textarea => "textarea",
            Self::Image => "image",
            Self::CroppedImage => "cropped_image",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// Only image fields take part in legacy value resolution.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image | Self::CroppedImage)
    }
}

/// Normalized definition of one field inside a row.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    pub id: String,
    pub kind: FieldType,
    pub label: String,
    pub description: Option<String>,
    pub default: Value,
    /// Choice value to display text, in configured order.
    pub choices: IndexMap<String, String>,
    /// Keys the control does not interpret, passed through untouched.
    pub extra: Map<String, Value>,
}

impl FieldSchema {
    /// Configuration JSON for this field, including pass-through keys.
    pub fn to_json(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert("id".into(), Value::String(self.id.clone()));
        if !matches!(&self.kind, FieldType::Unknown(raw) if raw.is_empty()) {
            out.insert("type".into(), Value::String(self.kind.as_str().to_string()));
        }
        out.insert("label".into(), Value::String(self.label.clone()));
        if let Some(desc) = &self.description {
            out.insert("description".into(), Value::String(desc.clone()));
        }
        out.insert("default".into(), self.default.clone());
        if !self.choices.is_empty() {
            let choices = self
                .choices
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<Map<_, _>>();
            out.insert("choices".into(), Value::Object(choices));
        }
        Value::Object(out)
    }
}

/// Ordered field definitions of one control plus the ids of its image fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, FieldSchema>,
    image_fields: BTreeSet<String>,
}

impl Schema {
    pub fn get(&self, id: &str) -> Option<&FieldSchema> {
        self.fields.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ids of `image` and `cropped_image` fields.
    pub fn image_fields(&self) -> &BTreeSet<String> {
        &self.image_fields
    }

    pub fn is_image_field(&self, id: &str) -> bool {
        self.image_fields.contains(id)
    }

    /// Configuration JSON for every field, keyed by id.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(id, field)| (id.clone(), field.to_json()))
                .collect(),
        )
    }
}

/// Normalize user-supplied field definitions into a [`Schema`].
///
/// For every entry of the `fields` object:
/// - `default` and `label` are synthesized as `""` when absent;
/// - `id` is overwritten with the entry's key;
/// - `type` is parsed into a [`FieldType`], unknown tokens kept as-is;
/// - `choices` keep their configured order (arrays get positional keys).
///
/// Entries are never dropped and key order is preserved. A non-object input
/// yields an empty schema; a non-object entry is treated as an empty definition.
///
/// # Examples
///
/// ```
/// use repeater::models::field::{normalize_fields, FieldType};
/// use serde_json::json;
///
/// let schema = normalize_fields(&json!({
///     "title": { "type": "text", "id": "ignored" },
///     "photo": { "type": "image" }
/// }));
/// let title = schema.get("title").unwrap();
/// assert_eq!(title.id, "title");
/// assert_eq!(title.label, "");
/// assert_eq!(title.default, json!(""));
/// assert!(schema.is_image_field("photo"));
/// assert_eq!(schema.get("photo").unwrap().kind, FieldType::Image);
/// ```
pub fn normalize_fields(raw: &Value) -> Schema {
    let Some(entries) = raw.as_object() else {
        return Schema::default();
    };

    let mut fields = IndexMap::with_capacity(entries.len());
    let mut image_fields = BTreeSet::new();

    for (key, entry) in entries {
        let mut extra = entry.as_object().cloned().unwrap_or_default();

        let kind = match extra.remove("type") {
            Some(Value::String(token)) => FieldType::from_token(token.trim()),
            Some(other) => FieldType::Unknown(value_to_string(&other)),
            None => FieldType::Unknown(String::new()),
        };
        let label = extra
            .remove("label")
            .map(|v| value_to_string(&v))
            .unwrap_or_default();
        let description = extra
            .remove("description")
            .map(|v| value_to_string(&v))
            .filter(|d| !d.trim().is_empty());
        let default = extra
            .remove("default")
            .unwrap_or_else(|| Value::String(String::new()));
        let choices = extra
            .remove("choices")
            .map(|v| parse_choices(&v))
            .unwrap_or_default();
        extra.remove("id");

        if kind.is_image() {
            image_fields.insert(key.clone());
        }

        fields.insert(
            key.clone(),
            FieldSchema {
                id: key.clone(),
                kind,
                label,
                description,
                default,
                choices,
                extra,
            },
        );
    }

    Schema {
        fields,
        image_fields,
    }
}

fn parse_choices(raw: &Value) -> IndexMap<String, String> {
    match raw {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), value_to_string(v)))
            .collect(),
        _ => IndexMap::new(),
    }
}

/// Convert a JSON value into display text.
///
/// Strings are returned as-is, `null` becomes empty and everything else uses
/// its JSON representation.
fn value_to_string(val: &Value) -> String {
    match val {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Check a row value against its field type and return a hint code when it looks wrong.
///
/// Hints never block editing or saving; the editor shows them next to the input.
/// - `Url`: `Some("invalid_url")` unless the value is an `http`/`https` URL with a host.
/// - `Email`: `Some("invalid_email")` unless the value parses as an address.
/// - `Date`: `Some("invalid_date")` unless the value is `YYYY-MM-DD`.
///
/// Empty values and all other kinds return `None`.
pub fn validate_value(kind: &FieldType, value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    match kind {
        FieldType::Url => Url::parse(value)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .map(|_| None)
            .unwrap_or(Some("invalid_url")),
        FieldType::Email => {
            if EmailAddress::parse_with_options(value, Default::default()).is_ok() {
                None
            } else {
                Some("invalid_email")
            }
        }
        FieldType::Date => {
            let format = format_description!("[year]-[month]-[day]");
            if Date::parse(value, &format).is_ok() {
                None
            } else {
                Some("invalid_date")
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn synthesizes_missing_label_and_default_and_overwrites_id() {
        let schema = normalize_fields(&json!({
            "title": { "type": "text", "id": "other" },
            "link": { "type": "url", "label": "Link", "default": "https://example.com" }
        }));

        let title = schema.get("title").unwrap();
        assert_eq!(title.id, "title");
        assert_eq!(title.label, "");
        assert_eq!(title.default, json!(""));

        let link = schema.get("link").unwrap();
        assert_eq!(link.label, "Link");
        assert_eq!(link.default, json!("https://example.com"));
    }

    #[test]
    fn keeps_order_unknown_types_and_extra_keys() {
        let schema = normalize_fields(&json!({
            "b": { "type": "color", "alpha": true },
            "a": { "type": "cropped_image" },
            "c": "not an object"
        }));

        let ids: Vec<_> = schema.fields().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);

        let b = schema.get("b").unwrap();
        assert_eq!(b.kind, FieldType::Unknown("color".into()));
        assert_eq!(b.extra.get("alpha"), Some(&json!(true)));

        let c = schema.get("c").unwrap();
        assert_eq!(c.kind, FieldType::Unknown(String::new()));
        assert_eq!(c.label, "");

        assert_eq!(
            schema.image_fields().iter().collect::<Vec<_>>(),
            vec!["a"]
        );
    }

    #[test]
    fn choices_keep_order_and_accept_arrays() {
        let schema = normalize_fields(&json!({
            "size": { "type": "select", "choices": { "2": "Two", "1": "One" } },
            "tone": { "type": "radio", "choices": ["Warm", "Cold"] }
        }));

        let size = schema.get("size").unwrap();
        assert_eq!(
            size.choices.iter().collect::<Vec<_>>(),
            vec![(&"2".to_string(), &"Two".to_string()), (&"1".to_string(), &"One".to_string())]
        );
        let tone = schema.get("tone").unwrap();
        assert_eq!(tone.choices.get("1").map(String::as_str), Some("Cold"));
    }

    #[test]
    fn non_object_fields_yield_empty_schema() {
        assert!(normalize_fields(&json!(null)).is_empty());
        assert!(normalize_fields(&json!(["a"])).is_empty());
    }

    #[test]
    fn schema_json_contains_normalized_keys() {
        let schema = normalize_fields(&json!({ "title": { "type": "text", "placeholder": "x" } }));
        let json = schema.to_json();
        assert_eq!(json["title"]["id"], json!("title"));
        assert_eq!(json["title"]["label"], json!(""));
        assert_eq!(json["title"]["default"], json!(""));
        assert_eq!(json["title"]["placeholder"], json!("x"));
    }

    #[test]
    fn validate_value_flags_malformed_inputs() {
        assert_eq!(validate_value(&FieldType::Url, "htp://x"), Some("invalid_url"));
        assert_eq!(validate_value(&FieldType::Url, "https://example.com"), None);
        assert_eq!(validate_value(&FieldType::Email, "nope"), Some("invalid_email"));
        assert_eq!(validate_value(&FieldType::Email, "a@example.com"), None);
        assert_eq!(validate_value(&FieldType::Date, "2025-13-01"), Some("invalid_date"));
        assert_eq!(validate_value(&FieldType::Date, "2025-02-28"), None);
        assert_eq!(validate_value(&FieldType::Text, "anything"), None);
        assert_eq!(validate_value(&FieldType::Url, "  "), None);
    }
}
