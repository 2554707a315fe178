// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Row header label policy: fixed text, or the live value of one field in the row.

use ammonia::clean_text;
use serde::Serialize;
use serde_json::Value;

use crate::l10n::Strings;
use crate::models::field::Schema;
use crate::models::value::Row;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowLabelMode {
    #[default]
    Text,
    Field,
}

/// Resolved label policy for every row of one control.
///
/// `value` and `field` hold the attribute-escaped forms handed to clients;
/// `text` keeps the configured label as written for native display.
/// `mode == Field` only ever appears together with a `field` that exists in the schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowLabelPolicy {
    #[serde(rename = "type")]
    pub mode: RowLabelMode,
    pub value: String,
    pub field: Option<String>,
    #[serde(skip)]
    pub text: String,
}

impl RowLabelPolicy {
    /// Plain text policy using the given label.
    pub fn text(value: impl Into<String>) -> Self {
        let text = value.into();
        Self {
            mode: RowLabelMode::Text,
            value: clean_text(&text),
            field: None,
            text,
        }
    }

    /// Header label for a row, computed from its current values.
    ///
    /// In `Field` mode an empty or missing source value falls back to the policy text.
    pub fn label_for(&self, row: &Row) -> String {
        if self.mode == RowLabelMode::Field
            && let Some(field) = &self.field
            && let Some(value) = row.get(field)
        {
            let text = value.display();
            if !text.trim().is_empty() {
                return text;
            }
        }
        self.text.clone()
    }
}

/// Resolve the raw `row_label` configuration against a normalized schema.
///
/// Each step degrades on its own and nothing here fails:
/// 1. `type` is adopted only when it is exactly `"text"` or `"field"`.
/// 2. a non-blank `value` replaces the localized default label, escaped.
/// 3. `field` is escaped and adopted only when that escaped key names a schema
///    field; otherwise the mode is forced back to `Text`, whatever step 1 decided.
///
/// Blank means missing, `""`, `"0"`, zero or `false`.
pub fn resolve_row_label(raw: &Value, schema: &Schema, strings: &Strings) -> RowLabelPolicy {
    let mut policy = RowLabelPolicy::text(strings.row.clone());

    if let Some(mode) = raw.get("type").and_then(Value::as_str) {
        match mode {
            "text" => policy.mode = RowLabelMode::Text,
            "field" => policy.mode = RowLabelMode::Field,
            _ => {}
        }
    }

    if let Some(text) = raw.get("value").and_then(setting_text) {
        policy.value = clean_text(&text);
        policy.text = text;
    }

    let field = raw
        .get("field")
        .and_then(setting_text)
        .map(|f| clean_text(&f))
        .filter(|f| schema.contains(f));
    match field {
        Some(field) => policy.field = Some(field),
        None => {
            if policy.mode == RowLabelMode::Field {
                log::debug!("row_label.field missing or unknown; using text labels");
            }
            policy.mode = RowLabelMode::Text;
        }
    }

    policy
}

/// Text of a scalar setting, or `None` when it counts as blank.
fn setting_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => return None,
    };
    (!text.is_empty() && text != "0").then_some(text)
}
