// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Repeater configuration and the document file that carries it.
//!
//! A document bundles the control configuration with the stored value, the
//! media table used to resolve legacy image ids, and optional string overrides:
//!
//! ```json
//! {
//!   "control": { "id": "slides", "fields": { "title": { "type": "text" } }, "limit": 3 },
//!   "value": [ { "title": "First" } ],
//!   "media": { "12": "https://example.com/12.jpg" },
//!   "strings": { "row": "Slide" }
//! }
//! ```
//!
//! Every section is optional; sub-sections the control cannot interpret degrade
//! to defaults instead of failing the load.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::l10n::Strings;
use crate::logic::reconcile::MediaLibrary;
use crate::models::value::integer_of;

/// Construction arguments of one repeater control.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub id: String,
    pub label: String,
    pub description: String,
    pub tooltip: String,
    /// Field definitions keyed by id, normalized by the control.
    pub fields: Value,
    /// Raw `{type, value, field}` row label settings.
    pub row_label: Value,
    /// Soft cap on the number of rows, shown to the user only.
    #[serde(deserialize_with = "lenient_limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Add button caption; derived from the row label when empty.
    pub button_label: String,
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(integer_of)
        .and_then(|n| u32::try_from(n).ok()))
}

/// A control configuration together with its stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub control: ControlConfig,
    pub value: Value,
    pub media: MediaLibrary,
    pub strings: Strings,
}

/// Parse a document from JSON text.
pub fn parse_document(json: &str) -> Result<Document> {
    serde_json::from_str(json).context("Failed to parse repeater document JSON")
}

/// Read and parse a document file.
pub fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let doc = parse_document(&content)?;
    log::info!(
        "loaded repeater document {} ({} field definition(s))",
        path.display(),
        doc.control.fields.as_object().map_or(0, |f| f.len())
    );
    Ok(doc)
}

/// Write a document file as pretty-printed JSON.
pub fn save_document(path: &Path, doc: &Document) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("Failed to serialize document")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write document {}", path.display()))?;
    log::info!("saved repeater document {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::reconcile::MediaResolver;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn empty_document_uses_defaults() {
        let doc = parse_document("{}").unwrap();
        assert_eq!(doc.control, ControlConfig::default());
        assert!(doc.value.is_null());
        assert!(doc.media.is_empty());
        assert_eq!(doc.strings, Strings::english());
    }

    #[test]
    fn limit_accepts_numbers_and_numeric_strings() {
        let doc = parse_document(r#"{"control":{"limit":"3"}}"#).unwrap();
        assert_eq!(doc.control.limit, Some(3));
        let doc = parse_document(r#"{"control":{"limit":-1}}"#).unwrap();
        assert_eq!(doc.control.limit, None);
        let doc = parse_document(r#"{"control":{"limit":"many"}}"#).unwrap();
        assert_eq!(doc.control.limit, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_document("{").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn document_round_trips_through_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slides.json");

        let doc = parse_document(
            &json!({
                "control": {
                    "id": "slides",
                    "fields": { "title": { "type": "text" }, "photo": { "type": "image" } },
                    "row_label": { "type": "field", "field": "title" },
                    "limit": 2
                },
                "value": [ { "title": "One", "photo": "12" } ],
                "media": { "12": "https://example.com/12.jpg" }
            })
            .to_string(),
        )
        .unwrap();

        save_document(&path, &doc).unwrap();
        let loaded = load_document(&path).unwrap();

        assert_eq!(loaded, doc);
        assert_eq!(
            loaded.media.attachment_url(12).as_deref(),
            Some("https://example.com/12.jpg")
        );
        let ids: Vec<_> = loaded.control.fields.as_object().unwrap().keys().collect();
        assert_eq!(ids, vec!["title", "photo"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let err = load_document(&tmp.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
