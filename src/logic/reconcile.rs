// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reconcile stored repeater values with the current schema.
//!
//! Older stores kept image fields as a bare attachment id (or a URL); the
//! current shape is `{id, url}`. Both are accepted here without rewriting
//! anything that cannot be resolved.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::field::Schema;
use crate::models::value::{Collection, FieldValue, ImageRef, Row, integer_of};

/// Looks up the public URL of a media attachment.
pub trait MediaResolver {
    fn attachment_url(&self, id: i64) -> Option<String>;
}

impl<F> MediaResolver for F
where
    F: Fn(i64) -> Option<String>,
{
    fn attachment_url(&self, id: i64) -> Option<String> {
        self(id)
    }
}

/// Attachment id to URL table loaded alongside the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaLibrary {
    entries: HashMap<i64, String>,
}

impl MediaLibrary {
    pub fn insert(&mut self, id: i64, url: impl Into<String>) {
        self.entries.insert(id, url.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MediaResolver for MediaLibrary {
    fn attachment_url(&self, id: i64) -> Option<String> {
        self.entries.get(&id).filter(|url| !url.is_empty()).cloned()
    }
}

/// Build resolved rows from the raw stored collection.
///
/// Anything other than a non-empty array yields no rows. Row order and key
/// order are kept; only image fields holding an integer-looking value are
/// looked up, once each. A miss keeps the stored value as it was.
///
/// Known limitation: a purely numeric string in an image field is always taken
/// for an attachment id, even when it was meant as a URL.
pub fn reconcile(raw: &Value, schema: &Schema, media: &dyn MediaResolver) -> Collection {
    let Some(rows) = raw.as_array() else {
        if !raw.is_null() {
            log::warn!("stored repeater value is not an array; starting with no rows");
        }
        return Collection::new();
    };

    rows.iter()
        .enumerate()
        .map(|(idx, row)| match row.as_object() {
            Some(values) => values
                .iter()
                .map(|(key, value)| {
                    let resolved = if schema.is_image_field(key) {
                        resolve_image(value, media)
                    } else {
                        FieldValue::from_json(value, false)
                    };
                    (key.clone(), resolved)
                })
                .collect::<Row>(),
            None => {
                log::warn!("stored row {idx} is not an object; keeping it as an empty row");
                Row::new()
            }
        })
        .collect()
}

/// Resolve one image field value; non-numeric values pass through.
fn resolve_image(value: &Value, media: &dyn MediaResolver) -> FieldValue {
    let Some(id) = integer_of(value) else {
        return FieldValue::from_json(value, true);
    };

    match media.attachment_url(id) {
        Some(url) => FieldValue::Image(ImageRef::new(id, url)),
        None => {
            log::debug!("attachment {id} did not resolve; keeping stored value");
            FieldValue::from_json(value, true)
        }
    }
}

/// Stored JSON shape of a collection.
pub fn to_stored(rows: &[Row]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| {
                Value::Object(
                    row.iter()
                        .map(|(key, value)| (key.clone(), value.to_json()))
                        .collect(),
                )
            })
            .collect(),
    )
}
