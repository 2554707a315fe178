// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! User-facing strings for the repeater control.
//! A bundle is loaded once when a control is built and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Localized strings consumed by the row label resolver and the template engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Strings {
    pub row: String,
    pub add_new: String,
    pub add_image: String,
    pub remove: String,
    pub change_image: String,
    pub no_image_selected: String,
    /// Format string with a single `%s` (or `%d`) placeholder for the row limit.
    pub limit_rows: String,
}

impl Default for Strings {
    fn default() -> Self {
        Self::english()
    }
}

impl Strings {
    /// Built-in English bundle.
    pub fn english() -> Self {
        Self {
            row: "Row".into(),
            add_new: "Add new".into(),
            add_image: "Select Image".into(),
            remove: "Remove".into(),
            change_image: "Change Image".into(),
            no_image_selected: "No Image Selected".into(),
            limit_rows: "Limit: %s rows".into(),
        }
    }

    /// Format the `limit-rows` message for the given limit.
    pub fn limit_rows(&self, limit: u32) -> String {
        let n = limit.to_string();
        if self.limit_rows.contains("%s") {
            self.limit_rows.replacen("%s", &n, 1)
        } else if self.limit_rows.contains("%d") {
            self.limit_rows.replacen("%d", &n, 1)
        } else {
            format!("{} {}", self.limit_rows, n).trim().to_string()
        }
    }
}

/// Source of localized strings for a control instance.
pub trait Localization {
    fn strings(&self) -> Strings;
}

impl Localization for Strings {
    fn strings(&self) -> Strings {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_rows_substitutes_placeholder() {
        let strings = Strings::english();
        assert_eq!(strings.limit_rows(5), "Limit: 5 rows");

        let custom = Strings {
            limit_rows: "Max %d".into(),
            ..Strings::english()
        };
        assert_eq!(custom.limit_rows(3), "Max 3");
    }

    #[test]
    fn partial_bundle_falls_back_to_english() {
        let strings: Strings = serde_json::from_str(r#"{"row":"Zeile","add-new":"Neu"}"#).unwrap();
        assert_eq!(strings.row, "Zeile");
        assert_eq!(strings.add_new, "Neu");
        assert_eq!(strings.remove, "Remove");
        assert_eq!(strings.no_image_selected, "No Image Selected");
    }
}
