// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Collection controller: owns the ordered rows of one repeater control.

use ammonia::clean_text;
use serde::Serialize;
use serde_json::Value;

use crate::config::ControlConfig;
use crate::l10n::{Localization, Strings};
use crate::logic::reconcile::{MediaResolver, reconcile, to_stored};
use crate::logic::template::{ButtonLabels, RenderedRow, RowContext, render_row};
use crate::models::field::{Schema, normalize_fields};
use crate::models::row_label::{RowLabelPolicy, resolve_row_label};
use crate::models::value::{Collection, FieldValue, Row};

/// One row plus its view-only state.
#[derive(Clone, Debug, PartialEq)]
struct RowState {
    slot: usize,
    values: Row,
    minimized: bool,
}

/// A repeater control instance.
///
/// Built once from its configuration and stored value; every instance
/// normalizes its own schema and keeps its own string bundle.
#[derive(Clone, Debug)]
pub struct RepeaterControl {
    id: String,
    label: String,
    description: String,
    tooltip: String,
    schema: Schema,
    row_label: RowLabelPolicy,
    strings: Strings,
    labels: ButtonLabels,
    button_text: String,
    button_label: String,
    limit: Option<u32>,
    rows: Vec<RowState>,
    next_slot: usize,
}

/// Client payload mirroring what the control hands to its template.
#[derive(Debug, Serialize)]
pub struct ControlJson<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub description: &'a str,
    pub fields: Value,
    #[serde(rename = "buttonLabels")]
    pub button_labels: &'a ButtonLabels,
    pub row_label: &'a RowLabelPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub value: Value,
}

impl RepeaterControl {
    /// Build a control: normalize the schema, resolve the row label policy and
    /// reconcile the stored value. Media lookups happen here and only here.
    pub fn new(
        config: &ControlConfig,
        raw_value: &Value,
        media: &dyn MediaResolver,
        l10n: &dyn Localization,
    ) -> Self {
        let strings = l10n.strings();
        let schema = normalize_fields(&config.fields);
        let row_label = resolve_row_label(&config.row_label, &schema, &strings);
        let button_text = if config.button_label.trim().is_empty() {
            format!("{} {}", strings.add_new, row_label.text)
        } else {
            config.button_label.clone()
        };
        let button_label = clean_text(&button_text);

        let rows: Vec<RowState> = reconcile(raw_value, &schema, media)
            .into_iter()
            .enumerate()
            .map(|(slot, values)| RowState {
                slot,
                values,
                minimized: true,
            })
            .collect();

        log::debug!(
            "repeater {}: {} field(s), {} row(s)",
            config.id,
            schema.len(),
            rows.len()
        );

        Self {
            id: config.id.clone(),
            label: config.label.clone(),
            description: config.description.clone(),
            tooltip: config.tooltip.clone(),
            labels: ButtonLabels::from_strings(&strings),
            next_slot: rows.len(),
            schema,
            row_label,
            strings,
            button_text,
            button_label,
            limit: config.limit,
            rows,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_label_policy(&self) -> &RowLabelPolicy {
        &self.row_label
    }

    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    pub fn button_labels(&self) -> &ButtonLabels {
        &self.labels
    }

    /// Caption of the "add row" button, escaped for markup.
    pub fn button_label(&self) -> &str {
        &self.button_label
    }

    /// Caption of the "add row" button as configured.
    pub fn button_text(&self) -> &str {
        &self.button_text
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index).map(|r| &r.values)
    }

    /// Current position of the row created with `slot`, if it still exists.
    pub fn index_of_slot(&self, slot: usize) -> Option<usize> {
        self.rows.iter().position(|r| r.slot == slot)
    }

    /// Current rows in display order.
    pub fn collection(&self) -> Collection {
        self.rows.iter().map(|r| r.values.clone()).collect()
    }

    /// Append a row holding every field's default and return its index.
    pub fn add_row(&mut self) -> usize {
        let values = self
            .schema
            .fields()
            .map(|field| {
                (
                    field.id.clone(),
                    FieldValue::from_json(&field.default, field.kind.is_image()),
                )
            })
            .collect();
        self.rows.push(RowState {
            slot: self.next_slot,
            values,
            minimized: false,
        });
        self.next_slot += 1;
        self.rows.len() - 1
    }

    /// Remove the row at `index`; later rows shift down by one.
    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        if index >= self.rows.len() {
            return None;
        }
        Some(self.rows.remove(index).values)
    }

    /// Move a row to a new position, keeping the relative order of all others.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rows.len() || to >= self.rows.len() {
            return false;
        }
        if from != to {
            let row = self.rows.remove(from);
            self.rows.insert(to, row);
        }
        true
    }

    /// Replace one field value in a row. Only schema fields can be edited.
    pub fn set_value(&mut self, index: usize, field: &str, value: FieldValue) -> bool {
        if !self.schema.contains(field) {
            return false;
        }
        match self.rows.get_mut(index) {
            Some(row) => {
                row.values.insert(field.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Flip the collapsed state of a row. Not part of the stored value.
    pub fn toggle_minimized(&mut self, index: usize) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.minimized = !row.minimized;
                true
            }
            None => false,
        }
    }

    pub fn is_minimized(&self, index: usize) -> Option<bool> {
        self.rows.get(index).map(|r| r.minimized)
    }

    /// Header label of a row, from its current values.
    pub fn row_label(&self, index: usize) -> Option<String> {
        self.rows
            .get(index)
            .map(|r| self.row_label.label_for(&r.values))
    }

    pub fn render_row(&self, index: usize) -> Option<RenderedRow> {
        self.rows.get(index).map(|row| self.render_state(index, row))
    }

    pub fn render_rows(&self) -> Vec<RenderedRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.render_state(index, row))
            .collect()
    }

    fn render_state(&self, index: usize, row: &RowState) -> RenderedRow {
        render_row(
            RowContext {
                index,
                slot: row.slot,
                values: &row.values,
                minimized: row.minimized,
            },
            &self.schema,
            &self.row_label,
            &self.labels,
        )
    }

    /// Stored shape of the collection.
    pub fn serialize(&self) -> Value {
        to_stored(
            &self
                .rows
                .iter()
                .map(|r| r.values.clone())
                .collect::<Vec<_>>(),
        )
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Informational limit text, when a limit is configured.
    pub fn limit_text(&self) -> Option<String> {
        self.limit.map(|limit| self.strings.limit_rows(limit))
    }

    /// Whether the row count reached the configured limit. Adding stays possible.
    pub fn is_at_limit(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.rows.len() >= limit as usize)
    }

    /// Payload for a client-side template.
    pub fn to_json(&self) -> ControlJson<'_> {
        ControlJson {
            id: &self.id,
            label: &self.label,
            description: &self.description,
            fields: self.schema.to_json(),
            button_labels: &self.labels,
            row_label: &self.row_label,
            limit: self.limit,
            value: self.serialize(),
        }
    }
}
