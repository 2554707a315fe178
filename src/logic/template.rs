// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Row template engine: projects one row's values and the field schema into a
//! renderable row. Rendering is pure and dispatches on the field type through
//! [`render_rule`]; types without a rule render nothing.

use serde::Serialize;

use crate::l10n::Strings;
use crate::models::field::{FieldSchema, FieldType, Schema};
use crate::models::row_label::RowLabelPolicy;
use crate::models::value::{FieldValue, Row};

/// Labels used by image fields and the row remove button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonLabels {
    pub default: String,
    pub remove: String,
    pub change: String,
    pub placeholder: String,
}

impl ButtonLabels {
    pub fn from_strings(strings: &Strings) -> Self {
        Self {
            default: strings.add_image.clone(),
            remove: strings.remove.clone(),
            change: strings.change_image.clone(),
            placeholder: strings.no_image_selected.clone(),
        }
    }
}

/// Per-row input to the template engine.
#[derive(Clone, Copy, Debug)]
pub struct RowContext<'a> {
    /// Position of the row in the collection.
    pub index: usize,
    /// Render index, unique per control instance and never reused.
    pub slot: usize,
    pub values: &'a Row,
    pub minimized: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedRow {
    pub index: usize,
    pub slot: usize,
    /// Header text, evaluated from the row's current values.
    pub label: String,
    pub minimized: bool,
    pub fields: Vec<RenderedField>,
    pub remove_label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedField {
    pub id: String,
    pub kind: FieldType,
    pub label: Option<String>,
    pub description: Option<String>,
    pub control: Control,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    /// `text`, `url`, `email`, `tel` and `date` inputs.
    Input { input_type: String, value: String },
    Hidden { value: Option<String> },
    /// The field description is shown inline as the caption.
    Checkbox { checked: bool, caption: Option<String> },
    Select { options: Vec<ChoiceOption> },
    Radio { name: String, options: Vec<ChoiceOption> },
    RadioImage { name: String, options: Vec<ImageChoice> },
    Textarea { value: String, rows: u8 },
    Image(ImageControl),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageChoice {
    /// `{field}_{slot}_{choice}`, distinct across rows.
    pub dom_id: String,
    pub value: String,
    pub src: String,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImagePreview {
    Image { src: String },
    Placeholder(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageControl {
    pub preview: ImagePreview,
    /// Placeholder text exposed to the client even when an image is shown.
    pub placeholder: String,
    pub has_value: bool,
    pub remove_label: String,
    /// Current upload button caption ("Select Image" or "Change Image").
    pub upload_label: String,
    pub select_label: String,
    pub change_label: String,
    /// Serializable companion value: the attachment id when known, else the raw scalar.
    pub hidden_value: String,
}

/// Shared signature of every render rule so the per-type table stays a plain
/// `match`. Most rules ignore the row context and button labels; radio-image
/// needs the slot and image needs the labels.
type RenderFn = fn(&FieldSchema, &FieldValue, &RowContext<'_>, &ButtonLabels) -> RenderedField;

/// Render rule for a field type; `None` means the field is skipped.
pub fn render_rule(kind: &FieldType) -> Option<RenderFn> {
    match kind {
        FieldType::Text | FieldType::Url | FieldType::Email | FieldType::Tel | FieldType::Date => {
            Some(render_input as RenderFn)
        }
        FieldType::Hidden => Some(render_hidden as RenderFn),
        FieldType::Checkbox => Some(render_checkbox as RenderFn),
        FieldType::Select => Some(render_select as RenderFn),
        FieldType::Radio => Some(render_radio as RenderFn),
        FieldType::RadioImage => Some(render_radio_image as RenderFn),
        FieldType::Textarea => Some(render_textarea as RenderFn),
        FieldType::Image | FieldType::CroppedImage => Some(render_image as RenderFn),
        FieldType::Unknown(_) => None,
    }
}

/// Render one row. Used for stored rows and freshly added ones alike.
pub fn render_row(
    ctx: RowContext<'_>,
    schema: &Schema,
    policy: &RowLabelPolicy,
    labels: &ButtonLabels,
) -> RenderedRow {
    let fields = schema
        .fields()
        .filter_map(|field| {
            let Some(rule) = render_rule(&field.kind) else {
                log::trace!("skipping field {} of type {}", field.id, field.kind.as_str());
                return None;
            };
            let value = current_value(field, ctx.values);
            Some(rule(field, &value, &ctx, labels))
        })
        .collect();

    RenderedRow {
        index: ctx.index,
        slot: ctx.slot,
        label: policy.label_for(ctx.values),
        minimized: ctx.minimized,
        fields,
        remove_label: labels.remove.clone(),
    }
}

/// The row's value for a field, or the field's default when the row lacks it.
pub fn current_value(field: &FieldSchema, values: &Row) -> FieldValue {
    values
        .get(&field.id)
        .cloned()
        .unwrap_or_else(|| FieldValue::from_json(&field.default, field.kind.is_image()))
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Field wrapper with the label and description shown only when non-empty.
fn titled(field: &FieldSchema, control: Control) -> RenderedField {
    RenderedField {
        id: field.id.clone(),
        kind: field.kind.clone(),
        label: non_empty(&field.label),
        description: field.description.as_deref().and_then(non_empty),
        control,
    }
}

fn untitled(field: &FieldSchema, control: Control) -> RenderedField {
    RenderedField {
        id: field.id.clone(),
        kind: field.kind.clone(),
        label: None,
        description: None,
        control,
    }
}

fn choice_options(field: &FieldSchema, value: &FieldValue) -> Vec<ChoiceOption> {
    field
        .choices
        .iter()
        .map(|(key, text)| ChoiceOption {
            value: key.clone(),
            text: text.clone(),
            selected: value.matches_key(key),
        })
        .collect()
}

fn render_input(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    titled(
        field,
        Control::Input {
            input_type: field.kind.as_str().to_string(),
            value: value.display(),
        },
    )
}

fn render_hidden(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    untitled(
        field,
        Control::Hidden {
            value: value.is_truthy().then(|| value.display()),
        },
    )
}

fn render_checkbox(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    untitled(
        field,
        Control::Checkbox {
            checked: value.is_truthy(),
            caption: field.description.as_deref().and_then(non_empty),
        },
    )
}

fn render_select(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    titled(
        field,
        Control::Select {
            options: choice_options(field, value),
        },
    )
}

fn render_radio(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    titled(
        field,
        Control::Radio {
            name: field.id.clone(),
            options: choice_options(field, value),
        },
    )
}

fn render_radio_image(
    field: &FieldSchema,
    value: &FieldValue,
    ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    let options = field
        .choices
        .iter()
        .map(|(key, src)| ImageChoice {
            dom_id: format!("{}_{}_{}", field.id, ctx.slot, key),
            value: key.clone(),
            src: src.clone(),
            checked: value.matches_key(key),
        })
        .collect();

    titled(
        field,
        Control::RadioImage {
            name: format!("{}{}", field.id, ctx.slot),
            options,
        },
    )
}

fn render_textarea(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    _labels: &ButtonLabels,
) -> RenderedField {
    titled(
        field,
        Control::Textarea {
            value: value.display(),
            rows: 5,
        },
    )
}

fn render_image(
    field: &FieldSchema,
    value: &FieldValue,
    _ctx: &RowContext<'_>,
    labels: &ButtonLabels,
) -> RenderedField {
    let has_value = value.is_truthy();
    let preview = match value.as_image() {
        Some(image) => ImagePreview::Image {
            src: image.url.clone(),
        },
        None if has_value => ImagePreview::Image {
            src: value.display(),
        },
        None => ImagePreview::Placeholder(labels.placeholder.clone()),
    };
    let hidden_value = match value.as_image().and_then(|image| image.id) {
        Some(id) => id.to_string(),
        None => value.display(),
    };

    titled(
        field,
        Control::Image(ImageControl {
            preview,
            placeholder: labels.placeholder.clone(),
            has_value,
            remove_label: labels.remove.clone(),
            upload_label: if has_value {
                labels.change.clone()
            } else {
                labels.default.clone()
            },
            select_label: labels.default.clone(),
            change_label: labels.change.clone(),
            hidden_value,
        }),
    )
}
