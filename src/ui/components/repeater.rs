// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! UI component for editing the rows of a repeater control.
//! The view draws whatever the row template engine produces; edits go back
//! through the control as messages.

use std::path::PathBuf;

use eframe::egui;

use crate::logic::control::RepeaterControl;
use crate::logic::template::{Control, ImagePreview, RenderedField, RenderedRow};
use crate::models::field::{FieldType, validate_value};
use crate::models::value::FieldValue;

/// UI state for one loaded repeater control.
#[derive(Clone, Default, Debug)]
pub struct RepeaterModel {
    control: Option<RepeaterControl>,
    dirty: bool,
}

impl RepeaterModel {
    pub fn control(&self) -> Option<&RepeaterControl> {
        self.control.as_ref()
    }

    /// Replace the edited control, e.g. after a document was opened.
    pub fn load(&mut self, control: RepeaterControl) {
        self.control = Some(control);
        self.dirty = false;
    }

    /// Whether rows changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

/// Messages produced by the repeater view.
#[derive(Clone, Debug, PartialEq)]
pub enum RepeaterMsg {
    AddRow,
    RemoveRow(usize),
    MoveRow { from: usize, to: usize },
    ToggleRow(usize),
    EditValue {
        row: usize,
        field: String,
        value: FieldValue,
    },
    /// Image pick for the row created with `slot`; slots survive reordering.
    ImageRequested { slot: usize, field: String },
    ImagePicked {
        slot: usize,
        field: String,
        path: PathBuf,
    },
    ImagePickCancelled,
    ImageCleared { row: usize, field: String },
}

/// Commands that require side effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepeaterCommand {
    PickImage { slot: usize, field: String },
}

/// Feedback surfaced to the status bar/modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeaterEvent {
    pub message: String,
    pub is_error: bool,
}

/// Update the model based on a message.
pub fn update(
    model: &mut RepeaterModel,
    msg: RepeaterMsg,
    cmds: &mut Vec<RepeaterCommand>,
) -> Option<RepeaterEvent> {
    let control = model.control.as_mut()?;

    match msg {
        RepeaterMsg::AddRow => {
            control.add_row();
            model.dirty = true;
            if control.limit().is_some_and(|limit| control.len() > limit as usize) {
                return control.limit_text().map(|message| RepeaterEvent {
                    message,
                    is_error: false,
                });
            }
            None
        }
        RepeaterMsg::RemoveRow(index) => {
            control.remove_row(index)?;
            model.dirty = true;
            Some(RepeaterEvent {
                message: "Row removed".to_string(),
                is_error: false,
            })
        }
        RepeaterMsg::MoveRow { from, to } => {
            if control.move_row(from, to) && from != to {
                model.dirty = true;
            }
            None
        }
        RepeaterMsg::ToggleRow(index) => {
            control.toggle_minimized(index);
            None
        }
        RepeaterMsg::EditValue { row, field, value } => {
            if control.set_value(row, &field, value) {
                model.dirty = true;
            }
            None
        }
        RepeaterMsg::ImageRequested { slot, field } => {
            cmds.push(RepeaterCommand::PickImage { slot, field });
            None
        }
        RepeaterMsg::ImagePicked { slot, field, path } => {
            let Ok(url) = url::Url::from_file_path(&path) else {
                return Some(RepeaterEvent {
                    message: format!("Cannot use {} as an image location", path.display()),
                    is_error: true,
                });
            };
            let stored = control
                .index_of_slot(slot)
                .is_some_and(|row| control.set_value(row, &field, FieldValue::Text(url.to_string())));
            if stored {
                model.dirty = true;
                None
            } else {
                Some(RepeaterEvent {
                    message: "The row for this image no longer exists.".to_string(),
                    is_error: true,
                })
            }
        }
        RepeaterMsg::ImagePickCancelled => None,
        RepeaterMsg::ImageCleared { row, field } => {
            if control.set_value(row, &field, FieldValue::from("")) {
                model.dirty = true;
            }
            None
        }
    }
}

/// Render the component and return triggered messages.
pub fn view(ui: &mut egui::Ui, model: &RepeaterModel) -> Vec<RepeaterMsg> {
    let mut msgs = Vec::new();

    let Some(control) = model.control() else {
        ui.label(
            egui::RichText::new("No repeater document loaded.")
                .italics()
                .color(egui::Color32::from_gray(110)),
        );
        return msgs;
    };

    if !control.label().is_empty() {
        ui.heading(control.label());
    }
    if !control.description().is_empty() {
        ui.label(
            egui::RichText::new(control.description())
                .small()
                .color(egui::Color32::from_gray(110)),
        );
    }
    ui.add_space(8.0);

    let rows = control.render_rows();
    if rows.is_empty() {
        ui.label(
            egui::RichText::new("No rows yet.")
                .italics()
                .color(egui::Color32::from_gray(110)),
        );
    }
    for row in &rows {
        render_row(ui, row, rows.len(), &mut msgs);
        ui.add_space(6.0);
    }

    if let Some(text) = control.limit_text() {
        let color = if control.is_at_limit() {
            egui::Color32::from_rgb(200, 120, 40)
        } else {
            egui::Color32::from_gray(110)
        };
        ui.label(egui::RichText::new(text).small().color(color));
    }

    if ui
        .button(format!(
            "{} {}",
            egui_phosphor::regular::PLUS,
            control.button_text()
        ))
        .clicked()
    {
        msgs.push(RepeaterMsg::AddRow);
    }

    msgs
}

fn render_row(ui: &mut egui::Ui, row: &RenderedRow, count: usize, msgs: &mut Vec<RepeaterMsg>) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let icon = if row.minimized {
                egui_phosphor::regular::CARET_RIGHT
            } else {
                egui_phosphor::regular::CARET_DOWN
            };
            if ui
                .add(egui::Button::new(format!("{icon} {}", row.label)).frame(false))
                .clicked()
            {
                msgs.push(RepeaterMsg::ToggleRow(row.index));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(
                        row.index + 1 < count,
                        egui::Button::new(egui_phosphor::regular::ARROW_DOWN),
                    )
                    .on_hover_text("Move down")
                    .clicked()
                {
                    msgs.push(RepeaterMsg::MoveRow {
                        from: row.index,
                        to: row.index + 1,
                    });
                }
                if ui
                    .add_enabled(
                        row.index > 0,
                        egui::Button::new(egui_phosphor::regular::ARROW_UP),
                    )
                    .on_hover_text("Move up")
                    .clicked()
                {
                    msgs.push(RepeaterMsg::MoveRow {
                        from: row.index,
                        to: row.index - 1,
                    });
                }
            });
        });

        if row.minimized {
            return;
        }

        ui.add_space(4.0);
        for field in &row.fields {
            render_field(ui, row, field, msgs);
            ui.add_space(4.0);
        }

        if ui
            .button(format!(
                "{} {}",
                egui_phosphor::regular::TRASH,
                row.remove_label
            ))
            .clicked()
        {
            msgs.push(RepeaterMsg::RemoveRow(row.index));
        }
    });
}

fn render_title(ui: &mut egui::Ui, field: &RenderedField) {
    if let Some(label) = &field.label {
        ui.label(label);
    }
    if let Some(desc) = &field.description {
        ui.label(
            egui::RichText::new(desc)
                .small()
                .color(egui::Color32::from_gray(120)),
        );
    }
}

fn render_field(
    ui: &mut egui::Ui,
    row: &RenderedRow,
    field: &RenderedField,
    msgs: &mut Vec<RepeaterMsg>,
) {
    let edit = |value: FieldValue| RepeaterMsg::EditValue {
        row: row.index,
        field: field.id.clone(),
        value,
    };

    match &field.control {
        Control::Input { value, .. } => {
            render_title(ui, field);
            let mut text = value.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut text).hint_text(field_hint(&field.kind)))
                .changed()
            {
                msgs.push(edit(FieldValue::Text(text)));
            }
            if let Some(code) = validate_value(&field.kind, value) {
                ui.label(
                    egui::RichText::new(hint_message(code))
                        .small()
                        .color(egui::Color32::from_rgb(200, 80, 80)),
                );
            }
        }
        Control::Hidden { .. } => {}
        Control::Checkbox { checked, caption } => {
            let mut on = *checked;
            if ui
                .checkbox(&mut on, caption.as_deref().unwrap_or_default())
                .changed()
            {
                msgs.push(edit(FieldValue::Bool(on)));
            }
        }
        Control::Select { options } => {
            render_title(ui, field);
            let mut current = options
                .iter()
                .find(|o| o.selected)
                .map(|o| o.value.clone())
                .unwrap_or_default();
            let selected_text = options
                .iter()
                .find(|o| o.selected)
                .map(|o| o.text.as_str())
                .unwrap_or("Select…");
            egui::ComboBox::from_id_salt(("repeater-select", row.slot, &field.id))
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for opt in options {
                        if ui
                            .selectable_value(&mut current, opt.value.clone(), &opt.text)
                            .clicked()
                        {
                            msgs.push(edit(FieldValue::Text(opt.value.clone())));
                        }
                    }
                });
        }
        Control::Radio { options, .. } => {
            render_title(ui, field);
            let mut current = options
                .iter()
                .find(|o| o.selected)
                .map(|o| o.value.clone())
                .unwrap_or_default();
            for opt in options {
                if ui
                    .radio_value(&mut current, opt.value.clone(), &opt.text)
                    .clicked()
                {
                    msgs.push(edit(FieldValue::Text(opt.value.clone())));
                }
            }
        }
        Control::RadioImage { options, .. } => {
            render_title(ui, field);
            let mut current = options
                .iter()
                .find(|o| o.checked)
                .map(|o| o.value.clone())
                .unwrap_or_default();
            ui.horizontal_wrapped(|ui| {
                for opt in options {
                    if ui
                        .radio_value(&mut current, opt.value.clone(), &opt.value)
                        .on_hover_text(&opt.src)
                        .clicked()
                    {
                        msgs.push(edit(FieldValue::Text(opt.value.clone())));
                    }
                }
            });
        }
        Control::Textarea { value, rows } => {
            render_title(ui, field);
            let mut text = value.clone();
            if ui
                .add(egui::TextEdit::multiline(&mut text).desired_rows(usize::from(*rows)))
                .changed()
            {
                msgs.push(edit(FieldValue::Text(text)));
            }
        }
        Control::Image(image) => {
            render_title(ui, field);
            match &image.preview {
                ImagePreview::Image { src } => ui.label(
                    egui::RichText::new(format!("{} {src}", egui_phosphor::regular::IMAGE)).small(),
                ),
                ImagePreview::Placeholder(text) => ui.label(
                    egui::RichText::new(text)
                        .italics()
                        .color(egui::Color32::from_gray(110)),
                ),
            };
            ui.horizontal(|ui| {
                if ui.button(&image.upload_label).clicked() {
                    msgs.push(RepeaterMsg::ImageRequested {
                        slot: row.slot,
                        field: field.id.clone(),
                    });
                }
                if image.has_value && ui.button(&image.remove_label).clicked() {
                    msgs.push(RepeaterMsg::ImageCleared {
                        row: row.index,
                        field: field.id.clone(),
                    });
                }
            });
        }
    }
}

fn field_hint(kind: &FieldType) -> &'static str {
    match kind {
        FieldType::Date => "YYYY-MM-DD",
        FieldType::Url => "https://example.com",
        FieldType::Email => "name@example.com",
        FieldType::Tel => "+1 555 0100",
        _ => "",
    }
}

fn hint_message(code: &str) -> &'static str {
    match code {
        "invalid_url" => "Expected an http/https URL.",
        "invalid_email" => "Expected an email address.",
        "invalid_date" => "Expected a date as YYYY-MM-DD.",
        _ => "Unexpected value.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_document;

    fn loaded_model() -> RepeaterModel {
        let doc = parse_document(
            r#"{
                "control": {
                    "id": "team",
                    "fields": {
                        "name": { "type": "text" },
                        "avatar": { "type": "image" }
                    },
                    "row_label": { "type": "field", "field": "name" },
                    "limit": 1
                },
                "value": [ { "name": "Ada", "avatar": "" } ]
            }"#,
        )
        .unwrap();
        let mut model = RepeaterModel::default();
        model.load(RepeaterControl::new(
            &doc.control,
            &doc.value,
            &doc.media,
            &doc.strings,
        ));
        model
    }

    #[test]
    fn messages_without_control_are_ignored() {
        let mut model = RepeaterModel::default();
        let mut cmds = Vec::new();
        assert!(update(&mut model, RepeaterMsg::AddRow, &mut cmds).is_none());
        assert!(model.control().is_none());
        assert!(cmds.is_empty());
    }

    #[test]
    fn add_row_past_limit_reports_limit_text() {
        let mut model = loaded_model();
        let event = update(&mut model, RepeaterMsg::AddRow, &mut Vec::new()).unwrap();
        assert_eq!(event.message, "Limit: 1 rows");
        assert!(!event.is_error);
        assert_eq!(model.control().unwrap().len(), 2);
        assert!(model.is_dirty());
    }

    #[test]
    fn edit_value_updates_row_label() {
        let mut model = loaded_model();
        update(
            &mut model,
            RepeaterMsg::EditValue {
                row: 0,
                field: "name".into(),
                value: FieldValue::from("Grace"),
            },
            &mut Vec::new(),
        );
        assert_eq!(
            model.control().unwrap().row_label(0).as_deref(),
            Some("Grace")
        );
    }

    #[test]
    fn image_request_enqueues_pick_command() {
        let mut model = loaded_model();
        let mut cmds = Vec::new();
        update(
            &mut model,
            RepeaterMsg::ImageRequested {
                slot: 0,
                field: "avatar".into(),
            },
            &mut cmds,
        );
        assert_eq!(
            cmds,
            vec![RepeaterCommand::PickImage {
                slot: 0,
                field: "avatar".into()
            }]
        );
    }

    #[test]
    fn picked_image_is_stored_as_file_url() {
        let mut model = loaded_model();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("face.png");
        let event = update(
            &mut model,
            RepeaterMsg::ImagePicked {
                slot: 0,
                field: "avatar".into(),
                path,
            },
            &mut Vec::new(),
        );
        assert!(event.is_none());
        let value = model.control().unwrap().row(0).unwrap()["avatar"].display();
        assert!(value.starts_with("file://"));
        assert!(value.ends_with("face.png"));
    }

    #[test]
    fn picked_image_for_removed_row_is_an_error() {
        let mut model = loaded_model();
        update(&mut model, RepeaterMsg::RemoveRow(0), &mut Vec::new());
        let tmp = tempfile::TempDir::new().unwrap();
        let event = update(
            &mut model,
            RepeaterMsg::ImagePicked {
                slot: 0,
                field: "avatar".into(),
                path: tmp.path().join("face.png"),
            },
            &mut Vec::new(),
        )
        .unwrap();
        assert!(event.is_error);
    }

    #[test]
    fn picked_image_follows_its_row_after_removal() {
        let mut model = loaded_model();
        update(&mut model, RepeaterMsg::AddRow, &mut Vec::new());
        update(
            &mut model,
            RepeaterMsg::EditValue {
                row: 1,
                field: "name".into(),
                value: FieldValue::from("Grace"),
            },
            &mut Vec::new(),
        );
        let grace_slot = model.control().unwrap().render_row(1).unwrap().slot;

        let mut cmds = Vec::new();
        update(
            &mut model,
            RepeaterMsg::ImageRequested {
                slot: 0,
                field: "avatar".into(),
            },
            &mut cmds,
        );
        update(&mut model, RepeaterMsg::RemoveRow(0), &mut Vec::new());

        let tmp = tempfile::TempDir::new().unwrap();
        let Some(RepeaterCommand::PickImage { slot, field }) = cmds.pop() else {
            panic!("expected pick command");
        };
        let event = update(
            &mut model,
            RepeaterMsg::ImagePicked {
                slot,
                field,
                path: tmp.path().join("ada.png"),
            },
            &mut Vec::new(),
        )
        .unwrap();
        assert!(event.is_error);

        let control = model.control().unwrap();
        assert_eq!(control.len(), 1);
        assert_eq!(control.row_label(0).as_deref(), Some("Grace"));
        assert_eq!(control.row(0).unwrap()["avatar"].display(), "");

        let event = update(
            &mut model,
            RepeaterMsg::ImagePicked {
                slot: grace_slot,
                field: "avatar".into(),
                path: tmp.path().join("grace.png"),
            },
            &mut Vec::new(),
        );
        assert!(event.is_none());
        let avatar = model.control().unwrap().row(0).unwrap()["avatar"].display();
        assert!(avatar.ends_with("grace.png"));
    }

    #[test]
    fn remove_out_of_range_is_silent() {
        let mut model = loaded_model();
        assert!(update(&mut model, RepeaterMsg::RemoveRow(9), &mut Vec::new()).is_none());
        assert!(!model.is_dirty());
    }
}
