// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring the repeater component, document I/O and commands.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{Document, load_document, save_document};
use crate::logic::control::RepeaterControl;
use crate::logic::html::render_control_html;
use crate::ui::components::repeater::{self, RepeaterCommand, RepeaterModel, RepeaterMsg};

/// Top-level application state.
#[derive(Default)]
pub struct AppModel {
    /// File the current document was loaded from.
    pub document_path: Option<PathBuf>,
    /// Loaded document; its `value` is refreshed from the control on save.
    pub document: Option<Document>,
    /// Repeater editor state.
    pub repeater: RepeaterModel,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

/// Application messages routed through the update function.
pub enum Msg {
    OpenRequested,
    OpenCancelled,
    DocumentLoaded { path: PathBuf, document: Document },
    DocumentFailed(String),
    SaveRequested(PathBuf),
    SaveCancelled,
    SaveCompleted(Result<PathBuf, String>),
    ExportRequested(PathBuf),
    ExportCompleted(Result<PathBuf, String>),
    DismissError,
    Repeater(RepeaterMsg),
}

/// Commands represent side-effects executed between frames.
pub enum Command {
    PickDocument,
    LoadDocument(PathBuf),
    PickImage { slot: usize, field: String },
    SaveDocument(SavePayload),
    ExportHtml { path: PathBuf, html: String },
}

/// Captured data for saving.
pub struct SavePayload {
    /// Target file on disk.
    pub output: PathBuf,
    /// Document with the serialized collection as its value.
    pub document: Document,
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::OpenRequested => cmds.push(Command::PickDocument),
        Msg::OpenCancelled => surface_event(model, "Open cancelled.".to_string(), false),
        Msg::DocumentLoaded { path, document } => {
            let control = RepeaterControl::new(
                &document.control,
                &document.value,
                &document.media,
                &document.strings,
            );
            let rows = control.len();
            model.repeater.load(control);
            model.document = Some(document);
            surface_event(
                model,
                format!("Loaded {} row(s) from {}", rows, path.display()),
                false,
            );
            model.document_path = Some(path);
        }
        Msg::DocumentFailed(err) => surface_event(model, err, true),
        Msg::DismissError => model.error = None,
        Msg::Repeater(m) => {
            let mut repeater_cmds = Vec::new();
            if let Some(event) = repeater::update(&mut model.repeater, m, &mut repeater_cmds) {
                surface_event(model, event.message, event.is_error);
            }
            for c in repeater_cmds {
                match c {
                    RepeaterCommand::PickImage { slot, field } => {
                        cmds.push(Command::PickImage { slot, field })
                    }
                }
            }
        }
        Msg::SaveRequested(output) => match prepare_save(model, output) {
            Ok(payload) => cmds.push(Command::SaveDocument(payload)),
            Err(err) => surface_event(model, err, true),
        },
        Msg::SaveCancelled => surface_event(model, "Save cancelled.".to_string(), false),
        Msg::SaveCompleted(result) => match result {
            Ok(path) => {
                model.repeater.mark_saved();
                surface_event(model, format!("Document saved: {}", path.display()), false);
                model.document_path = Some(path);
            }
            Err(err) => surface_event(model, format!("Failed to save document:\n\n{err}"), true),
        },
        Msg::ExportRequested(path) => match model.repeater.control() {
            Some(control) => cmds.push(Command::ExportHtml {
                path,
                html: render_control_html(control),
            }),
            None => surface_event(model, "Open a document before exporting.".to_string(), true),
        },
        Msg::ExportCompleted(result) => match result {
            Ok(path) => surface_event(model, format!("HTML exported: {}", path.display()), false),
            Err(err) => surface_event(model, format!("Failed to export HTML:\n\n{err}"), true),
        },
    }
}

/// Execute a command synchronously and return a resulting message.
pub fn run_command(cmd: Command) -> Msg {
    match cmd {
        Command::PickDocument => {
            let file = rfd::FileDialog::new()
                .set_title("Open repeater document")
                .add_filter("JSON", &["json"])
                .pick_file();
            match file {
                Some(path) => load_message(path),
                None => Msg::OpenCancelled,
            }
        }
        Command::LoadDocument(path) => load_message(path),
        Command::PickImage { slot, field } => {
            let file = rfd::FileDialog::new()
                .set_title("Select image")
                .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "svg"])
                .pick_file();
            match file {
                Some(path) => Msg::Repeater(RepeaterMsg::ImagePicked { slot, field, path }),
                None => Msg::Repeater(RepeaterMsg::ImagePickCancelled),
            }
        }
        Command::SaveDocument(payload) => {
            let res = save_document(&payload.output, &payload.document).map(|_| payload.output);
            Msg::SaveCompleted(res.map_err(|e| format!("{e:#}")))
        }
        Command::ExportHtml { path, html } => {
            let res = write_html(&path, &html).map(|_| path);
            Msg::ExportCompleted(res.map_err(|e| format!("{e:#}")))
        }
    }
}

fn load_message(path: PathBuf) -> Msg {
    match load_document(&path) {
        Ok(document) => Msg::DocumentLoaded { path, document },
        Err(err) => Msg::DocumentFailed(format!("{err:#}")),
    }
}

fn write_html(path: &Path, html: &str) -> anyhow::Result<()> {
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        log::warn!("{message}");
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}

/// Build the payload required to save the current document.
fn prepare_save(model: &AppModel, output: PathBuf) -> Result<SavePayload, String> {
    let (Some(document), Some(control)) = (&model.document, model.repeater.control()) else {
        return Err("Open a document before saving.".into());
    };

    let mut document = document.clone();
    document.value = control.serialize();

    Ok(SavePayload { output, document })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_document;
    use serde_json::json;
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "control": {
            "id": "slides",
            "fields": {
                "title": { "type": "text", "default": "New slide" },
                "photo": { "type": "image" }
            },
            "row_label": { "type": "field", "field": "title" }
        },
        "value": [ { "title": "Intro", "photo": "3" } ],
        "media": { "3": "https://example.com/3.jpg" }
    }"#;

    fn write_doc(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("slides.json");
        std::fs::write(&path, DOC).unwrap();
        path
    }

    fn open(model: &mut AppModel, path: PathBuf) {
        let msg = run_command(Command::LoadDocument(path));
        update(model, msg, &mut Vec::new());
    }

    #[test]
    fn load_command_populates_repeater() {
        let tmp = TempDir::new().unwrap();
        let mut model = AppModel::default();
        open(&mut model, write_doc(&tmp));

        assert!(model.error.is_none());
        let control = model.repeater.control().unwrap();
        assert_eq!(control.len(), 1);
        assert_eq!(control.row_label(0).as_deref(), Some("Intro"));
        assert!(model.status.as_deref().unwrap().contains("Loaded 1 row(s)"));
    }

    #[test]
    fn load_failure_sets_error() {
        let tmp = TempDir::new().unwrap();
        let mut model = AppModel::default();
        open(&mut model, tmp.path().join("missing.json"));

        assert!(model.repeater.control().is_none());
        assert!(model.error.as_deref().unwrap().contains("missing.json"));
    }

    #[test]
    fn save_request_enqueues_and_completes() {
        let tmp = TempDir::new().unwrap();
        let mut model = AppModel::default();
        open(&mut model, write_doc(&tmp));

        update(&mut model, Msg::Repeater(RepeaterMsg::AddRow), &mut Vec::new());
        assert!(model.repeater.is_dirty());

        let output = tmp.path().join("saved.json");
        let mut cmds = Vec::new();
        update(&mut model, Msg::SaveRequested(output.clone()), &mut cmds);
        assert_eq!(cmds.len(), 1, "save should enqueue command");

        let msg = run_command(cmds.pop().unwrap());
        update(&mut model, msg, &mut Vec::new());

        assert!(model.error.is_none());
        assert!(!model.repeater.is_dirty());
        let saved = parse_document(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            saved.value,
            json!([
                { "title": "Intro", "photo": { "id": 3, "url": "https://example.com/3.jpg" } },
                { "title": "New slide", "photo": "" }
            ])
        );
        assert_eq!(saved.control.id, "slides");
    }

    #[test]
    fn save_without_document_sets_error() {
        let mut model = AppModel::default();
        let mut cmds = Vec::new();
        update(
            &mut model,
            Msg::SaveRequested(PathBuf::from("/tmp/ignored.json")),
            &mut cmds,
        );
        assert!(cmds.is_empty());
        assert!(model.error.is_some());
    }

    #[test]
    fn save_cancelled_sets_status() {
        let mut model = AppModel::default();
        let mut cmds = Vec::new();
        update(&mut model, Msg::SaveCancelled, &mut cmds);
        assert!(cmds.is_empty());
        assert_eq!(model.status.as_deref(), Some("Save cancelled."));
        assert!(model.error.is_none());
    }

    #[test]
    fn image_request_becomes_pick_command() {
        let tmp = TempDir::new().unwrap();
        let mut model = AppModel::default();
        open(&mut model, write_doc(&tmp));

        let mut cmds = Vec::new();
        update(
            &mut model,
            Msg::Repeater(RepeaterMsg::ImageRequested {
                slot: 0,
                field: "photo".into(),
            }),
            &mut cmds,
        );
        assert_eq!(cmds.len(), 1);
        match cmds.pop().unwrap() {
            Command::PickImage { slot, field } => {
                assert_eq!(slot, 0);
                assert_eq!(field, "photo");
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn export_writes_control_html() {
        let tmp = TempDir::new().unwrap();
        let mut model = AppModel::default();
        open(&mut model, write_doc(&tmp));

        let output = tmp.path().join("slides.html");
        let mut cmds = Vec::new();
        update(&mut model, Msg::ExportRequested(output.clone()), &mut cmds);
        let msg = run_command(cmds.pop().unwrap());
        update(&mut model, msg, &mut Vec::new());

        assert!(model.error.is_none());
        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("repeater-fields"));
        assert!(html.contains("repeater-row"));
    }
}
