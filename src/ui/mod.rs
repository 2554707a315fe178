// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for editing a repeater document.
//! Handles layout, file dialogs, and wiring to document I/O.

pub mod components;

use std::path::PathBuf;

use eframe::egui;

use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::repeater;

/// Stateful egui application hosting one repeater control.
pub struct RepeaterApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
}

impl Default for RepeaterApp {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RepeaterApp {
    /// Spawn the command workers and optionally queue an initial document load.
    pub fn new(initial: Option<PathBuf>) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().clamp(2, 4))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd);
                    let _ = msg_tx.send(msg);
                }
            });
        }

        let mut app = Self {
            model: AppModel::default(),
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
        };
        if let Some(path) = initial {
            app.dispatch(Command::LoadDocument(path));
        }
        app
    }

    fn dispatch(&mut self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_ok() {
            self.model.pending_commands += 1;
        }
    }
}

impl eframe::App for RepeaterApp {
    /// Required by eframe 0.34; all drawing happens in `update`.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    /// Drain worker results, apply queued messages, then draw the top bar,
    /// status line and the repeater editor.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });

        // Pull messages produced by the command workers.
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        let msgs = std::mem::take(&mut self.inbox);
        for msg in msgs {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                self.dispatch(cmd);
            }
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(self.title());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(2.0);
                    egui::widgets::global_theme_preference_switch(ui);
                    ui.separator();
                    self.render_file_buttons(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_error_modal(ctx);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.model.repeater.control().is_none() {
                    ui.label(
                        egui::RichText::new("Open a repeater document to start editing.")
                            .color(egui::Color32::from_gray(110)),
                    );
                    return;
                }
                let msgs = repeater::view(ui, &self.model.repeater);
                self.inbox.extend(msgs.into_iter().map(Msg::Repeater));
            });
        });

        if !self.inbox.is_empty() || self.model.pending_commands > 0 {
            ctx.request_repaint();
        }
    }
}

impl RepeaterApp {
    fn title(&self) -> String {
        let base = self
            .model
            .repeater
            .control()
            .map(|c| c.label().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Repeater".to_string());
        if self.model.repeater.is_dirty() {
            format!("{base} *")
        } else {
            base
        }
    }

    /// Open, save and export buttons; the latter two need a loaded document.
    fn render_file_buttons(&mut self, ui: &mut egui::Ui) {
        let loaded = self.model.repeater.control().is_some();

        let export = egui::Button::new(format!(
            "{} Export HTML",
            egui_phosphor::regular::FILE_HTML
        ));
        if ui
            .add_enabled(loaded, export)
            .on_disabled_hover_text("Open a document first")
            .clicked()
        {
            let dialog = rfd::FileDialog::new()
                .set_title("Export control HTML")
                .add_filter("HTML", &["html"])
                .set_file_name(self.suggested_name("html"));
            if let Some(path) = dialog.save_file() {
                self.inbox
                    .push(Msg::ExportRequested(ensure_extension(path, "html")));
            }
        }

        let save = egui::Button::new(format!(
            "{} Save",
            egui_phosphor::regular::FLOPPY_DISK
        ));
        if ui
            .add_enabled(loaded, save)
            .on_disabled_hover_text("Open a document first")
            .clicked()
        {
            let dialog = rfd::FileDialog::new()
                .set_title("Save repeater document")
                .add_filter("JSON", &["json"])
                .set_file_name(self.suggested_name("json"));
            if let Some(path) = dialog.save_file() {
                self.inbox
                    .push(Msg::SaveRequested(ensure_extension(path, "json")));
            } else {
                self.inbox.push(Msg::SaveCancelled);
            }
        }

        let open = egui::Button::new(format!(
            "{} Open",
            egui_phosphor::regular::FOLDER_OPEN
        ));
        if ui.add(open).clicked() {
            self.inbox.push(Msg::OpenRequested);
        }
    }

    fn suggested_name(&self, extension: &str) -> String {
        let stem = self
            .model
            .document_path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repeater".to_string());
        format!("{stem}.{extension}")
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Render latest status message when present.
    fn render_status(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.model.status {
            let display = if self.model.pending_commands > 0 {
                format!("{}  ({} working…)", text, self.model.pending_commands)
            } else {
                text.to_string()
            };
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(display).color(egui::Color32::from_gray(68)));
                if self.model.pending_commands > 0 {
                    ui.add(egui::Spinner::new().size(14.0)).on_hover_text(format!(
                        "{} task(s) running in background",
                        self.model.pending_commands
                    ));
                }
            });
        }
    }
}

/// Force `extension` onto a dialog result, replacing any other extension.
fn ensure_extension(mut path: PathBuf, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !matches {
        path.set_extension(extension);
    }
    path
}
