// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Repeater: an editable, ordered collection of rows sharing one field schema.
//!
//! The [`logic::control::RepeaterControl`] owns the collection and is usable
//! without any UI; the egui shell under [`ui`] and [`app`] edits documents
//! built around it.

pub mod app;
pub mod config;
pub mod l10n;
pub mod logic;
pub mod models;
pub mod mvu;
pub mod ui;
