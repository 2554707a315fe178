// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Control logic independent of egui: value reconciliation, row templating and HTML output.

pub mod control;
pub mod html;
pub mod reconcile;
pub mod template;
