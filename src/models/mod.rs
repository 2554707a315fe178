// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: field schema, row values and row label policy.

pub mod field;
pub mod row_label;
pub mod value;
