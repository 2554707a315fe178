// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let initial = std::env::args_os().nth(1).map(PathBuf::from);
    if let Some(path) = &initial {
        log::info!("opening {} on startup", path.display());
    }
    repeater::app::run(initial)
}
