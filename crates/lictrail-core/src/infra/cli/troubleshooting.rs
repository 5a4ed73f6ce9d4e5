// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use env_logger::Env;

pub fn setup_troubleshooting(verbose: bool) {
    better_panic::install();
    human_panic::setup_panic!();

    let default_filter = if verbose { "info" } else { "off" };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_module_path(false)
        .format_level(false)
        .format_file(false)
        .format_target(false)
        .init();
}
