// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use lictrail_core::factory;
use lictrail_core::infra::cli;
use tikv_jemallocator::Jemalloc;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (task, settings) = cli::parsing::parse_arguments()?;
    cli::troubleshooting::setup_troubleshooting(settings.verbose);

    let lictrail = factory::create_lictrail(&settings);
    lictrail.execute(task).await?;

    Ok(())
}
