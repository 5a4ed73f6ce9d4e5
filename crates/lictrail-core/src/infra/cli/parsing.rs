// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{ReportFormat, RootSpecifier};
use crate::factory::LictrailSettings;
use crate::infra::networking::github::URL_GITHUB_RAW_CONTENT;
use crate::infra::networking::npm::URL_NPM_REGISTRY;
use crate::lictrail::AuditTask;
use anyhow::bail;
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

static DEFAULT_MAX_DEPTH: u32 = 1;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Console,
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "lictrail", version, long_about = None)]
#[command(about = "Walk npm dependency graphs and report the license of every package found")]
struct CliParser {
    /// Package to start from : a folder holding a package.json, name@constraint or a npm purl
    pub root: String,

    /// How many levels of dependencies to walk (defaults to 1)
    #[arg(allow_hyphen_values = true)]
    pub max_depth: Option<String>,

    /// Base URL of the npm registry
    #[arg(long, default_value = URL_NPM_REGISTRY)]
    pub registry_url: String,

    /// Base URL serving raw files from GitHub repositories
    #[arg(long, default_value = URL_GITHUB_RAW_CONTENT)]
    pub raw_content_url: String,

    /// Folder that local package folders are resolved against
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Maximum number of packages resolved at the same time
    #[arg(long, default_value_t = 16)]
    pub max_concurrency: usize,

    /// How results are printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_colors: bool,

    /// Print diagnostics on stderr
    #[arg(long)]
    pub verbose: bool,
}

pub fn parse_arguments() -> anyhow::Result<(AuditTask, LictrailSettings)> {
    evaluate(CliParser::parse())
}

pub fn parse_arguments_from<I, T>(arguments: I) -> anyhow::Result<(AuditTask, LictrailSettings)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    evaluate(CliParser::try_parse_from(arguments)?)
}

fn evaluate(cli: CliParser) -> anyhow::Result<(AuditTask, LictrailSettings)> {
    if cli.root.trim().is_empty() {
        bail!("lictrail.cli : root package cannot be empty");
    }

    if cli.max_concurrency == 0 {
        bail!("lictrail.cli : max concurrency must be at least 1");
    }

    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let format = match cli.format {
        OutputFormat::Console => ReportFormat::Console,
        OutputFormat::Csv => ReportFormat::Csv,
    };

    let task = AuditTask::new(RootSpecifier::parse(&cli.root), max_depth(cli.max_depth.as_deref()));

    let settings = LictrailSettings {
        registry_url: cli.registry_url,
        raw_content_url: cli.raw_content_url,
        workspace,
        max_concurrency: cli.max_concurrency,
        format,
        use_colors: !cli.no_colors,
        verbose: cli.verbose,
    };

    Ok((task, settings))
}

fn max_depth(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_DEPTH)
}
