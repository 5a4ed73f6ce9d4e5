// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::ReportFormat;
use crate::infra::cli::reporter::ConsoleReporter;
use crate::infra::manifests::LocalManifestReader;
use crate::infra::networking::github::GithubRawContentClient;
use crate::infra::networking::http::HTTP_CLIENT;
use crate::infra::networking::npm::NpmRegistryClient;
use crate::lictrail::Lictrail;
use crate::lictrail::fetcher::{DescriptorFetcher, RemoteDescriptorFetcher};
use crate::lictrail::locator::LicenseLocator;
use crate::lictrail::traversal::TraversalEngine;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct LictrailSettings {
    pub registry_url: String,
    pub raw_content_url: String,
    pub workspace: PathBuf,
    pub max_concurrency: usize,
    pub format: ReportFormat,
    pub use_colors: bool,
    pub verbose: bool,
}

fn github_client(settings: &LictrailSettings) -> Arc<GithubRawContentClient> {
    Arc::new(GithubRawContentClient::new(
        settings.raw_content_url.clone(),
        HTTP_CLIENT.clone(),
    ))
}

fn descriptor_fetcher(settings: &LictrailSettings, github_client: Arc<GithubRawContentClient>) -> DescriptorFetcher {
    let local_manifests = LocalManifestReader::new(settings.workspace.clone());
    let registry_client = NpmRegistryClient::new(settings.registry_url.clone(), HTTP_CLIENT.clone());
    let delegate = RemoteDescriptorFetcher::new(local_manifests, registry_client, github_client);
    DescriptorFetcher::Remote(delegate)
}

pub fn create_lictrail(settings: &LictrailSettings) -> Lictrail {
    let github_client = github_client(settings);
    let fetcher = descriptor_fetcher(settings, github_client.clone());
    let traversal_engine = TraversalEngine::new(fetcher, settings.max_concurrency);
    let license_locator = Arc::new(LicenseLocator::new(github_client));
    let console_reporter = ConsoleReporter::new(settings.format, settings.use_colors);
    Lictrail::new(traversal_engine, license_locator, console_reporter)
}
