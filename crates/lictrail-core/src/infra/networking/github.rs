// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::PackageDescriptor;
use crate::domain::repositories::{GithubRepository, RepositorySourceLocation};
use crate::infra::networking::http::HTTPClient;
use anyhow::Context;
use reqwest::StatusCode;
use std::sync::Arc;

pub static URL_GITHUB_RAW_CONTENT: &str = "https://raw.githubusercontent.com";

static MANIFEST_FILE_NAME: &str = "package.json";

pub struct GithubRawContentClient {
    base_url: String,
    http_client: Arc<HTTPClient>,
}

impl GithubRawContentClient {
    pub fn new(base_url: String, http_client: Arc<HTTPClient>) -> Self {
        Self { base_url, http_client }
    }

    pub fn source_location(&self, repository: &GithubRepository) -> RepositorySourceLocation {
        RepositorySourceLocation::new(repository, &self.base_url)
    }

    pub async fn get_manifest(&self, repository: &GithubRepository) -> anyhow::Result<PackageDescriptor> {
        let endpoint = self.source_location(repository).file_url(MANIFEST_FILE_NAME);
        log::info!("[lictrail.github] fetching manifest from {}", endpoint);

        let descriptor = self
            .http_client
            .get(&endpoint)
            .send()
            .await?
            .error_for_status()?
            .json::<PackageDescriptor>()
            .await
            .context("malformed package manifest")?;

        Ok(descriptor)
    }

    pub async fn has_file(&self, file_url: &str) -> bool {
        let response = match self.http_client.head(file_url).send().await {
            Ok(inner) => inner,
            Err(incoming) => {
                log::info!("[lictrail.github] cannot check {} : {}", file_url, incoming);
                return false;
            },
        };

        if response.status() == StatusCode::OK {
            log::info!("[lictrail.github] found {}", file_url);
            return true;
        }

        log::info!("[lictrail.github] {} answered with {}", file_url, response.status());
        false
    }
}
