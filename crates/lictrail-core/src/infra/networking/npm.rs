// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::RegistryRecord;
use crate::infra::networking::http::HTTPClient;
use anyhow::Context;
use std::sync::Arc;

pub static URL_NPM_REGISTRY: &str = "https://registry.npmjs.org";

pub struct NpmRegistryClient {
    base_url: String,
    http_client: Arc<HTTPClient>,
}

impl NpmRegistryClient {
    pub fn new(base_url: String, http_client: Arc<HTTPClient>) -> Self {
        Self { base_url, http_client }
    }

    pub async fn get_registry_record(&self, package_name: &str) -> anyhow::Result<RegistryRecord> {
        // scoped packages keep their leading '@' but need the separator escaped
        let endpoint = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            package_name.replace('/', "%2f")
        );

        log::info!("[lictrail.registry] fetching registry data from {}", endpoint);

        let record = self
            .http_client
            .get(&endpoint)
            .send()
            .await?
            .error_for_status()?
            .json::<RegistryRecord>()
            .await
            .context("malformed registry data")?;

        Ok(record)
    }
}
