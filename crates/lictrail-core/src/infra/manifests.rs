// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::PackageDescriptor;
use anyhow::Context;
use std::path::PathBuf;

static MANIFEST_FILE_NAME: &str = "package.json";

/// Reads `package.json` files living under `<workspace>/<identifier>/`
pub struct LocalManifestReader {
    workspace: PathBuf,
}

impl LocalManifestReader {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }

    pub fn manifest_path(&self, identifier: &str) -> PathBuf {
        self.workspace.join(identifier).join(MANIFEST_FILE_NAME)
    }

    /// `Ok(None)` when there is no manifest for this identifier
    pub async fn read(&self, identifier: &str) -> anyhow::Result<Option<PackageDescriptor>> {
        let manifest_path = self.manifest_path(identifier);

        match tokio::fs::try_exists(&manifest_path).await {
            Ok(true) => {},
            Ok(false) => return Ok(None),
            Err(incoming) => {
                log::info!("[lictrail.manifests] cannot check {:?} : {}", manifest_path, incoming);
                return Ok(None);
            },
        }

        log::info!("[lictrail.manifests] reading {:?}", manifest_path);
        let contents = tokio::fs::read(&manifest_path)
            .await
            .with_context(|| format!("cannot read {:?}", manifest_path))?;

        let descriptor = serde_json::from_slice::<PackageDescriptor>(&contents)
            .with_context(|| format!("invalid manifest at {:?}", manifest_path))?;

        Ok(Some(descriptor))
    }
}
