// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::NoLicenseInfo;
use crate::domain::licenses::declared_license;
use crate::domain::models::{LicenseOutcome, LicenseResult, PackageDescriptor, RegistryRecord};
use crate::domain::repositories::GithubRepository;
use crate::infra::networking::github::GithubRawContentClient;
use std::sync::Arc;

/// Looked up in this order, first match wins
pub static LICENSE_FILE_CANDIDATES: [&str; 4] = ["LICENSE", "COPYING", "LICENSE.md", "COPYING.md"];

pub struct LicenseLocator {
    github_client: Arc<GithubRawContentClient>,
}

impl LicenseLocator {
    pub fn new(github_client: Arc<GithubRawContentClient>) -> Self {
        Self { github_client }
    }

    pub async fn locate(
        &self,
        identifier: &str,
        descriptor: &PackageDescriptor,
        registry_record: Option<&RegistryRecord>,
    ) -> LicenseOutcome {
        if let Some(declared) = declared_license(descriptor, registry_record) {
            return LicenseOutcome::Declared(declared);
        }

        let Some(reference) = descriptor.repository.as_ref().and_then(|repository| repository.url()) else {
            log::info!("[lictrail.locator] {} has no repository reference", identifier);
            return LicenseOutcome::Unavailable(NoLicenseInfo::MissingRepository {
                identifier: identifier.to_string(),
            });
        };

        let Some(repository) = GithubRepository::from_reference(reference) else {
            log::info!("[lictrail.locator] cannot look up files for {} at {}", identifier, reference);
            return LicenseOutcome::Unavailable(NoLicenseInfo::UnsupportedRepositoryHost {
                identifier: identifier.to_string(),
                reference: reference.to_string(),
            });
        };

        let location = self.github_client.source_location(&repository);

        for candidate in LICENSE_FILE_CANDIDATES {
            let file_url = location.file_url(candidate);
            if self.github_client.has_file(&file_url).await {
                log::info!("[lictrail.locator] license file for {} found at {}", identifier, file_url);
                return LicenseOutcome::Discovered(LicenseResult::located_at(&file_url));
            }
        }

        LicenseOutcome::Unavailable(NoLicenseInfo::NoLicenseFound {
            identifier: identifier.to_string(),
            base_url: location.raw_content_base_url,
        })
    }
}
