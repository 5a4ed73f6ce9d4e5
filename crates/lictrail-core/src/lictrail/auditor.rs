// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::ResolutionError;
use crate::domain::models::{AuditRecord, LicenseOutcome, PackageDescriptor, RegistryRecord, Resolution};
use crate::lictrail::collector::CollectorMessage;
use crate::lictrail::locator::LicenseLocator;
use crate::lictrail::traversal::TraversalVisitor;
use ractor::ActorRef;
use std::sync::Arc;

/// Turns every resolution into an audit record and forwards it to the collector
pub struct LicenseAuditor {
    license_locator: Arc<LicenseLocator>,
    collector: ActorRef<CollectorMessage>,
}

impl LicenseAuditor {
    pub fn new(license_locator: Arc<LicenseLocator>, collector: ActorRef<CollectorMessage>) -> Self {
        Self {
            license_locator,
            collector,
        }
    }

    async fn audit(&self, resolution: &Resolution) -> AuditRecord {
        match resolution {
            Resolution::Resolved(record) => {
                let license = self
                    .license_locator
                    .locate(&record.identifier, &record.descriptor, record.registry_record.as_deref())
                    .await;

                AuditRecord {
                    identifier: record.identifier.clone(),
                    version: record.version().map(str::to_string),
                    level: record.level,
                    license: Some(license),
                    failure: None,
                }
            },
            Resolution::Failed {
                identifier,
                level,
                error,
            } => {
                let license = match error {
                    ResolutionError::VersionUnresolvable { record, .. } => {
                        Some(self.locate_from_registry_record(identifier, record).await)
                    },
                    _ => None,
                };

                AuditRecord {
                    identifier: identifier.clone(),
                    version: None,
                    level: *level,
                    license,
                    failure: Some(error.clone()),
                }
            },
        }
    }

    // No version matched, so any published version declaring a license stands in for the missing descriptor
    async fn locate_from_registry_record(&self, identifier: &str, registry_record: &RegistryRecord) -> LicenseOutcome {
        let fallback = PackageDescriptor::default();
        let descriptor = registry_record.first_licensed_version().unwrap_or(&fallback);

        log::info!(
            "[lictrail.auditor] locating license for {} using version {:?}",
            identifier,
            descriptor.version
        );

        self.license_locator
            .locate(identifier, descriptor, Some(registry_record))
            .await
    }
}

impl TraversalVisitor for LicenseAuditor {
    async fn on_resolved(&self, resolution: &Resolution) -> bool {
        let record = self.audit(resolution).await;

        if let Err(incoming) = self.collector.cast(CollectorMessage::Record(record)) {
            log::error!("[lictrail.auditor] cannot forward record for {} : {}", resolution.identifier(), incoming);
        }

        true
    }
}
