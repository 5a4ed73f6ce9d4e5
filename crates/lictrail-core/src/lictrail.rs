// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub(crate) mod auditor;
pub(crate) mod collector;
pub(crate) mod fetcher;
pub(crate) mod locator;
pub(crate) mod traversal;

use crate::domain::models::{AuditResults, RootSpecifier};
use crate::infra::cli::reporter::ConsoleReporter;
use auditor::LicenseAuditor;
use collector::{CollectorMessage, ReportCollector};
use locator::LicenseLocator;
use ractor::Actor;
use std::sync::Arc;
use traversal::TraversalEngine;

// Every record has already been sent when aggregation is requested
static MILLIS_TO_WAIT_FOR_AGGREGATION: u64 = 5000;

#[derive(Clone, Debug, PartialEq)]
pub struct AuditTask {
    pub root: RootSpecifier,
    pub max_depth: u32,
}

impl AuditTask {
    pub fn new(root: RootSpecifier, max_depth: u32) -> Self {
        Self { root, max_depth }
    }
}

pub struct Lictrail {
    traversal_engine: TraversalEngine,
    license_locator: Arc<LicenseLocator>,
    console_reporter: ConsoleReporter,
}

impl Lictrail {
    pub(crate) fn new(
        traversal_engine: TraversalEngine,
        license_locator: Arc<LicenseLocator>,
        console_reporter: ConsoleReporter,
    ) -> Self {
        Self {
            traversal_engine,
            license_locator,
            console_reporter,
        }
    }

    pub async fn execute(self, task: AuditTask) -> anyhow::Result<()> {
        self.console_reporter.report_audit_started(&task.root);
        let results = self.audit(task).await?;
        self.console_reporter.report_audit_outcomes(&results);
        Ok(())
    }

    async fn audit(&self, task: AuditTask) -> anyhow::Result<AuditResults> {
        let collector = ReportCollector::new(self.console_reporter.clone());
        let (actor, handle) = Actor::spawn(None, collector, ()).await?;

        let auditor = Arc::new(LicenseAuditor::new(self.license_locator.clone(), actor.clone()));
        let traversed = self
            .traversal_engine
            .traverse(task.root, task.max_depth, auditor)
            .await;

        let summary = match traversed {
            Ok(summary) => summary,
            Err(root_failure) => {
                actor.stop(None);
                handle.await?;
                return Err(root_failure.into());
            },
        };

        log::info!(
            "[lictrail] traversal done ({} resolved, {} failed)",
            summary.resolved,
            summary.failed
        );

        let results = ractor::call_t!(actor, CollectorMessage::AggregateResults, MILLIS_TO_WAIT_FOR_AGGREGATION)?;
        actor.stop(None);
        handle.await?;

        Ok(results)
    }
}
