// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{AuditRecord, AuditResults, LicenseOutcome, StatisticsForPackages};
use crate::infra::cli::reporter::ConsoleReporter;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};

pub enum CollectorMessage {
    Record(AuditRecord),
    AggregateResults(RpcReplyPort<AuditResults>),
}

/// Prints records as soon as they arrive and keeps them around for the final summary
pub struct ReportCollector {
    console_reporter: ConsoleReporter,
}

impl ReportCollector {
    pub fn new(console_reporter: ConsoleReporter) -> Self {
        Self { console_reporter }
    }
}

impl Actor for ReportCollector {
    type Msg = CollectorMessage;
    type State = Vec<AuditRecord>;
    type Arguments = ();

    async fn pre_start(&self, _: ActorRef<Self::Msg>, _: Self::Arguments) -> Result<Self::State, ActorProcessingErr> {
        Ok(vec![])
    }

    async fn handle(
        &self,
        _: ActorRef<Self::Msg>,
        message: Self::Msg,
        records: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CollectorMessage::Record(record) => {
                log::info!("[lictrail.collector] received record for {}", &record);
                self.console_reporter.report_record(&record);
                records.push(record);
            },
            CollectorMessage::AggregateResults(reply) => {
                log::info!("[lictrail.collector] computing aggregated results for {} records", records.len());

                let results = AuditResults {
                    statistics: compute_statistics(records),
                    records: records.clone(),
                };

                if reply.send(results).is_err() {
                    log::error!("[lictrail.collector] cannot reply with state");
                }
            },
        }

        Ok(())
    }
}

fn compute_statistics(records: &[AuditRecord]) -> StatisticsForPackages {
    let mut statistics = StatisticsForPackages {
        total: records.len(),
        declared_licenses: 0,
        discovered_licenses: 0,
        without_license_info: 0,
        failed_resolutions: 0,
    };

    for record in records {
        match &record.license {
            Some(LicenseOutcome::Declared(_)) => statistics.declared_licenses += 1,
            Some(LicenseOutcome::Discovered(_)) => statistics.discovered_licenses += 1,
            Some(LicenseOutcome::Unavailable(_)) => statistics.without_license_info += 1,
            None => {},
        }

        if record.failure.is_some() {
            statistics.failed_resolutions += 1;
        }
    }

    statistics
}
