// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{AuditRecord, AuditResults, LicenseOutcome, ReportFormat, RootSpecifier};
use comfy_table::Table;
use console::{StyledObject, style};

#[derive(Clone)]
pub struct ConsoleReporter {
    format: ReportFormat,
    use_colors: bool,
}

impl ConsoleReporter {
    pub fn new(format: ReportFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    pub fn report_audit_started(&self, root: &RootSpecifier) {
        if self.format == ReportFormat::Csv {
            return;
        }

        println!();
        println!("Auditing licenses for : {}", self.cyan(&root.identifier));
        println!("Walking the dependency graph. This operation may take some time ...");
        println!();
    }

    pub fn report_record(&self, record: &AuditRecord) {
        if let Some(failure) = &record.failure {
            match failure.is_warning() {
                true => eprintln!("{}", self.yellow(failure)),
                false => eprintln!("{}", self.red(failure)),
            }
        }

        match &record.license {
            Some(LicenseOutcome::Unavailable(reason)) => {
                eprintln!("{}", self.yellow(format!("{} has no license info ({})", record.identifier, reason)));
            },
            Some(_) => self.report_license(record),
            None => {},
        }
    }

    pub fn report_audit_outcomes(&self, results: &AuditResults) {
        if self.format == ReportFormat::Csv {
            return;
        }

        let statistics = &results.statistics;
        println!();
        println!("Statistics : ");
        println!();

        let mut table = Table::new();
        table.set_header(vec!["Packages", "Total"]);
        table.add_row(vec!["visited".to_string(), statistics.total.to_string()]);
        table.add_row(vec![
            "with declared license".to_string(),
            statistics.declared_licenses.to_string(),
        ]);
        table.add_row(vec![
            "with license file found".to_string(),
            statistics.discovered_licenses.to_string(),
        ]);
        table.add_row(vec![
            "without license info".to_string(),
            statistics.without_license_info.to_string(),
        ]);
        table.add_row(vec![
            "failed to resolve".to_string(),
            statistics.failed_resolutions.to_string(),
        ]);

        println!("{table}");
        println!();
    }

    fn report_license(&self, record: &AuditRecord) {
        match self.format {
            ReportFormat::Csv => println!("{}", csv_row(record)),
            ReportFormat::Console => {
                let indentation = "  ".repeat(record.level as usize);
                let license_url = record.license_url();
                if license_url.is_empty() {
                    println!("{}• {} : {}", indentation, record, self.cyan(record.license_name()));
                } else {
                    println!(
                        "{}• {} : {} ({})",
                        indentation,
                        record,
                        self.cyan(record.license_name()),
                        self.cyan(license_url)
                    );
                }
            },
        }
    }

    fn cyan<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).cyan(),
            false => style(what),
        }
    }

    fn yellow<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).yellow(),
            false => style(what),
        }
    }

    fn red<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).red(),
            false => style(what),
        }
    }
}

pub fn csv_row(record: &AuditRecord) -> String {
    format!(
        "{},{},{},{}",
        csv_field(&record.identifier),
        csv_field(record.license_name()),
        csv_field(record.license_url()),
        record.level
    )
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        return format!("\"{}\"", raw.replace('"', "\"\""));
    }

    raw.to_string()
}
