// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{LicenseField, LicenseResult, PackageDescriptor, RegistryRecord, StructuredLicense};

impl LicenseField {
    /// Only the first entry of a list is considered
    pub fn extract(&self) -> Option<LicenseResult> {
        let extracted = match self {
            LicenseField::Plain(name) => extract_plain(name),
            LicenseField::Listed(entries) => entries.first().and_then(LicenseField::extract),
            LicenseField::Structured(structured) => extract_structured(structured),
            LicenseField::Unrecognized(_) => None,
        };

        extracted.filter(|license| !license.is_empty())
    }
}

fn extract_plain(name: &str) -> Option<LicenseResult> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| LicenseResult::named(trimmed))
}

fn extract_structured(structured: &StructuredLicense) -> Option<LicenseResult> {
    let name = structured.kind.clone().or_else(|| structured.url.clone());
    Some(LicenseResult::new(name, structured.url.clone()))
}

fn first_declared(license: &Option<LicenseField>, licenses: &Option<LicenseField>) -> Option<LicenseResult> {
    license
        .as_ref()
        .and_then(LicenseField::extract)
        .or_else(|| licenses.as_ref().and_then(LicenseField::extract))
}

/// Explicit declaration from the manifest, falling back to the registry-wide one
pub fn declared_license(descriptor: &PackageDescriptor, registry_record: Option<&RegistryRecord>) -> Option<LicenseResult> {
    first_declared(&descriptor.license, &descriptor.licenses)
        .or_else(|| registry_record.and_then(|record| first_declared(&record.license, &record.licenses)))
}
