// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::{NoLicenseInfo, ResolutionError};
use crate::domain::versions::NpmRange;
use packageurl::PackageUrl;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

pub type PackageIdentifier = String;

pub type DependencyGroup = BTreeMap<PackageIdentifier, String>;

/// Either a semver range understood by the registry or an opaque reference
/// (archive URL, git URL, ...) pointing straight at a source repository.
#[derive(Clone, Debug, PartialEq)]
pub enum VersionConstraint {
    Range(NpmRange),
    Reference(String),
}

impl VersionConstraint {
    pub fn parse(raw: &str) -> Self {
        match NpmRange::parse(raw) {
            Some(range) => VersionConstraint::Range(range),
            None => VersionConstraint::Reference(raw.to_string()),
        }
    }
}

static NPM_PURL_PREFIX: &str = "pkg:npm/";

/// The package a traversal starts from : a local directory, `name@constraint` or a npm purl
#[derive(Clone, Debug, PartialEq)]
pub struct RootSpecifier {
    pub identifier: PackageIdentifier,
    pub constraint: Option<VersionConstraint>,
}

impl RootSpecifier {
    pub fn new(identifier: PackageIdentifier, constraint: Option<VersionConstraint>) -> Self {
        Self { identifier, constraint }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(NPM_PURL_PREFIX)
            && let Ok(purl) = PackageUrl::from_str(raw)
        {
            let identifier = match purl.namespace() {
                Some(scope) => format!("{}/{}", scope, purl.name()),
                None => purl.name().to_string(),
            };
            let constraint = purl.version().map(VersionConstraint::parse);
            return Self::new(identifier, constraint);
        }

        let separator = raw
            .char_indices()
            .skip(1)
            .find(|(position, character)| *character == '@' && !raw[..*position].ends_with('/'))
            .map(|(position, _)| position);

        match separator {
            Some(position) => {
                let identifier = raw[..position].to_string();
                let constraint = VersionConstraint::parse(&raw[position + 1..]);
                Self::new(identifier, Some(constraint))
            },
            None => Self::new(raw.to_string(), None),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StructuredLicense {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// All shapes a `license` or `licenses` field shows up with in the wild
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    Plain(String),
    Listed(Vec<LicenseField>),
    Structured(StructuredLicense),
    Unrecognized(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RepositoryReference {
    Plain(String),
    Structured {
        #[serde(default)]
        url: Option<String>,
    },
    Unrecognized(serde_json::Value),
}

impl RepositoryReference {
    pub fn url(&self) -> Option<&str> {
        match self {
            RepositoryReference::Plain(url) => Some(url.as_str()),
            RepositoryReference::Structured { url } => url.as_deref(),
            RepositoryReference::Unrecognized(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub repository: Option<RepositoryReference>,
    #[serde(default)]
    pub license: Option<LicenseField>,
    #[serde(default)]
    pub licenses: Option<LicenseField>,
    #[serde(default, deserialize_with = "lenient_dependency_group")]
    pub dependencies: DependencyGroup,
    #[serde(default, rename = "devDependencies", deserialize_with = "lenient_dependency_group")]
    pub dev_dependencies: DependencyGroup,
    #[serde(default, rename = "optionalDependencies", deserialize_with = "lenient_dependency_group")]
    pub optional_dependencies: DependencyGroup,
}

impl PackageDescriptor {
    pub fn declares_license(&self) -> bool {
        self.license.is_some() || self.licenses.is_some()
    }

    /// Runtime, development and optional edges, in that order
    pub fn dependency_edges(&self) -> impl Iterator<Item = (&PackageIdentifier, &String)> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .chain(self.optional_dependencies.iter())
    }
}

// Some old manifests carry arrays, nulls or non-string values inside dependency groups;
// those entries cannot be resolved anyway, so they are dropped instead of failing the whole manifest.
fn lenient_dependency_group<'de, D>(deserializer: D) -> Result<DependencyGroup, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;

    let group = match raw {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(name, constraint)| match constraint {
                serde_json::Value::String(value) => Some((name, value)),
                _ => None,
            })
            .collect(),
        _ => DependencyGroup::new(),
    };

    Ok(group)
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RegistryRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub versions: BTreeMap<String, PackageDescriptor>,
    #[serde(default)]
    pub license: Option<LicenseField>,
    #[serde(default)]
    pub licenses: Option<LicenseField>,
}

impl RegistryRecord {
    pub fn available_versions(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    /// The earliest published version declaring any license field
    pub fn first_licensed_version(&self) -> Option<&PackageDescriptor> {
        let mut versions = self.versions.iter().collect::<Vec<_>>();
        versions.sort_by(|(left, _), (right, _)| {
            match (semver::Version::parse(left), semver::Version::parse(right)) {
                (Ok(left), Ok(right)) => left.cmp(&right),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => left.cmp(right),
            }
        });

        versions
            .into_iter()
            .map(|(_, descriptor)| descriptor)
            .find(|descriptor| descriptor.declares_license())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseResult {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl LicenseResult {
    pub fn new(name: Option<String>, url: Option<String>) -> Self {
        Self { name, url }
    }

    pub fn named(name: &str) -> Self {
        Self::new(Some(name.to_string()), None)
    }

    pub fn located_at(url: &str) -> Self {
        Self::new(None, Some(url.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LicenseOutcome {
    Declared(LicenseResult),
    Discovered(LicenseResult),
    Unavailable(NoLicenseInfo),
}

impl LicenseOutcome {
    pub fn license(&self) -> Option<&LicenseResult> {
        match self {
            LicenseOutcome::Declared(license) | LicenseOutcome::Discovered(license) => Some(license),
            LicenseOutcome::Unavailable(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorOrigin {
    LocalManifest,
    Registry { version: String },
    SourceRepository { owner: String, repository: String },
}

impl Display for DescriptorOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorOrigin::LocalManifest => f.write_str("local manifest"),
            DescriptorOrigin::Registry { version } => write!(f, "registry (version {})", version),
            DescriptorOrigin::SourceRepository { owner, repository } => write!(f, "github.com/{}/{}", owner, repository),
        }
    }
}

/// What the descriptor fetcher hands back for a single edge
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedPackage {
    pub descriptor: PackageDescriptor,
    pub registry_record: Option<Arc<RegistryRecord>>,
    pub origin: DescriptorOrigin,
}

impl FetchedPackage {
    pub fn new(
        descriptor: PackageDescriptor,
        registry_record: Option<Arc<RegistryRecord>>,
        origin: DescriptorOrigin,
    ) -> Self {
        Self {
            descriptor,
            registry_record,
            origin,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraversalRecord {
    pub identifier: PackageIdentifier,
    pub descriptor: PackageDescriptor,
    pub registry_record: Option<Arc<RegistryRecord>>,
    pub origin: DescriptorOrigin,
    pub level: u32,
}

impl TraversalRecord {
    /// The version picked from the registry when there is one, otherwise whatever the manifest says
    pub fn version(&self) -> Option<&str> {
        match &self.origin {
            DescriptorOrigin::Registry { version } => Some(version),
            _ => self.descriptor.version.as_deref(),
        }
    }
}

/// The outcome of resolving one edge, as seen by traversal visitors
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved(TraversalRecord),
    Failed {
        identifier: PackageIdentifier,
        level: u32,
        error: ResolutionError,
    },
}

impl Resolution {
    pub fn identifier(&self) -> &str {
        match self {
            Resolution::Resolved(record) => &record.identifier,
            Resolution::Failed { identifier, .. } => identifier,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Resolution::Resolved(record) => record.level,
            Resolution::Failed { level, .. } => *level,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuditRecord {
    pub identifier: PackageIdentifier,
    pub version: Option<String>,
    pub level: u32,
    pub license: Option<LicenseOutcome>,
    pub failure: Option<ResolutionError>,
}

impl AuditRecord {
    pub fn license_name(&self) -> &str {
        self.license
            .as_ref()
            .and_then(|outcome| outcome.license())
            .and_then(|license| license.name.as_deref())
            .unwrap_or_default()
    }

    pub fn license_url(&self) -> &str {
        self.license
            .as_ref()
            .and_then(|outcome| outcome.license())
            .and_then(|license| license.url.as_deref())
            .unwrap_or_default()
    }
}

impl Display for AuditRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => f.write_fmt(format_args!("pkg:npm/{}@{}", self.identifier, version)),
            None => f.write_fmt(format_args!("pkg:npm/{}", self.identifier)),
        }
    }
}

pub struct StatisticsForPackages {
    pub total: usize,
    pub declared_licenses: usize,
    pub discovered_licenses: usize,
    pub without_license_info: usize,
    pub failed_resolutions: usize,
}

pub struct AuditResults {
    pub statistics: StatisticsForPackages,
    pub records: Vec<AuditRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Csv,
}

#[cfg(test)]
mod tests {
    use crate::domain::models::{
        DescriptorOrigin, LicenseField, PackageDescriptor, RegistryRecord, RepositoryReference, RootSpecifier,
        StructuredLicense, TraversalRecord, VersionConstraint,
    };
    use assertor::{BooleanAssertion, EqualityAssertion, OptionAssertion};

    #[test]
    fn should_parse_manifest_with_all_license_shapes() {
        let manifest = r#"
            {
              "name": "legacy",
              "version": "0.3.1",
              "repository": { "type": "git", "url": "git+https://github.com/someone/legacy.git" },
              "licenses": [ { "type": "BSD", "url": "https://opensource.org/licenses/BSD" }, "MIT" ],
              "dependencies": { "left-pad": "^1.0.0", "broken": 42 },
              "devDependencies": null,
              "optionalDependencies": [ "ignored" ]
            }
        "#;

        let descriptor = serde_json::from_str::<PackageDescriptor>(manifest).expect("cannot parse manifest");

        let expected_licenses = LicenseField::Listed(vec![
            LicenseField::Structured(StructuredLicense {
                kind: Some("BSD".to_string()),
                url: Some("https://opensource.org/licenses/BSD".to_string()),
            }),
            LicenseField::Plain("MIT".to_string()),
        ]);

        assertor::assert_that!(descriptor.licenses).is_equal_to(Some(expected_licenses));
        assertor::assert_that!(descriptor.license).is_none();
        assertor::assert_that!(descriptor.dependencies.len()).is_equal_to(1);
        assertor::assert_that!(descriptor.dev_dependencies.is_empty()).is_true();
        assertor::assert_that!(descriptor.optional_dependencies.is_empty()).is_true();

        let repository = descriptor.repository.expect("missing repository");
        assertor::assert_that!(repository.url()).is_equal_to(Some("git+https://github.com/someone/legacy.git"));
    }

    #[test]
    fn should_treat_missing_groups_as_empty() {
        let descriptor = serde_json::from_str::<PackageDescriptor>(r#"{ "name": "bare" }"#).expect("cannot parse");

        assertor::assert_that!(descriptor.dependency_edges().count()).is_equal_to(0);
        assertor::assert_that!(descriptor.declares_license()).is_false();
    }

    #[test]
    fn should_keep_unrecognized_repository_shapes() {
        let descriptor =
            serde_json::from_str::<PackageDescriptor>(r#"{ "repository": 42 }"#).expect("cannot parse");

        let repository = descriptor.repository.expect("missing repository");
        assertor::assert_that!(matches!(repository, RepositoryReference::Unrecognized(_))).is_true();
        assertor::assert_that!(repository.url()).is_none();
    }

    #[test]
    fn should_pick_earliest_version_declaring_license() {
        let record = r#"
            {
              "name": "flaky",
              "versions": {
                "0.10.0": { "version": "0.10.0", "license": "ISC" },
                "0.9.0": { "version": "0.9.0", "license": "MIT" },
                "0.1.0": { "version": "0.1.0" }
              }
            }
        "#;

        let record = serde_json::from_str::<RegistryRecord>(record).expect("cannot parse record");
        let licensed = record.first_licensed_version().expect("no licensed version");

        assertor::assert_that!(licensed.version.as_deref()).is_equal_to(Some("0.9.0"));
    }

    #[test]
    fn should_parse_root_specifiers() {
        let local = RootSpecifier::parse("my-app");
        assertor::assert_that!(local.identifier.as_str()).is_equal_to("my-app");
        assertor::assert_that!(local.constraint).is_none();

        let nested = RootSpecifier::parse("./node_modules/@types/node");
        assertor::assert_that!(nested.identifier.as_str()).is_equal_to("./node_modules/@types/node");
        assertor::assert_that!(nested.constraint).is_none();

        let scoped = RootSpecifier::parse("@types/node@^20.0.0");
        assertor::assert_that!(scoped.identifier.as_str()).is_equal_to("@types/node");
        assertor::assert_that!(matches!(scoped.constraint, Some(VersionConstraint::Range(_)))).is_true();

        let from_purl = RootSpecifier::parse("pkg:npm/%40angular/core@17.0.0");
        assertor::assert_that!(from_purl.identifier.as_str()).is_equal_to("@angular/core");
        assertor::assert_that!(matches!(from_purl.constraint, Some(VersionConstraint::Range(_)))).is_true();

        let pinned_to_repository = RootSpecifier::parse("lib@git+ssh://git@github.com/someone/lib.git");
        assertor::assert_that!(pinned_to_repository.identifier.as_str()).is_equal_to("lib");
        assertor::assert_that!(pinned_to_repository.constraint).is_equal_to(Some(VersionConstraint::Reference(
            "git+ssh://git@github.com/someone/lib.git".to_string(),
        )));
    }

    #[test]
    fn should_take_traversal_version_from_origin() {
        let descriptor = serde_json::from_str::<PackageDescriptor>(r#"{ "version": "0.0.0-development" }"#)
            .expect("invalid manifest");

        let from_registry = TraversalRecord {
            identifier: "ms".to_string(),
            descriptor: descriptor.clone(),
            registry_record: None,
            origin: DescriptorOrigin::Registry {
                version: "2.1.3".to_string(),
            },
            level: 1,
        };

        let from_repository = TraversalRecord {
            origin: DescriptorOrigin::SourceRepository {
                owner: "vercel".to_string(),
                repository: "ms".to_string(),
            },
            ..from_registry.clone()
        };

        assertor::assert_that!(from_registry.version()).is_equal_to(Some("2.1.3"));
        assertor::assert_that!(from_repository.version()).is_equal_to(Some("0.0.0-development"));
        assertor::assert_that!(from_repository.origin.to_string()).is_equal_to("github.com/vercel/ms".to_string());
    }
}
