// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{PackageIdentifier, RegistryRecord};
use thiserror::Error;

/// Failures raised while turning an edge of the dependency graph into a package descriptor.
///
/// None of them aborts a traversal, except when raised for the root package.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResolutionError {
    #[error("no manifest found for {identifier} at {path}")]
    RootNotFound { identifier: PackageIdentifier, path: String },

    #[error("cannot parse manifest for {identifier} : {reason}")]
    ManifestParse {
        identifier: PackageIdentifier,
        reason: String,
    },

    #[error("cannot fetch registry data for {identifier} : {reason}")]
    RegistryUnavailable {
        identifier: PackageIdentifier,
        reason: String,
    },

    #[error("no published version of {identifier} satisfies {constraint}")]
    VersionUnresolvable {
        identifier: PackageIdentifier,
        constraint: String,
        record: Box<RegistryRecord>,
    },

    #[error("{identifier} points to an unsupported source location ({reference})")]
    UnsupportedRepositoryHost {
        identifier: PackageIdentifier,
        reference: String,
    },

    #[error("cannot fetch manifest for {identifier} from its source repository : {reason}")]
    ManifestUnavailable {
        identifier: PackageIdentifier,
        reason: String,
    },
}

impl ResolutionError {
    pub fn identifier(&self) -> &str {
        match self {
            ResolutionError::RootNotFound { identifier, .. }
            | ResolutionError::ManifestParse { identifier, .. }
            | ResolutionError::RegistryUnavailable { identifier, .. }
            | ResolutionError::VersionUnresolvable { identifier, .. }
            | ResolutionError::UnsupportedRepositoryHost { identifier, .. }
            | ResolutionError::ManifestUnavailable { identifier, .. } => identifier,
        }
    }

    /// Warnings are failures caused by the package metadata itself rather than by I/O
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ResolutionError::VersionUnresolvable { .. } | ResolutionError::UnsupportedRepositoryHost { .. }
        )
    }
}

/// Reasons why no license information could be attached to a package
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NoLicenseInfo {
    #[error("{identifier} declares no license and no repository")]
    MissingRepository { identifier: PackageIdentifier },

    #[error("{identifier} is hosted at an unsupported location ({reference})")]
    UnsupportedRepositoryHost {
        identifier: PackageIdentifier,
        reference: String,
    },

    #[error("{identifier} has no license file at {base_url}")]
    NoLicenseFound {
        identifier: PackageIdentifier,
        base_url: String,
    },
}
