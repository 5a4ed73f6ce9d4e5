// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::ResolutionError;
use crate::domain::models::{DescriptorOrigin, FetchedPackage, VersionConstraint};
use crate::domain::repositories::GithubRepository;
use crate::domain::versions::{NpmRange, resolve};
use crate::infra::manifests::LocalManifestReader;
use crate::infra::networking::github::GithubRawContentClient;
use crate::infra::networking::npm::NpmRegistryClient;
#[cfg(test)]
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::time::Duration;

pub trait DescriptorFetching {
    async fn fetch(
        &self,
        identifier: &str,
        constraint: Option<&VersionConstraint>,
    ) -> Result<FetchedPackage, ResolutionError>;
}

pub enum DescriptorFetcher {
    Remote(RemoteDescriptorFetcher),
    #[cfg(test)]
    Fake(FakeDescriptorFetcher),
}

impl DescriptorFetching for DescriptorFetcher {
    async fn fetch(
        &self,
        identifier: &str,
        constraint: Option<&VersionConstraint>,
    ) -> Result<FetchedPackage, ResolutionError> {
        match self {
            DescriptorFetcher::Remote(delegate) => delegate.fetch(identifier, constraint).await,
            #[cfg(test)]
            DescriptorFetcher::Fake(fake) => fake.fetch(identifier, constraint).await,
        }
    }
}

/// Local manifests first, then either the registry or the source repository,
/// depending on what kind of constraint the edge carries
pub struct RemoteDescriptorFetcher {
    local_manifests: LocalManifestReader,
    registry_client: NpmRegistryClient,
    github_client: Arc<GithubRawContentClient>,
}

impl RemoteDescriptorFetcher {
    pub fn new(
        local_manifests: LocalManifestReader,
        registry_client: NpmRegistryClient,
        github_client: Arc<GithubRawContentClient>,
    ) -> Self {
        Self {
            local_manifests,
            registry_client,
            github_client,
        }
    }

    async fn from_registry(&self, identifier: &str, range: &NpmRange) -> Result<FetchedPackage, ResolutionError> {
        let record = self
            .registry_client
            .get_registry_record(identifier)
            .await
            .map_err(|incoming| ResolutionError::RegistryUnavailable {
                identifier: identifier.to_string(),
                reason: format!("{:#}", incoming),
            })?;

        let resolved = resolve(record.available_versions(), range);

        let Some(version) = resolved else {
            log::info!("[lictrail.fetcher] no version of {} matches {}", identifier, range.raw());
            return Err(ResolutionError::VersionUnresolvable {
                identifier: identifier.to_string(),
                constraint: range.raw().to_string(),
                record: Box::new(record),
            });
        };

        log::info!("[lictrail.fetcher] resolved {}@{} to {}", identifier, range.raw(), version);
        let descriptor = record.versions.get(&version).cloned().unwrap_or_default();
        let origin = DescriptorOrigin::Registry { version };
        Ok(FetchedPackage::new(descriptor, Some(Arc::new(record)), origin))
    }

    async fn from_source_repository(
        &self,
        identifier: &str,
        reference: &str,
    ) -> Result<FetchedPackage, ResolutionError> {
        let Some(repository) = GithubRepository::from_reference(reference) else {
            log::info!("[lictrail.fetcher] {} points to unsupported {}", identifier, reference);
            return Err(ResolutionError::UnsupportedRepositoryHost {
                identifier: identifier.to_string(),
                reference: reference.to_string(),
            });
        };

        let descriptor = self
            .github_client
            .get_manifest(&repository)
            .await
            .map_err(|incoming| ResolutionError::ManifestUnavailable {
                identifier: identifier.to_string(),
                reason: format!("{:#}", incoming),
            })?;

        let origin = DescriptorOrigin::SourceRepository {
            owner: repository.owner,
            repository: repository.name,
        };
        Ok(FetchedPackage::new(descriptor, None, origin))
    }
}

impl DescriptorFetching for RemoteDescriptorFetcher {
    async fn fetch(
        &self,
        identifier: &str,
        constraint: Option<&VersionConstraint>,
    ) -> Result<FetchedPackage, ResolutionError> {
        let local_manifest =
            self.local_manifests
                .read(identifier)
                .await
                .map_err(|incoming| ResolutionError::ManifestParse {
                    identifier: identifier.to_string(),
                    reason: format!("{:#}", incoming),
                })?;

        if let Some(descriptor) = local_manifest {
            return Ok(FetchedPackage::new(descriptor, None, DescriptorOrigin::LocalManifest));
        }

        match constraint {
            None => Err(ResolutionError::RootNotFound {
                identifier: identifier.to_string(),
                path: self.local_manifests.manifest_path(identifier).display().to_string(),
            }),
            Some(VersionConstraint::Range(range)) => self.from_registry(identifier, range).await,
            Some(VersionConstraint::Reference(reference)) => self.from_source_repository(identifier, reference).await,
        }
    }
}

/// Serves canned outcomes and remembers which identifiers were requested,
/// as well as the highest number of fetches seen running at once
#[cfg(test)]
pub struct FakeDescriptorFetcher {
    outcomes: HashMap<String, Result<FetchedPackage, ResolutionError>>,
    requested: Mutex<Vec<String>>,
    latency: Option<Duration>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

#[cfg(test)]
impl FakeDescriptorFetcher {
    pub fn new(outcomes: HashMap<String, Result<FetchedPackage, ResolutionError>>) -> Self {
        Self {
            outcomes,
            requested: Mutex::new(vec![]),
            latency: None,
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..self
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("poisoned lock").clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl DescriptorFetching for FakeDescriptorFetcher {
    async fn fetch(
        &self,
        identifier: &str,
        _: Option<&VersionConstraint>,
    ) -> Result<FetchedPackage, ResolutionError> {
        self.requested.lock().expect("poisoned lock").push(identifier.to_string());

        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);

        match self.outcomes.get(identifier) {
            Some(outcome) => outcome.clone(),
            None => Err(ResolutionError::RegistryUnavailable {
                identifier: identifier.to_string(),
                reason: "unknown package".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::errors::ResolutionError;
    use crate::domain::models::{DescriptorOrigin, VersionConstraint};
    use crate::infra::manifests::LocalManifestReader;
    use crate::infra::networking::github::GithubRawContentClient;
    use crate::infra::networking::http::HTTP_CLIENT;
    use crate::infra::networking::npm::NpmRegistryClient;
    use crate::lictrail::fetcher::{DescriptorFetching, RemoteDescriptorFetcher};
    use assertor::{BooleanAssertion, EqualityAssertion};
    use httpmock::MockServer;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use temp_dir::TempDir;

    fn fetcher(workspace: &Path, mock_server: &MockServer) -> RemoteDescriptorFetcher {
        RemoteDescriptorFetcher::new(
            LocalManifestReader::new(workspace.to_path_buf()),
            NpmRegistryClient::new(mock_server.base_url(), HTTP_CLIENT.clone()),
            Arc::new(GithubRawContentClient::new(mock_server.base_url(), HTTP_CLIENT.clone())),
        )
    }

    fn responds_with_versions<'a>(mock_server: &'a MockServer, package_name: &str) -> httpmock::Mock<'a> {
        let path = format!("/{}", package_name);
        mock_server.mock(|when, then| {
            when.method("GET").path(path);
            then.status(200).header("content-type", "application/json").body(
                r#"
                {
                  "name": "ms",
                  "versions": {
                    "1.0.0": { "version": "1.0.0", "license": "MIT" },
                    "1.2.0": { "version": "1.2.0", "license": "MIT", "dependencies": { "tiny": "^0.1.0" } },
                    "2.0.0": { "version": "2.0.0", "license": "MIT" }
                  }
                }
                "#,
            );
        })
    }

    #[tokio::test]
    async fn should_route_ranges_to_registry() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let mock_server = MockServer::start();
        let mocked = responds_with_versions(&mock_server, "ms");

        let constraint = VersionConstraint::parse("^1.0.0");
        let fetched = fetcher(workspace.path(), &mock_server)
            .fetch("ms", Some(&constraint))
            .await
            .unwrap();

        mocked.assert();
        assertor::assert_that!(fetched.origin).is_equal_to(DescriptorOrigin::Registry {
            version: "1.2.0".to_string(),
        });
        assertor::assert_that!(fetched.descriptor.dependencies.len()).is_equal_to(1);
        assertor::assert_that!(fetched.registry_record.is_some()).is_true();
    }

    #[tokio::test]
    async fn should_surface_unresolvable_versions() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let mock_server = MockServer::start();
        let mocked = responds_with_versions(&mock_server, "ms");

        let constraint = VersionConstraint::parse("^9.0.0");
        let fetched = fetcher(workspace.path(), &mock_server)
            .fetch("ms", Some(&constraint))
            .await;

        mocked.assert();
        let unresolvable = matches!(fetched, Err(ResolutionError::VersionUnresolvable { .. }));
        assertor::assert_that!(unresolvable).is_true();
    }

    #[tokio::test]
    async fn should_route_github_archives_to_source_repository() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let mock_server = MockServer::start();

        let mocked = mock_server.mock(|when, then| {
            when.method("GET").path("/owner/repo/master/package.json");
            then.status(200).body(r#"{ "name": "repo", "license": "ISC" }"#);
        });

        let constraint = VersionConstraint::parse("https://github.com/owner/repo/archive/x.tar.gz");
        let fetched = fetcher(workspace.path(), &mock_server)
            .fetch("repo", Some(&constraint))
            .await
            .unwrap();

        mocked.assert();
        assertor::assert_that!(fetched.origin).is_equal_to(DescriptorOrigin::SourceRepository {
            owner: "owner".to_string(),
            repository: "repo".to_string(),
        });
    }

    #[tokio::test]
    async fn should_reject_archives_hosted_elsewhere() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let mock_server = MockServer::start();

        let constraint = VersionConstraint::parse("https://example.com/archives/lib-1.0.0.tgz");
        let fetched = fetcher(workspace.path(), &mock_server)
            .fetch("lib", Some(&constraint))
            .await;

        let expected = ResolutionError::UnsupportedRepositoryHost {
            identifier: "lib".to_string(),
            reference: "https://example.com/archives/lib-1.0.0.tgz".to_string(),
        };
        assertor::assert_that!(fetched).is_equal_to(Err(expected));
    }

    #[tokio::test]
    async fn should_surface_registry_failures() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let mock_server = MockServer::start();

        let mocked = mock_server.mock(|when, then| {
            when.method("GET").path("/ghost");
            then.status(404);
        });

        let constraint = VersionConstraint::parse("~1.0.0");
        let fetched = fetcher(workspace.path(), &mock_server)
            .fetch("ghost", Some(&constraint))
            .await;

        mocked.assert();
        let unavailable = matches!(fetched, Err(ResolutionError::RegistryUnavailable { .. }));
        assertor::assert_that!(unavailable).is_true();
    }

    #[tokio::test]
    async fn should_prefer_local_manifests_over_registry() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let package_dir = workspace.path().join("ms");
        fs::create_dir_all(&package_dir).expect("cannot create package folder");
        fs::write(package_dir.join("package.json"), r#"{ "name": "ms", "license": "MIT" }"#)
            .expect("failed to write manifest");

        let mock_server = MockServer::start();
        let mocked = responds_with_versions(&mock_server, "ms");

        let constraint = VersionConstraint::parse("^1.0.0");
        let fetched = fetcher(workspace.path(), &mock_server)
            .fetch("ms", Some(&constraint))
            .await
            .unwrap();

        mocked.assert_calls(0);
        assertor::assert_that!(fetched.origin).is_equal_to(DescriptorOrigin::LocalManifest);
    }

    #[tokio::test]
    async fn should_require_local_manifest_without_constraint() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let mock_server = MockServer::start();

        let fetched = fetcher(workspace.path(), &mock_server).fetch("my-app", None).await;

        let not_found = matches!(fetched, Err(ResolutionError::RootNotFound { .. }));
        assertor::assert_that!(not_found).is_true();
    }

    #[tokio::test]
    async fn should_report_malformed_local_manifests() {
        let workspace = TempDir::new().expect("Cant create temp dir");
        let package_dir = workspace.path().join("broken");
        fs::create_dir_all(&package_dir).expect("cannot create package folder");
        fs::write(package_dir.join("package.json"), "{ nope").expect("failed to write manifest");

        let mock_server = MockServer::start();

        let fetched = fetcher(workspace.path(), &mock_server).fetch("broken", None).await;

        let malformed = matches!(fetched, Err(ResolutionError::ManifestParse { .. }));
        assertor::assert_that!(malformed).is_true();
    }
}
