// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use url::Url;

static GITHUB_HOSTS: [&str; 2] = ["github.com", "www.github.com"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GithubRepository {
    pub owner: String,
    pub name: String,
}

impl GithubRepository {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Understands repository URLs (`git+https://`, `git://`, `git+ssh://`) as well as archive URLs,
    /// as long as they are hosted on GitHub. Anything else yields `None`.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let without_vcs_prefix = reference.trim().strip_prefix("git+").unwrap_or(reference.trim());
        let parsed = Url::parse(without_vcs_prefix).ok()?;

        let host = parsed.host_str()?;
        if !GITHUB_HOSTS.contains(&host) {
            return None;
        }

        let mut segments = parsed.path_segments()?.filter(|segment| !segment.is_empty());
        let owner = segments.next()?;
        let name = segments.next()?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        if name.is_empty() {
            return None;
        }

        Some(Self::new(owner, name))
    }
}

/// Where license files of a package can be fetched from, without authentication
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositorySourceLocation {
    pub raw_content_base_url: String,
}

impl RepositorySourceLocation {
    pub fn new(repository: &GithubRepository, raw_content_host: &str) -> Self {
        let raw_content_base_url = format!(
            "{}/{}/{}/master/",
            raw_content_host.trim_end_matches('/'),
            repository.owner,
            repository.name
        );

        Self { raw_content_base_url }
    }

    pub fn file_url(&self, file_name: &str) -> String {
        format!("{}{}", self.raw_content_base_url, file_name)
    }
}
