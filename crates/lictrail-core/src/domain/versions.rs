// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

//! Version ranges following the npm dialect, evaluated on top of the `semver` crate.
//!
//! `semver` speaks the Cargo dialect, so npm specific syntax is rewritten before parsing :
//! `||` alternatives become separate requirements, hyphen ranges become a pair of
//! inclusive comparators, whitespace separated comparators are joined with commas and
//! bare versions become exact matches.

use semver::{Version, VersionReq};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NpmRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Returns `None` when `raw` is not a valid range, which makes it an opaque reference
    pub fn parse(raw: &str) -> Option<Self> {
        let alternatives = raw
            .split("||")
            .map(translate_comparator_set)
            .map(|translated| VersionReq::parse(&translated).ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|requirement| requirement.matches(version))
    }
}

fn translate_comparator_set(comparator_set: &str) -> String {
    let trimmed = comparator_set.trim().replace("~>", "~");

    if trimmed.is_empty() {
        return "*".to_string();
    }

    if let Some((lower, upper)) = trimmed.split_once(" - ") {
        return format!(">={}, <={}", strip_version_prefix(lower.trim()), strip_version_prefix(upper.trim()));
    }

    let mut comparators: Vec<String> = vec![];
    let mut pending_operator: Option<&str> = None;

    for token in trimmed.split_whitespace() {
        if token.chars().all(|character| "<>=~^".contains(character)) {
            pending_operator = Some(token);
            continue;
        }

        let comparator = match pending_operator.take() {
            Some(operator) => format!("{}{}", operator, token),
            None => token.to_string(),
        };

        comparators.push(translate_comparator(&comparator));
    }

    if let Some(dangling) = pending_operator {
        // lets semver reject it
        comparators.push(dangling.to_string());
    }

    comparators.join(", ")
}

fn translate_comparator(comparator: &str) -> String {
    let operator_length = comparator
        .chars()
        .take_while(|character| "<>=~^".contains(*character))
        .count();

    let (operator, version) = comparator.split_at(operator_length);
    let version = strip_version_prefix(version);

    match (operator, without_wildcards(version)) {
        ("", None) => format!("={}", version),
        (_, Some(concrete)) if concrete.is_empty() => "*".to_string(),
        ("", Some(concrete)) => format!("{}.*", concrete),
        (operator, Some(concrete)) => format!("{}{}", operator, concrete),
        (operator, None) => format!("{}{}", operator, version),
    }
}

fn strip_version_prefix(version: &str) -> &str {
    version.strip_prefix(['v', 'V']).unwrap_or(version)
}

/// Keeps the components before the first `*`, `x` or `X`, or `None` when there is no wildcard at all
fn without_wildcards(version: &str) -> Option<String> {
    let core = version.split(['-', '+']).next().unwrap_or(version);
    let components = core.split('.').collect::<Vec<_>>();
    let concrete = components
        .iter()
        .take_while(|component| **component != "*" && !component.eq_ignore_ascii_case("x"))
        .count();

    if concrete == components.len() {
        return None;
    }

    Some(components[..concrete].join("."))
}

/// Picks the highest available version satisfying `range`.
///
/// Versions that are not valid semver never match.
pub fn resolve<'a, I>(available_versions: I, range: &NpmRange) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut candidates = available_versions
        .into_iter()
        .filter_map(|raw| match Version::parse(raw) {
            Ok(version) => Some((version, raw)),
            Err(_) => {
                log::info!("[lictrail.versions] ignoring invalid version {}", raw);
                None
            },
        })
        .collect::<Vec<_>>();

    candidates.sort_by(|(left, _), (right, _)| right.cmp(left));

    candidates
        .into_iter()
        .find(|(version, _)| range.matches(version))
        .map(|(_, raw)| raw.to_string())
}
