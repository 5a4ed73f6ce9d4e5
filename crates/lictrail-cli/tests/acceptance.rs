// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use temp_dir::TempDir;

fn sut() -> Command {
    Command::cargo_bin("lictrail").expect("Should be able to create a command")
}

fn write_manifest(workspace: &Path, package: &str, manifest: &str) {
    let package_dir = workspace.join(package);
    fs::create_dir_all(&package_dir).expect("cannot create package folder");
    fs::write(package_dir.join("package.json"), manifest).expect("failed to write manifest");
}

#[test]
fn should_show_usage() {
    let execution = sut().arg("--help").assert();

    execution.success().stdout(contains("Usage: lictrail"));
}

#[test]
fn should_require_root_package() {
    let execution = sut().assert();

    execution.failure();
}

#[test]
fn should_report_declared_license_of_local_package() {
    let workspace = TempDir::new().expect("Cant create temp dir");
    write_manifest(workspace.path(), "my-app", r#"{ "name": "my-app", "license": "MIT" }"#);

    let execution = sut()
        .args(["my-app", "1", "--format", "csv", "--no-colors", "--workspace"])
        .arg(workspace.path())
        .assert();

    execution.success().stdout(contains("my-app,MIT,,0"));
}

#[test]
fn should_walk_local_dependencies_first() {
    let workspace = TempDir::new().expect("Cant create temp dir");
    write_manifest(
        workspace.path(),
        "my-app",
        r#"{ "name": "my-app", "license": "MIT", "dependencies": { "vendored": "^1.0.0" } }"#,
    );
    write_manifest(
        workspace.path(),
        "vendored",
        r#"{ "name": "vendored", "license": { "type": "BSD-3-Clause", "url": "https://opensource.org/licenses/BSD-3-Clause" } }"#,
    );

    let execution = sut()
        .args(["my-app", "--format", "csv", "--workspace"])
        .arg(workspace.path())
        .assert();

    execution
        .success()
        .stdout(contains("my-app,MIT,,0"))
        .stdout(contains("vendored,BSD-3-Clause,https://opensource.org/licenses/BSD-3-Clause,1"));
}

#[test]
fn should_fail_when_root_package_is_missing() {
    let workspace = TempDir::new().expect("Cant create temp dir");

    let execution = sut()
        .args(["not-there", "--format", "csv", "--workspace"])
        .arg(workspace.path())
        .assert();

    execution.failure().stderr(contains("no manifest found for not-there"));
}
