// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 PkgPush Contributors

//! End-to-end CLI tests against an in-process API double.
//!
//! Each test spawns a `MockGitHub`, points the binary at it through
//! environment overrides, and asserts on both process output and the
//! mock's recorded state.

use assert_cmd::Command;
use pkgpush_test_utils::MockGitHub;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn pkgpush() -> Command {
    Command::cargo_bin("pkgpush").unwrap()
}

/// Build a local monorepo checkout with the given package manifests
fn monorepo(packages: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in packages {
        let pkg_dir = dir.path().join("packages").join(name);
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("package.json"), content).unwrap();
    }
    dir
}

/// Point a command at the mock server and checkout via environment overrides
fn configure(cmd: &mut Command, server: &MockGitHub, root: &Path) {
    cmd.env("GITHUB_TOKEN", "ghp_cli_test")
        .env("PKGPUSH_API_BASE", server.url())
        .env("PKGPUSH_REPO_SLUG", "acme/release-train")
        .env("PKGPUSH_BRANCH", "master")
        .env("PKGPUSH_MONOREPO_ROOT", root)
        .env("PKGPUSH_COMMIT_MESSAGE", "Release of new version!")
        .env("RUST_LOG", "error");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn publish_lands_one_commit() {
    let server = MockGitHub::spawn().await;
    let base = server.seed_branch(
        "master",
        &[("packages/pkg-a/package.json", br#"{"version":"1.0.0"}"# as &[u8])],
    );
    let checkout = monorepo(&[
        ("pkg-a", r#"{"version":"1.1.0"}"#),
        ("pkg-b", r#"{"version":"0.2.0"}"#),
    ]);

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    tokio::task::spawn_blocking(move || {
        cmd.arg("publish")
            .assert()
            .success()
            .stdout(predicate::str::contains("Published 2 file(s) in commit"));
    })
    .await
    .unwrap();

    let head = server.head("master").unwrap();
    assert_ne!(head, base);
    let commit = server.commit(&head).unwrap();
    assert_eq!(commit.message, "Release of new version!");
    assert_eq!(
        server.file_at_head("master", "packages/pkg-b/package.json"),
        Some(br#"{"version":"0.2.0"}"#.to_vec())
    );

    let counts = server.counts();
    assert_eq!(counts.create_blob, 2);
    assert_eq!(counts.create_tree, 1);
    assert_eq!(counts.create_commit, 1);
    assert_eq!(counts.update_ref, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bare_invocation_defaults_to_publish() {
    let server = MockGitHub::spawn().await;
    let base = server.seed_branch("master", &[]);
    let checkout = monorepo(&[("pkg-a", r#"{"version":"1.0.0"}"#)]);

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    assert_ne!(server.head("master").unwrap(), base);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unchanged_checkout_skips_the_commit() {
    let server = MockGitHub::spawn().await;
    let manifest = br#"{"version":"1.0.0"}"# as &[u8];
    let base = server.seed_branch("master", &[("packages/pkg-a/package.json", manifest)]);
    let checkout = monorepo(&[("pkg-a", r#"{"version":"1.0.0"}"#)]);

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    tokio::task::spawn_blocking(move || {
        cmd.arg("publish")
            .assert()
            .success()
            .stdout(predicate::str::contains("tree unchanged"));
    })
    .await
    .unwrap();

    assert_eq!(server.head("master").unwrap(), base);
    assert_eq!(server.counts().create_commit, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dry_run_lists_files_without_touching_the_api() {
    let server = MockGitHub::spawn().await;
    server.seed_branch("master", &[]);
    let checkout = monorepo(&[("pkg-a", r#"{"version":"1.0.0"}"#)]);

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    tokio::task::spawn_blocking(move || {
        cmd.args(["publish", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("packages/pkg-a/package.json"));
    })
    .await
    .unwrap();

    let counts = server.counts();
    assert_eq!(counts.create_blob, 0);
    assert_eq!(counts.get_ref, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_token_fails_with_a_hint() {
    let server = MockGitHub::spawn().await;
    server.seed_branch("master", &[]);
    let checkout = monorepo(&[("pkg-a", "{}")]);

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    cmd.env_remove("GITHUB_TOKEN").env_remove("PKGPUSH_TOKEN");
    tokio::task::spawn_blocking(move || {
        cmd.arg("publish")
            .assert()
            .failure()
            .stderr(predicate::str::contains("GITHUB_TOKEN"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_packages_dir_is_an_error() {
    let server = MockGitHub::spawn().await;
    server.seed_branch("master", &[]);
    let checkout = TempDir::new().unwrap();
    fs::create_dir_all(checkout.path().join("packages")).unwrap();

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    tokio::task::spawn_blocking(move || {
        cmd.arg("publish")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No package.json files found"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn push_file_creates_and_reports() {
    let server = MockGitHub::spawn().await;
    server.seed_branch("master", &[]);
    let checkout = TempDir::new().unwrap();
    let local = checkout.path().join("CHANGELOG.md");
    fs::write(&local, "## 1.1.0\n").unwrap();

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    let local_arg = local.clone();
    tokio::task::spawn_blocking(move || {
        cmd.args(["push-file"])
            .arg(&local_arg)
            .args(["--repo-path", "CHANGELOG.md", "-m", "Add changelog"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created CHANGELOG.md"));
    })
    .await
    .unwrap();

    assert_eq!(
        server.file_at_head("master", "CHANGELOG.md"),
        Some(b"## 1.1.0\n".to_vec())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn push_file_reports_unchanged_content() {
    let server = MockGitHub::spawn().await;
    server.seed_branch("master", &[("CHANGELOG.md", b"## 1.0.0\n" as &[u8])]);
    let checkout = TempDir::new().unwrap();
    let local = checkout.path().join("CHANGELOG.md");
    fs::write(&local, "## 1.0.0\n").unwrap();

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    let local_arg = local.clone();
    tokio::task::spawn_blocking(move || {
        cmd.args(["push-file"])
            .arg(&local_arg)
            .args(["--repo-path", "CHANGELOG.md"])
            .assert()
            .success()
            .stdout(predicate::str::contains("unchanged"));
    })
    .await
    .unwrap();

    assert_eq!(server.counts().put_contents, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn log_format_override_switches_to_json() {
    let server = MockGitHub::spawn().await;
    server.seed_branch("master", &[]);
    let checkout = monorepo(&[("pkg-a", r#"{"version":"1.0.0"}"#)]);

    let mut cmd = pkgpush();
    configure(&mut cmd, &server, checkout.path());
    cmd.env("PKGPUSH_LOG_FORMAT", "json")
        .env("PKGPUSH_LOG_LEVEL", "info");
    tokio::task::spawn_blocking(move || {
        // The pipeline logs at info level; with the configured json format
        // those lines land on stderr as JSON objects.
        cmd.arg("publish")
            .assert()
            .success()
            .stderr(predicate::str::contains(r#""level":"INFO""#));
    })
    .await
    .unwrap();
}

#[test]
fn version_prints_package_metadata() {
    pkgpush()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pkgpush"));
}

#[test]
fn completions_generate_for_bash() {
    pkgpush()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pkgpush"));
}
