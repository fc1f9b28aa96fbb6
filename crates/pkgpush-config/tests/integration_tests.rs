// Copyright (C) 2026 PkgPush Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Integration tests for configuration loading.

use pkgpush_config::{ConfigError, ConfigLoader};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn loads_toml_file_with_defaults_for_missing_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pkgpush.toml");
    fs::write(
        &path,
        r#"
[repo]
owner = "octo-org"
name = "widgets"

[monorepo]
root = "/srv/checkout"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(&path).await.unwrap();
    assert_eq!(config.repo.slug(), "octo-org/widgets");
    assert_eq!(config.monorepo.root, "/srv/checkout");
    assert_eq!(config.repo.branch, "main");
    assert_eq!(config.push.commit_message, "Release of new version!");
}

#[tokio::test]
async fn missing_file_is_a_typed_error() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::new()
        .load_file(dir.path().join("absent.toml"))
        .await;
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[tokio::test]
async fn malformed_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pkgpush.toml");
    fs::write(&path, "[repo\nowner=").unwrap();

    let result = ConfigLoader::new().load_file(&path).await;
    assert!(matches!(result, Err(ConfigError::TomlParseError(_))));
}

// Environment overrides are exercised in one test to avoid concurrent
// mutation of process-wide state.
#[tokio::test]
async fn environment_overrides_layer_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pkgpush.toml");
    fs::write(
        &path,
        r#"
[repo]
owner = "from-file"
name = "from-file"
"#,
    )
    .unwrap();

    let vars = [
        ("GITHUB_TOKEN", "env-token"),
        ("PKGPUSH_REPO_SLUG", "octo-org/widgets"),
        ("PKGPUSH_BRANCH", "release"),
        ("PKGPUSH_API_BASE", "http://127.0.0.1:9999"),
        ("PKGPUSH_COMMIT_MESSAGE", "bump"),
        ("PKGPUSH_UPLOAD_POLICY", "best-effort"),
        ("PKGPUSH_SKIP_EMPTY", "no"),
        ("PKGPUSH_LOG_FORMAT", "json"),
    ];
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = ConfigLoader::new().load_with_overrides(Some(&path)).await;

    for (key, _) in vars {
        std::env::remove_var(key);
    }

    let config = result.unwrap();
    assert_eq!(config.github.token.as_deref(), Some("env-token"));
    assert_eq!(config.repo.slug(), "octo-org/widgets");
    assert_eq!(config.repo.branch, "release");
    assert_eq!(config.github.api_base, "http://127.0.0.1:9999");
    assert_eq!(config.push.commit_message, "bump");
    assert_eq!(config.push.upload_policy, "best-effort");
    assert!(!config.push.skip_empty);
    assert_eq!(config.observability.log_format, "json");

    // A malformed slug override is a typed error
    std::env::set_var("PKGPUSH_REPO_SLUG", "no-slash");
    let mut config = pkgpush_config::Config::default();
    let result = ConfigLoader::new().apply_env_overrides(&mut config);
    std::env::remove_var("PKGPUSH_REPO_SLUG");
    assert!(matches!(
        result,
        Err(ConfigError::EnvVarParsingError { .. })
    ));
}
