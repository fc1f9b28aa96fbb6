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

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML configuration file
    Toml,
    /// JSON configuration file
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let format = ConfigFormat::from_path(path)?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        debug!("Configuration loaded from {}", format.name());

        if self.validate {
            Validator::validate(&config)?;
        }

        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Starts from the file when one is given, from defaults otherwise, then
    /// layers the `PKGPUSH_*` overrides (plus `GITHUB_TOKEN`) on top and
    /// validates the result.
    pub async fn load_with_overrides(&self, path: Option<&Path>) -> ConfigResult<Config> {
        let mut config = match path {
            Some(path) => ConfigLoader::without_validation().load_file(path).await?,
            None => Config::default(),
        };

        self.apply_env_overrides(&mut config)?;

        if self.validate {
            Validator::validate(&config)?;
        }

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        // Token: the tool-specific variable wins over the conventional one
        if let Ok(value) = std::env::var("PKGPUSH_TOKEN") {
            config.github.token = Some(value);
        } else if let Ok(value) = std::env::var("GITHUB_TOKEN") {
            config.github.token = Some(value);
        }

        if let Ok(value) = std::env::var("PKGPUSH_API_BASE") {
            config.github.api_base = value;
        }
        if let Ok(value) = std::env::var("PKGPUSH_USER_AGENT") {
            config.github.user_agent = value;
        }

        // Repository slug, as CI systems export it ("owner/name")
        if let Ok(value) = std::env::var("PKGPUSH_REPO_SLUG") {
            let (owner, name) = value.split_once('/').ok_or_else(|| {
                ConfigError::env_var_parsing_error(
                    "PKGPUSH_REPO_SLUG",
                    value.clone(),
                    "Expected 'owner/name'",
                )
            })?;
            if owner.is_empty() || name.is_empty() || name.contains('/') {
                return Err(ConfigError::env_var_parsing_error(
                    "PKGPUSH_REPO_SLUG",
                    value.clone(),
                    "Expected 'owner/name'",
                ));
            }
            config.repo.owner = owner.to_string();
            config.repo.name = name.to_string();
        }
        if let Ok(value) = std::env::var("PKGPUSH_BRANCH") {
            config.repo.branch = value;
        }

        if let Ok(value) = std::env::var("PKGPUSH_MONOREPO_ROOT") {
            config.monorepo.root = value;
        }
        if let Ok(value) = std::env::var("PKGPUSH_PACKAGES_DIR") {
            config.monorepo.packages_dir = value;
        }
        if let Ok(value) = std::env::var("PKGPUSH_MANIFEST_NAME") {
            config.monorepo.manifest_name = value;
        }

        if let Ok(value) = std::env::var("PKGPUSH_COMMIT_MESSAGE") {
            config.push.commit_message = value;
        }
        if let Ok(value) = std::env::var("PKGPUSH_UPLOAD_POLICY") {
            config.push.upload_policy = value;
        }
        if let Ok(value) = std::env::var("PKGPUSH_SKIP_EMPTY") {
            config.push.skip_empty = parse_bool("PKGPUSH_SKIP_EMPTY", &value)?;
        }

        if let Ok(value) = std::env::var("PKGPUSH_LOG_LEVEL") {
            config.observability.log_level = value;
        }
        if let Ok(value) = std::env::var("PKGPUSH_LOG_FORMAT") {
            config.observability.log_format = value;
        }

        Ok(())
    }
}

/// Parse boolean-ish environment values
fn parse_bool(variable: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_var_parsing_error(
            variable,
            value,
            "Expected a boolean (true/false, yes/no, 1/0, on/off)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path("pkgpush.toml").unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path("pkgpush.json").unwrap(),
            ConfigFormat::Json
        );
        assert!(matches!(
            ConfigFormat::from_path("pkgpush.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ConfigFormat::from_path("pkgpush"),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_load_toml_string() {
        let content = r#"
[repo]
owner = "octo-org"
name = "widgets"
branch = "release"

[push]
commit_message = "bump versions"
"#;
        let config = ConfigLoader::new()
            .load_from_string(content, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.repo.owner, "octo-org");
        assert_eq!(config.repo.branch, "release");
        assert_eq!(config.push.commit_message, "bump versions");
        // Untouched sections keep their defaults
        assert_eq!(config.monorepo.packages_dir, "packages");
    }

    #[test]
    fn test_load_json_string() {
        let content = r#"{"repo":{"owner":"octo-org","name":"widgets"}}"#;
        let config = ConfigLoader::new()
            .load_from_string(content, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.repo.name, "widgets");
    }

    #[test]
    fn test_invalid_policy_fails_validation() {
        let content = r#"
[push]
upload_policy = "sometimes"
"#;
        let result = ConfigLoader::new().load_from_string(content, ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_bool_values() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "YES").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
