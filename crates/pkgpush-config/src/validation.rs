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

//! Configuration validation.
//!
//! Validation rejects values that can never work (bad URLs, unknown policy
//! names). Presence of the repository slug and token is checked at run time
//! by the CLI, because a config file without them is still valid when the
//! environment supplies them.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];
const UPLOAD_POLICIES: &[&str] = &["abort", "best-effort"];

/// Configuration validator
pub struct Validator;

impl Validator {
    /// Validate a complete configuration
    pub fn validate(config: &Config) -> ConfigResult<()> {
        Self::validate_github(config)?;
        Self::validate_repo(config)?;
        Self::validate_monorepo(config)?;
        Self::validate_push(config)?;
        Self::validate_observability(config)?;
        Ok(())
    }

    fn validate_github(config: &Config) -> ConfigResult<()> {
        let api_base = &config.github.api_base;
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(ConfigError::validation_error(format!(
                "github.api_base must be an http(s) URL, got '{api_base}'"
            )));
        }
        if config.github.user_agent.trim().is_empty() {
            return Err(ConfigError::validation_error(
                "github.user_agent must not be empty",
            ));
        }
        Ok(())
    }

    fn validate_repo(config: &Config) -> ConfigResult<()> {
        for (field, value) in [
            ("repo.owner", &config.repo.owner),
            ("repo.name", &config.repo.name),
        ] {
            if value.contains('/') || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::validation_error(format!(
                    "{field} must not contain slashes or whitespace, got '{value}'"
                )));
            }
        }
        if config.repo.branch.trim().is_empty() {
            return Err(ConfigError::validation_error(
                "repo.branch must not be empty",
            ));
        }
        Ok(())
    }

    fn validate_monorepo(config: &Config) -> ConfigResult<()> {
        if config.monorepo.packages_dir.trim().is_empty() {
            return Err(ConfigError::validation_error(
                "monorepo.packages_dir must not be empty",
            ));
        }
        if config.monorepo.manifest_name.trim().is_empty()
            || config.monorepo.manifest_name.contains('/')
        {
            return Err(ConfigError::validation_error(format!(
                "monorepo.manifest_name must be a plain file name, got '{}'",
                config.monorepo.manifest_name
            )));
        }
        Ok(())
    }

    fn validate_push(config: &Config) -> ConfigResult<()> {
        if config.push.commit_message.trim().is_empty() {
            return Err(ConfigError::validation_error(
                "push.commit_message must not be empty",
            ));
        }
        if !UPLOAD_POLICIES.contains(&config.push.upload_policy.as_str()) {
            return Err(ConfigError::validation_error(format!(
                "push.upload_policy must be one of {UPLOAD_POLICIES:?}, got '{}'",
                config.push.upload_policy
            )));
        }
        Ok(())
    }

    fn validate_observability(config: &Config) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
            return Err(ConfigError::validation_error(format!(
                "observability.log_level must be one of {LOG_LEVELS:?}, got '{}'",
                config.observability.log_level
            )));
        }
        if !LOG_FORMATS.contains(&config.observability.log_format.as_str()) {
            return Err(ConfigError::validation_error(format!(
                "observability.log_format must be one of {LOG_FORMATS:?}, got '{}'",
                config.observability.log_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Validator::validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_bad_api_base_rejected() {
        let mut config = Config::default();
        config.github.api_base = "api.github.com".to_string();
        assert!(Validator::validate(&config).is_err());
    }

    #[test]
    fn test_slashed_owner_rejected() {
        let mut config = Config::default();
        config.repo.owner = "octo/org".to_string();
        assert!(Validator::validate(&config).is_err());
    }

    #[test]
    fn test_empty_branch_rejected() {
        let mut config = Config::default();
        config.repo.branch = "  ".to_string();
        assert!(Validator::validate(&config).is_err());
    }

    #[test]
    fn test_nested_manifest_name_rejected() {
        let mut config = Config::default();
        config.monorepo.manifest_name = "meta/package.json".to_string();
        assert!(Validator::validate(&config).is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let mut config = Config::default();
        config.push.upload_policy = "sometimes".to_string();
        assert!(Validator::validate(&config).is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = Config::default();
        config.observability.log_level = "loud".to_string();
        assert!(Validator::validate(&config).is_err());
    }
}
