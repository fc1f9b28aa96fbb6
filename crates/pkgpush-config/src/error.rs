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

//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;

/// Error types for configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO failure while reading the configuration file
    #[error("IO error reading configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file was not valid TOML
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Configuration file was not valid JSON
    #[error("Failed to parse JSON configuration: {0}")]
    JsonParseError(#[from] serde_json::error::Error),

    /// A configuration value failed validation
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// File extension did not map to a supported format
    #[error("Unsupported configuration format: {0}. Supported formats: toml, json")]
    UnsupportedFormat(String),

    /// Configuration file does not exist
    #[error("Configuration file not found at path: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path had no usable extension
    #[error("Invalid configuration path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// An environment override carried an unusable value
    #[error("Environment variable parsing error: {variable_name}={value}. {reason}")]
    EnvVarParsingError {
        /// Name of the offending variable
        variable_name: String,
        /// Value that failed to parse
        value: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Build a validation error from any message
    pub fn validation_error(message: impl Into<String>) -> Self {
        ConfigError::ValidationError(message.into())
    }

    /// Build an environment-override parsing error
    pub fn env_var_parsing_error(
        variable_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParsingError {
            variable_name: variable_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
