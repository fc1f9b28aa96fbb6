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

//! Tracing subscriber setup.

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Initialize tracing with a format and optional level filter.
///
/// Convenience wrapper over [`init_tracing_with_config`]; with `level` set to
/// `None` the filter comes from `RUST_LOG`, defaulting to "info".
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(config)
}

/// Initialize tracing from a full [`LogConfig`].
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(config.effective_level())
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;
    let registry = Registry::default().with(filter);
    let writer = make_writer(config.output);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(writer).with_target(false))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_writer(writer).compact())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(writer).json())
            .try_init(),
    };

    result.map_err(|_| LogError::AlreadyInitialized)?;
    tracing::debug!(
        "Tracing initialized: {:?} format, filter '{}'",
        config.format,
        config.effective_level()
    );
    Ok(())
}

fn make_writer(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}
