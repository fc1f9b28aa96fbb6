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

mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::{PublishCmd, PushFileCmd};
use pkgpush_config::ConfigLoader;
use pkgpush_observability::{init_tracing, LogFormat};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pkgpush")]
#[command(version, about = "Publish package manifest bumps straight to GitHub")]
#[command(
    long_about = "PkgPush publishes monorepo package manifests to a GitHub repository
without a local git checkout of the target. Version bumps across all packages
land as one commit, composed through the git data API."
)]
#[command(propagate_version = true)]
#[command(author = "PkgPush Contributors")]
#[command(arg_required_else_help = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish all package manifests as one commit
    Publish(PublishCmd),

    /// Push a single file through the contents API
    #[command(name = "push-file")]
    PushFile(PushFileCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize structured logging from the configured format and level;
    // --verbose forces debug, --quiet disables logging entirely. Config
    // problems are surfaced by the command itself, not here.
    if !cli.quiet {
        let config = ConfigLoader::without_validation()
            .load_with_overrides(cli.config.as_deref())
            .await
            .unwrap_or_default();
        let format = config
            .observability
            .log_format
            .parse::<LogFormat>()
            .unwrap_or_default();
        let level = if cli.verbose {
            "debug".to_string()
        } else {
            config.observability.log_level
        };
        init_tracing(format, Some(&level)).ok(); // Ignore errors if already initialized
    }

    // Handle color output
    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {
            // Auto-detect based on terminal capabilities
        }
        _ => {
            eprintln!("Invalid color option: {}", cli.color);
            std::process::exit(1);
        }
    }

    let config_path = cli.config.as_deref();

    // Execute command; a bare invocation publishes with defaults, matching
    // the tool's CI origin where it runs without arguments.
    let result = match cli.command {
        Some(Commands::Publish(cmd)) => cmd.execute(config_path, cli.quiet).await,
        Some(Commands::PushFile(cmd)) => cmd.execute(config_path, cli.quiet).await,
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Completions { shell }) => generate_completions(shell),
        None => PublishCmd::default().execute(config_path, cli.quiet).await,
    };

    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn print_version() {
    println!("pkgpush {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}

fn generate_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "pkgpush", &mut io::stdout());
    Ok(())
}
