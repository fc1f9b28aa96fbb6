use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pkgpush_publish::{list_manifests, PublishOptions, UploadPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output;

/// Publish every package manifest as a single commit
///
/// Walks the configured packages directory, uploads one blob per manifest,
/// and lands them all in one commit on the target branch. A run where no
/// manifest content changed makes no commit.
#[derive(Parser, Debug, Default)]
#[command(after_help = "EXAMPLES:
    # Publish with configured defaults
    pkgpush publish

    # Custom commit message and branch
    pkgpush publish -m \"Release 2.4.0\" --branch release

    # Keep going when a single upload fails
    pkgpush publish --best-effort

    # Preview the file set without calling the API
    pkgpush publish --dry-run

SEE ALSO:
    pkgpush-push-file(1)")]
pub struct PublishCmd {
    /// Commit message
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Target branch (overrides configuration)
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Monorepo root directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Drop files whose upload fails instead of aborting
    #[arg(long, conflicts_with = "abort")]
    pub best_effort: bool,

    /// Abort the run on the first upload failure
    #[arg(long)]
    pub abort: bool,

    /// Commit even when the tree is unchanged
    #[arg(long)]
    pub allow_empty: bool,

    /// List the files that would be published, without calling the API
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishCmd {
    pub async fn execute(&self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let (config, publisher) =
            super::build_publisher(config_path, self.branch.as_deref()).await?;

        let root = self
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.monorepo.root));
        let manifests = list_manifests(&root, &config.monorepo.packages_dir, &config.monorepo.manifest_name)
            .await
            .context("Failed to enumerate package manifests")?;

        if manifests.is_empty() {
            anyhow::bail!(
                "No {} files found under {}/{}",
                config.monorepo.manifest_name,
                root.display(),
                config.monorepo.packages_dir
            );
        }

        if self.dry_run {
            if !quiet {
                println!(
                    "{} Would publish {} file(s) to {}@{}:",
                    style("ℹ").blue(),
                    manifests.len(),
                    publisher.repo(),
                    publisher.branch()
                );
                for manifest in &manifests {
                    println!("  {}", manifest.repo_path);
                }
            }
            return Ok(());
        }

        let policy = if self.best_effort {
            UploadPolicy::BestEffort
        } else if self.abort {
            UploadPolicy::Abort
        } else {
            config
                .push
                .upload_policy
                .parse::<UploadPolicy>()
                .map_err(|e| anyhow::anyhow!(e))?
        };
        let options = PublishOptions {
            policy,
            skip_empty: !self.allow_empty && config.push.skip_empty,
        };
        let message = self
            .message
            .as_deref()
            .unwrap_or(&config.push.commit_message);
        tracing::debug!(
            "Publishing with policy {policy}, skip_empty {}",
            options.skip_empty
        );

        let pb = if !quiet {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!(
                "Publishing {} file(s) to {}@{}...",
                manifests.len(),
                publisher.repo(),
                publisher.branch()
            ));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let report = publisher.publish(&manifests, message, &options).await;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let report = report?;

        if !quiet {
            for dropped in &report.dropped {
                output::warning(&format!(
                    "Dropped {}: {}",
                    dropped.repo_path, dropped.reason
                ));
            }
            if report.unchanged {
                output::info("Nothing to publish: tree unchanged");
            } else if let Some(commit) = &report.commit {
                output::success(&format!(
                    "Published {} file(s) in commit {}",
                    report.pushed.len(),
                    &commit[..commit.len().min(8)]
                ));
                output::detail("Repository", &publisher.repo().to_string());
                output::detail("Branch", publisher.branch());
            }
        }

        Ok(())
    }
}
