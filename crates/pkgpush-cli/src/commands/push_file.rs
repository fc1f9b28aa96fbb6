use anyhow::{Context, Result};
use clap::Parser;
use pkgpush_publish::{FilePushOutcome, FilePushRequest};
use std::path::{Path, PathBuf};

use crate::output;

/// Push a single file to the target branch
///
/// Uses the service's contents API, which creates the commit itself. When
/// the remote content already matches the local file nothing is pushed,
/// unless `--force-unchanged` is given.
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    # Push a changelog to its checkout-relative path
    pkgpush push-file CHANGELOG.md

    # Push under a different repository path
    pkgpush push-file build/notes.md --repo-path docs/notes.md

    # Replace the remote file even when identical
    pkgpush push-file CHANGELOG.md --force-unchanged")]
pub struct PushFileCmd {
    /// Local file to push
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Commit message
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Destination path in the repository (defaults to PATH relative to the
    /// monorepo root)
    #[arg(long, value_name = "REPO_PATH")]
    pub repo_path: Option<String>,

    /// Push even when the remote content already matches
    #[arg(long)]
    pub force_unchanged: bool,
}

impl PushFileCmd {
    pub async fn execute(&self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let (config, publisher) = super::build_publisher(config_path, None).await?;

        let repo_path = match &self.repo_path {
            Some(path) => path.clone(),
            None => default_repo_path(&self.path, Path::new(&config.monorepo.root))?,
        };
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| config.push.commit_message.clone());

        let outcome = publisher
            .push_file(&FilePushRequest {
                local_path: self.path.clone(),
                repo_path: repo_path.clone(),
                message,
                force_unchanged: self.force_unchanged,
            })
            .await?;

        if !quiet {
            match outcome {
                FilePushOutcome::Created { commit } => {
                    output::success(&format!(
                        "Created {} in commit {}",
                        repo_path,
                        &commit[..commit.len().min(8)]
                    ));
                }
                FilePushOutcome::Updated { commit } => {
                    output::success(&format!(
                        "Updated {} in commit {}",
                        repo_path,
                        &commit[..commit.len().min(8)]
                    ));
                }
                FilePushOutcome::Unchanged => {
                    output::info(&format!("{repo_path} is unchanged, nothing pushed"));
                }
            }
        }

        Ok(())
    }
}

/// Derive the repository path from the local path, relative to the monorepo
/// root when the file lives under it. Always forward slashes.
fn default_repo_path(local: &Path, root: &Path) -> Result<String> {
    let relative = local.strip_prefix(root).unwrap_or(local);
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            std::path::Component::Normal(part) => {
                let part = part
                    .to_str()
                    .context("File path is not valid UTF-8; pass --repo-path")?;
                parts.push(part);
            }
            std::path::Component::CurDir => {}
            _ => anyhow::bail!(
                "Cannot derive a repository path from {}; pass --repo-path",
                local.display()
            ),
        }
    }
    if parts.is_empty() {
        anyhow::bail!(
            "Cannot derive a repository path from {}; pass --repo-path",
            local.display()
        );
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_path_strips_root_prefix() {
        let path = default_repo_path(
            Path::new("checkout/packages/pkg-a/package.json"),
            Path::new("checkout"),
        )
        .unwrap();
        assert_eq!(path, "packages/pkg-a/package.json");
    }

    #[test]
    fn repo_path_outside_root_is_kept_relative() {
        let path = default_repo_path(Path::new("CHANGELOG.md"), Path::new(".")).unwrap();
        assert_eq!(path, "CHANGELOG.md");
    }

    #[test]
    fn repo_path_rejects_parent_components() {
        assert!(default_repo_path(Path::new("../escape.md"), Path::new(".")).is_err());
    }
}
