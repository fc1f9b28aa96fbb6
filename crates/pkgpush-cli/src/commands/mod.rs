mod publish;
mod push_file;

pub use publish::PublishCmd;
pub use push_file::PushFileCmd;

use anyhow::{Context, Result};
use pkgpush_config::{Config, ConfigLoader};
use pkgpush_github::{GitHubClient, RepoId};
use pkgpush_publish::Publisher;
use std::path::Path;

/// Load configuration and build a publisher from it.
///
/// Target repository and token can come from the config file or from the
/// environment; both are required here even though the config layer treats
/// them as optional, so standalone commands like `completions` still work
/// without them.
pub(crate) async fn build_publisher(
    config_path: Option<&Path>,
    branch_override: Option<&str>,
) -> Result<(Config, Publisher)> {
    let config = ConfigLoader::new()
        .load_with_overrides(config_path)
        .await
        .context("Failed to load configuration")?;

    if config.repo.owner.is_empty() || config.repo.name.is_empty() {
        anyhow::bail!(
            "No target repository configured (set [repo] owner/name or PKGPUSH_REPO_SLUG)"
        );
    }
    let repo = RepoId::new(&config.repo.owner, &config.repo.name);

    let token = config.github.token.as_deref().ok_or_else(|| {
        anyhow::anyhow!("No GitHub token configured (set GITHUB_TOKEN or PKGPUSH_TOKEN)")
    })?;

    let client = GitHubClient::new(&config.github.api_base, token, &config.github.user_agent)
        .context("Failed to construct API client")?;

    let branch = branch_override.unwrap_or(&config.repo.branch).to_string();
    let publisher = Publisher::new(client, repo, branch);
    Ok((config, publisher))
}
