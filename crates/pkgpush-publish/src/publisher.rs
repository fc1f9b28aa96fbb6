//! Multi-file publishing pipeline.
//!
//! The flow mirrors the underlying git object model: upload one blob per
//! file (concurrently), create a tree layering the new entries over the
//! branch's current tree, create a commit pointing at that tree with the old
//! head as parent, then fast-forward the branch ref.

use futures::future;
use pkgpush_github::{BlobRecord, GitHubClient, RepoId, TreeEntry};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{PublishError, PublishResult};
use crate::manifest::ManifestFile;

/// What to do when a single blob upload fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPolicy {
    /// Fail the whole run on the first upload error
    #[default]
    Abort,
    /// Drop the failed file from the commit and report it
    BestEffort,
}

impl FromStr for UploadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(UploadPolicy::Abort),
            "best-effort" => Ok(UploadPolicy::BestEffort),
            other => Err(format!(
                "unknown upload policy '{other}', expected 'abort' or 'best-effort'"
            )),
        }
    }
}

impl fmt::Display for UploadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPolicy::Abort => write!(f, "abort"),
            UploadPolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Tunable behavior of a publish run
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Per-file upload failure handling
    pub policy: UploadPolicy,
    /// Skip commit creation when the new tree equals the base tree
    pub skip_empty: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::default(),
            skip_empty: true,
        }
    }
}

/// A file that was left out of the commit under [`UploadPolicy::BestEffort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    /// Repository-relative path of the dropped file
    pub repo_path: String,
    /// Why the upload failed
    pub reason: String,
}

/// Outcome of a publish run
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Id of the created commit; `None` when the run was a no-op
    pub commit: Option<String>,
    /// Repository paths that made it into the tree
    pub pushed: Vec<String>,
    /// Files dropped under best-effort policy, with reasons
    pub dropped: Vec<DroppedFile>,
    /// True when the new tree matched the base tree and the commit was skipped
    pub unchanged: bool,
}

/// Publishes file sets to one branch of one remote repository
pub struct Publisher {
    client: GitHubClient,
    repo: RepoId,
    branch: String,
}

impl Publisher {
    /// Create a publisher targeting `branch` of `repo`
    pub fn new(client: GitHubClient, repo: RepoId, branch: impl Into<String>) -> Self {
        Self {
            client,
            repo,
            branch: branch.into(),
        }
    }

    /// Target repository
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Target branch name
    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub(crate) fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub(crate) fn reference(&self) -> String {
        format!("heads/{}", self.branch)
    }

    /// Publish `files` as one commit on the target branch.
    ///
    /// The base commit and tree are captured once, before any upload; the
    /// final ref update is fast-forward only, so a concurrent writer causes
    /// the run to fail rather than lose history.
    pub async fn publish(
        &self,
        files: &[ManifestFile],
        message: &str,
        options: &PublishOptions,
    ) -> PublishResult<PublishReport> {
        let head = self.client.get_ref(&self.repo, &self.reference()).await?;
        let head_sha = head.object.sha;
        let base_tree = self
            .client
            .get_commit(&self.repo, &head_sha)
            .await?
            .tree
            .sha;

        info!(
            "Publishing {} file(s) to {}@{} (head {})",
            files.len(),
            self.repo,
            self.branch,
            head_sha
        );

        // One create-blob call per file, all issued together and joined
        // before anything touches the tree.
        let uploads = files.iter().map(|file| self.upload_blob(file));
        let results = future::join_all(uploads).await;

        let mut records: Vec<BlobRecord> = Vec::new();
        let mut dropped: Vec<DroppedFile> = Vec::new();
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(sha) => records.push(BlobRecord {
                    path: file.repo_path.clone(),
                    sha,
                }),
                Err(PublishError::UploadFailed { path, source })
                    if options.policy == UploadPolicy::BestEffort =>
                {
                    warn!("Dropping {path} from this run: {source}");
                    dropped.push(DroppedFile {
                        repo_path: path,
                        reason: source.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if records.is_empty() && !files.is_empty() {
            return Err(PublishError::AllUploadsFailed {
                count: dropped.len(),
            });
        }

        let entries: Vec<TreeEntry> = records.iter().map(TreeEntry::regular_file).collect();
        let tree = self
            .client
            .create_tree(&self.repo, &base_tree, entries)
            .await?;

        let pushed: Vec<String> = records.into_iter().map(|r| r.path).collect();

        if options.skip_empty && tree.sha == base_tree {
            info!("Tree unchanged on {}, skipping commit", self.branch);
            return Ok(PublishReport {
                commit: None,
                pushed,
                dropped,
                unchanged: true,
            });
        }

        let commit = self
            .client
            .create_commit(&self.repo, message, &tree.sha, vec![head_sha])
            .await?;
        self.client
            .update_ref(&self.repo, &self.reference(), &commit.sha, false)
            .await?;

        info!("Created commit {} on {}", commit.sha, self.branch);
        Ok(PublishReport {
            commit: Some(commit.sha),
            pushed,
            dropped,
            unchanged: false,
        })
    }

    /// Read one file and register it as a blob.
    ///
    /// Local read failures abort the run regardless of policy; only remote
    /// API failures are subject to best-effort dropping.
    async fn upload_blob(&self, file: &ManifestFile) -> PublishResult<String> {
        let content =
            tokio::fs::read(&file.local_path)
                .await
                .map_err(|source| PublishError::ReadFile {
                    path: file.local_path.clone(),
                    source,
                })?;

        self.client
            .create_blob(&self.repo, &content)
            .await
            .map_err(|source| PublishError::UploadFailed {
                path: file.repo_path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_policy_parses_known_values() {
        assert_eq!("abort".parse::<UploadPolicy>().unwrap(), UploadPolicy::Abort);
        assert_eq!(
            "best-effort".parse::<UploadPolicy>().unwrap(),
            UploadPolicy::BestEffort
        );
        assert!("halt".parse::<UploadPolicy>().is_err());
    }

    #[test]
    fn upload_policy_display_round_trips() {
        for policy in [UploadPolicy::Abort, UploadPolicy::BestEffort] {
            assert_eq!(policy.to_string().parse::<UploadPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn default_options_abort_and_skip_empty() {
        let options = PublishOptions::default();
        assert_eq!(options.policy, UploadPolicy::Abort);
        assert!(options.skip_empty);
    }
}
