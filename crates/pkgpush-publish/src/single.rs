//! Single-file publishing through the contents API.
//!
//! This path bypasses the blob/tree/commit pipeline: the service creates the
//! commit itself from one "create or update file" call. It shares the client
//! and target configuration with the multi-file path but stays a separate
//! operation, since the two remote APIs differ.

use pkgpush_github::FileUpdate;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{PublishError, PublishResult};
use crate::publisher::Publisher;

/// A single-file push
#[derive(Debug, Clone)]
pub struct FilePushRequest {
    /// Path of the file in the local checkout
    pub local_path: PathBuf,
    /// Repository-relative destination path
    pub repo_path: String,
    /// Commit message for the generated commit
    pub message: String,
    /// Push even when the remote content already matches
    pub force_unchanged: bool,
}

/// Outcome of a single-file push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePushOutcome {
    /// The file did not exist on the remote and was created
    Created {
        /// Commit the service created
        commit: String,
    },
    /// The file existed and was replaced
    Updated {
        /// Commit the service created
        commit: String,
    },
    /// Remote content already matched; no commit was made
    Unchanged,
}

impl Publisher {
    /// Push one file, creating it when absent and replacing it otherwise.
    ///
    /// A missing remote file (404) means "create new"; an existing file's
    /// content hash is passed back to the service, which requires it for
    /// optimistic-concurrency updates. Unchanged content is a no-op unless
    /// forced.
    pub async fn push_file(&self, request: &FilePushRequest) -> PublishResult<FilePushOutcome> {
        let content =
            tokio::fs::read(&request.local_path)
                .await
                .map_err(|source| PublishError::ReadFile {
                    path: request.local_path.clone(),
                    source,
                })?;

        let existing = self
            .client()
            .get_contents(self.repo(), &request.repo_path, Some(self.branch()))
            .await?;

        if let Some(info) = &existing {
            if !request.force_unchanged && info.decoded_content()? == content {
                info!("{} is unchanged, skipping push", request.repo_path);
                return Ok(FilePushOutcome::Unchanged);
            }
        } else {
            debug!("{} not found on remote, will create", request.repo_path);
        }

        let prior_sha = existing.map(|info| info.sha);
        let created = prior_sha.is_none();

        let result = self
            .client()
            .create_or_update_file(
                self.repo(),
                &request.repo_path,
                FileUpdate {
                    message: request.message.clone(),
                    content,
                    prior_sha,
                    branch: Some(self.branch().to_string()),
                },
            )
            .await?;

        info!(
            "{} {} in commit {}",
            if created { "Created" } else { "Updated" },
            request.repo_path,
            result.commit.sha
        );

        Ok(if created {
            FilePushOutcome::Created {
                commit: result.commit.sha,
            }
        } else {
            FilePushOutcome::Updated {
                commit: result.commit.sha,
            }
        })
    }
}
