//! GitHub REST API client for pkgpush
//!
//! This crate wraps the subset of the GitHub REST API that pkgpush needs to
//! publish files: the contents API (read/write a single file) and the git
//! data API (blobs, trees, commits, refs) used to assemble one commit from
//! many files.

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use client::GitHubClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    BlobRecord, ContentInfo, FileCommitInfo, FileUpdate, GitCommit, GitRef, RepoId, TreeEntry,
    TreeInfo,
};
