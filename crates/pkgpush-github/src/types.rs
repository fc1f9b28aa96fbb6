use crate::error::ApiError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a repository on the hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    /// Account that owns the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoId {
    /// Create a repository id from owner and name
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = ApiError;

    /// Parse an `owner/name` slug as found in CI environment variables
    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        match slug.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoId::new(owner, name))
            }
            _ => Err(ApiError::InvalidSlug(slug.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Object a reference points to
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GitObject {
    /// Object id the ref resolves to
    pub sha: String,
    /// Object kind ("commit" for branch heads)
    #[serde(rename = "type")]
    pub object_type: String,
}

/// A named reference (branch, tag) on the remote
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    /// Fully qualified ref name (e.g. "refs/heads/main")
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Object the ref currently points to
    pub object: GitObject,
}

/// Tree pointer inside a commit object
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeRef {
    /// Tree object id
    pub sha: String,
}

/// Parent pointer inside a commit object
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitParent {
    /// Parent commit id
    pub sha: String,
}

/// A commit object as returned by the git data API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GitCommit {
    /// Commit id
    pub sha: String,
    /// Tree the commit snapshots
    pub tree: TreeRef,
    /// Parent commits (one for the commits this tool creates)
    #[serde(default)]
    pub parents: Vec<CommitParent>,
    /// Commit message
    #[serde(default)]
    pub message: String,
}

/// A freshly uploaded blob, paired with its repository path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRecord {
    /// Repository-relative path the blob will occupy in the tree
    pub path: String,
    /// Content hash returned by the create-blob call
    pub sha: String,
}

/// One entry of a create-tree request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-relative path
    pub path: String,
    /// File mode; always "100644" (regular file) for manifest pushes
    pub mode: String,
    /// Entry kind; always "blob" here
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Blob id for the entry content
    pub sha: String,
}

impl TreeEntry {
    /// Build a regular-file entry from an uploaded blob
    pub fn regular_file(record: &BlobRecord) -> Self {
        Self {
            path: record.path.clone(),
            mode: "100644".to_string(),
            entry_type: "blob".to_string(),
            sha: record.sha.clone(),
        }
    }
}

/// A tree object id returned by create-tree
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeInfo {
    /// Tree object id
    pub sha: String,
}

/// Request body for POST /repos/{owner}/{repo}/git/blobs
#[derive(Serialize, Debug, Clone)]
pub struct CreateBlobRequest {
    /// Base64-encoded file content
    pub content: String,
    /// Always "base64"
    pub encoding: String,
}

/// Response body for POST /repos/{owner}/{repo}/git/blobs
#[derive(Deserialize, Debug, Clone)]
pub struct CreateBlobResponse {
    /// Content hash of the new blob
    pub sha: String,
}

/// Request body for POST /repos/{owner}/{repo}/git/trees
#[derive(Serialize, Debug, Clone)]
pub struct CreateTreeRequest {
    /// Tree to layer the new entries on
    pub base_tree: String,
    /// New or replaced entries
    pub tree: Vec<TreeEntry>,
}

/// Request body for POST /repos/{owner}/{repo}/git/commits
#[derive(Serialize, Debug, Clone)]
pub struct CreateCommitRequest {
    /// Commit message
    pub message: String,
    /// Tree the commit snapshots
    pub tree: String,
    /// Parent commit ids
    pub parents: Vec<String>,
}

/// Request body for PATCH /repos/{owner}/{repo}/git/refs/{ref}
#[derive(Serialize, Debug, Clone)]
pub struct UpdateRefRequest {
    /// Commit id to advance the ref to
    pub sha: String,
    /// Allow a non-fast-forward update
    pub force: bool,
}

/// File metadata and content from the contents API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    /// Content hash of the existing file blob
    pub sha: String,
    /// Repository-relative path
    #[serde(default)]
    pub path: String,
    /// Base64-encoded content (may contain line breaks)
    #[serde(default)]
    pub content: String,
    /// Content encoding; "base64" for files
    #[serde(default)]
    pub encoding: String,
}

impl ContentInfo {
    /// Decode the base64 payload, tolerating the line breaks GitHub inserts.
    pub fn decoded_content(&self) -> Result<Vec<u8>, ApiError> {
        let stripped: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(base64::engine::general_purpose::STANDARD.decode(stripped)?)
    }
}

/// A single-file update submitted through the contents API
#[derive(Debug, Clone)]
pub struct FileUpdate {
    /// Commit message for the generated commit
    pub message: String,
    /// Raw new file content (encoded by the client)
    pub content: Vec<u8>,
    /// Content hash of the file being replaced; `None` when creating
    pub prior_sha: Option<String>,
    /// Branch to commit to; `None` for the default branch
    pub branch: Option<String>,
}

/// Wire form of [`FileUpdate`] for PUT /repos/{owner}/{repo}/contents/{path}
#[derive(Serialize, Debug, Clone)]
pub(crate) struct CreateOrUpdateFileRequest {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Commit summary embedded in a contents-API response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Id of the commit the service created
    pub sha: String,
}

/// Response body for PUT /repos/{owner}/{repo}/contents/{path}
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileCommitInfo {
    /// Metadata of the written file
    pub content: Option<ContentInfo>,
    /// Commit the service created for the write
    pub commit: CommitSummary,
}

/// Error body shape the service returns for failed requests
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub message: String,
}
