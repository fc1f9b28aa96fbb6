//! Error types for the publishing pipeline

use pkgpush_github::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for publishing operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Error types for publishing operations
///
/// Every remote-call failure surfaces here and short-circuits the pipeline;
/// nothing is logged and swallowed.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A remote API call failed outside the blob-upload fan-out
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A blob upload failed for a named file
    #[error("Failed to upload {path}: {source}")]
    UploadFailed {
        /// Repository-relative path of the file
        path: String,
        /// The underlying API failure
        #[source]
        source: ApiError,
    },

    /// Every blob upload failed, so there is nothing to commit
    #[error("All {count} file uploads failed, nothing to commit")]
    AllUploadsFailed {
        /// Number of files that failed to upload
        count: usize,
    },

    /// A local file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        /// Path of the unreadable file
        path: PathBuf,
        /// The underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The packages directory could not be enumerated
    #[error("Failed to list packages in {}: {source}", dir.display())]
    ListManifests {
        /// Directory being enumerated
        dir: PathBuf,
        /// The underlying IO failure
        #[source]
        source: std::io::Error,
    },
}
