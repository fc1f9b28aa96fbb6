//! Publishing pipeline for pkgpush
//!
//! Turns a set of local package manifests into a single commit on a remote
//! branch: blobs are uploaded concurrently, combined into a tree layered on
//! the branch's current tree, committed, and the branch ref is fast-forwarded.
//! A separate single-file path wraps the contents API for callers that only
//! publish one file.

pub mod error;
pub mod manifest;
pub mod publisher;
pub mod single;

// Re-export commonly used types
pub use error::{PublishError, PublishResult};
pub use manifest::{list_manifests, ManifestFile};
pub use publisher::{DroppedFile, PublishOptions, PublishReport, Publisher, UploadPolicy};
pub use single::{FilePushOutcome, FilePushRequest};
