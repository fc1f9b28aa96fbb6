//! Manifest discovery in a monorepo checkout.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PublishError, PublishResult};

/// A package manifest staged for publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    /// Repository-relative path, always with forward slashes
    /// (e.g. "packages/pkg-a/package.json")
    pub repo_path: String,
    /// Path of the file in the local checkout
    pub local_path: PathBuf,
}

/// Enumerate package manifests under `<root>/<packages_dir>`.
///
/// Each immediate subdirectory that contains `manifest_name` contributes one
/// entry; everything else is skipped. Results are sorted by repository path
/// so runs are deterministic regardless of directory iteration order.
pub async fn list_manifests(
    root: &Path,
    packages_dir: &str,
    manifest_name: &str,
) -> PublishResult<Vec<ManifestFile>> {
    let dir = root.join(packages_dir);
    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|source| PublishError::ListManifests {
            dir: dir.clone(),
            source,
        })?;

    let mut manifests = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| PublishError::ListManifests {
            dir: dir.clone(),
            source,
        })?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|source| PublishError::ListManifests {
                dir: dir.clone(),
                source,
            })?;
        if !file_type.is_dir() {
            continue;
        }

        let package = entry.file_name();
        let Some(package) = package.to_str() else {
            warn!("Skipping package directory with non-UTF-8 name: {:?}", package);
            continue;
        };

        let local_path = entry.path().join(manifest_name);
        if tokio::fs::metadata(&local_path).await.is_err() {
            debug!("Skipping {package}: no {manifest_name}");
            continue;
        }

        manifests.push(ManifestFile {
            repo_path: format!("{packages_dir}/{package}/{manifest_name}"),
            local_path,
        });
    }

    manifests.sort_by(|a, b| a.repo_path.cmp(&b.repo_path));
    debug!("Found {} manifests under {}", manifests.len(), dir.display());
    Ok(manifests)
}
