// Copyright (C) 2026 PkgPush Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! In-memory object store backing the mock API server.
//!
//! Objects are content-addressed with truncated SHA-256 hex ids, so two
//! uploads of the same bytes produce the same blob id and an unchanged tree
//! produces the same tree id — the property idempotency tests rely on.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

/// A commit object held by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCommit {
    /// Commit id
    pub sha: String,
    /// Tree the commit snapshots
    pub tree: String,
    /// Parent commit ids
    pub parents: Vec<String>,
    /// Commit message
    pub message: String,
}

/// Number of requests served per endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// GET contents requests
    pub get_contents: usize,
    /// PUT contents requests
    pub put_contents: usize,
    /// POST git/blobs requests (including injected failures)
    pub create_blob: usize,
    /// GET git/ref requests
    pub get_ref: usize,
    /// GET git/commits requests
    pub get_commit: usize,
    /// POST git/trees requests
    pub create_tree: usize,
    /// POST git/commits requests
    pub create_commit: usize,
    /// PATCH git/refs requests
    pub update_ref: usize,
}

/// Mutable repository state behind the mock server
#[derive(Debug, Default)]
pub struct MockState {
    /// blob id -> raw content
    pub blobs: HashMap<String, Vec<u8>>,
    /// tree id -> (path -> blob id), flat paths as the publisher produces
    pub trees: HashMap<String, BTreeMap<String, String>>,
    /// commit id -> commit object
    pub commits: HashMap<String, MockCommit>,
    /// ref name (e.g. "heads/main") -> commit id
    pub refs: HashMap<String, String>,
    /// Requests served so far
    pub calls: CallCounts,
    /// Blob uploads whose content contains any of these needles get a 500
    pub fail_blobs_containing: Vec<Vec<u8>>,
    /// Value of the create-blob counter when the first create-tree arrived;
    /// lets tests assert that all uploads were joined before tree creation
    pub blob_calls_at_first_tree: Option<usize>,
    /// Every base_tree create-tree was called with, in order
    pub base_trees_requested: Vec<String>,
}

fn object_id(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    // Truncate to 40 hex chars to look like a git object id
    hex::encode(digest)[..40].to_string()
}

impl MockState {
    /// Store a blob and return its content-addressed id
    pub fn put_blob(&mut self, content: &[u8]) -> String {
        let sha = object_id(content);
        self.blobs.insert(sha.clone(), content.to_vec());
        sha
    }

    /// Store a tree and return its content-addressed id
    pub fn put_tree(&mut self, entries: BTreeMap<String, String>) -> String {
        let mut payload = Vec::new();
        for (path, sha) in &entries {
            payload.extend_from_slice(path.as_bytes());
            payload.push(0);
            payload.extend_from_slice(sha.as_bytes());
            payload.push(b'\n');
        }
        let sha = object_id(&payload);
        self.trees.insert(sha.clone(), entries);
        sha
    }

    /// Store a commit and return its content-addressed id
    pub fn put_commit(&mut self, tree: String, parents: Vec<String>, message: String) -> String {
        let payload = format!("tree {tree}\nparents {}\nmessage {message}", parents.join(","));
        let sha = object_id(payload.as_bytes());
        self.commits.insert(
            sha.clone(),
            MockCommit {
                sha: sha.clone(),
                tree,
                parents,
                message,
            },
        );
        sha
    }

    /// Seed a branch with an initial commit containing `files`,
    /// returning the head commit id
    pub fn seed_branch(&mut self, branch: &str, files: &[(&str, &[u8])]) -> String {
        let mut entries = BTreeMap::new();
        for (path, content) in files {
            let blob = self.put_blob(content);
            entries.insert((*path).to_string(), blob);
        }
        let tree = self.put_tree(entries);
        let head = self.put_commit(tree, Vec::new(), "seed".to_string());
        self.refs.insert(format!("heads/{branch}"), head.clone());
        head
    }

    /// Walk parent links to decide whether `ancestor` is reachable from `sha`
    pub fn is_ancestor(&self, ancestor: &str, sha: &str) -> bool {
        let mut queue = vec![sha.to_string()];
        while let Some(current) = queue.pop() {
            if current == ancestor {
                return true;
            }
            if let Some(commit) = self.commits.get(&current) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        false
    }

    /// Resolve a file's blob id at the head of `branch`
    pub fn file_sha_at_head(&self, branch: &str, path: &str) -> Option<String> {
        let head = self.refs.get(&format!("heads/{branch}"))?;
        let commit = self.commits.get(head)?;
        self.trees.get(&commit.tree)?.get(path).cloned()
    }

    /// Resolve a file's content at the head of `branch`
    pub fn file_at_head(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        let sha = self.file_sha_at_head(branch, path)?;
        self.blobs.get(&sha).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_ids_are_content_addressed() {
        let mut state = MockState::default();
        let a = state.put_blob(b"hello");
        let b = state.put_blob(b"hello");
        let c = state.put_blob(b"world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_identical_trees_share_an_id() {
        let mut state = MockState::default();
        let blob = state.put_blob(b"content");
        let mut entries = BTreeMap::new();
        entries.insert("a.json".to_string(), blob);
        let first = state.put_tree(entries.clone());
        let second = state.put_tree(entries);
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_and_resolve_file() {
        let mut state = MockState::default();
        let head = state.seed_branch("main", &[("packages/a/package.json", b"{}" as &[u8])]);
        assert_eq!(state.refs.get("heads/main"), Some(&head));
        assert_eq!(
            state.file_at_head("main", "packages/a/package.json"),
            Some(b"{}".to_vec())
        );
        assert_eq!(state.file_at_head("main", "missing.json"), None);
    }

    #[test]
    fn test_ancestor_walk() {
        let mut state = MockState::default();
        let root = state.seed_branch("main", &[("f", b"1" as &[u8])]);
        let tree = state.commits.get(&root).unwrap().tree.clone();
        let child = state.put_commit(tree, vec![root.clone()], "next".to_string());
        assert!(state.is_ancestor(&root, &child));
        assert!(!state.is_ancestor(&child, &root));
    }
}
