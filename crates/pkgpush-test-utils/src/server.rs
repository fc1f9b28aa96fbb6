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

//! In-process mock of the hosting service's REST API.
//!
//! Serves the endpoints the pkgpush client talks to: contents (get/put),
//! create-blob, get-ref, get-commit, create-tree, create-commit, update-ref.
//! Responses use the same JSON shapes as the real service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::state::{CallCounts, MockCommit, MockState};

type SharedState = Arc<Mutex<MockState>>;

const DEFAULT_BRANCH: &str = "main";

/// Handle to a running mock API server
///
/// The server is aborted when the handle is dropped.
pub struct MockGitHub {
    addr: SocketAddr,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl MockGitHub {
    /// Start a mock server on an ephemeral local port
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to hand to the API client under test
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Seed a branch with an initial commit; returns the head commit id
    pub fn seed_branch(&self, branch: &str, files: &[(&str, &[u8])]) -> String {
        self.lock().seed_branch(branch, files)
    }

    /// Make blob uploads whose content contains `needle` fail with a 500
    pub fn fail_blobs_containing(&self, needle: &[u8]) {
        self.lock().fail_blobs_containing.push(needle.to_vec());
    }

    /// Snapshot of the per-endpoint call counters
    pub fn counts(&self) -> CallCounts {
        self.lock().calls.clone()
    }

    /// Current head commit id of a branch
    pub fn head(&self, branch: &str) -> Option<String> {
        self.lock().refs.get(&format!("heads/{branch}")).cloned()
    }

    /// Commit object by id
    pub fn commit(&self, sha: &str) -> Option<MockCommit> {
        self.lock().commits.get(sha).cloned()
    }

    /// Paths contained in a tree, sorted
    pub fn tree_paths(&self, sha: &str) -> Option<Vec<String>> {
        self.lock()
            .trees
            .get(sha)
            .map(|entries| entries.keys().cloned().collect())
    }

    /// File content at a branch head
    pub fn file_at_head(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        self.lock().file_at_head(branch, path)
    }

    /// Blob-call counter value observed when the first create-tree arrived
    pub fn blob_calls_at_first_tree(&self) -> Option<usize> {
        self.lock().blob_calls_at_first_tree
    }

    /// Every `base_tree` value create-tree was called with, in order
    pub fn base_trees_requested(&self) -> Vec<String> {
        self.lock().base_trees_requested.clone()
    }

    /// Direct access to the underlying state
    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

impl Drop for MockGitHub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(get_contents).put(put_contents),
        )
        .route("/repos/{owner}/{repo}/git/blobs", post(create_blob))
        .route("/repos/{owner}/{repo}/git/ref/{*reference}", get(get_ref))
        .route("/repos/{owner}/{repo}/git/commits/{sha}", get(get_commit))
        .route("/repos/{owner}/{repo}/git/trees", post(create_tree))
        .route("/repos/{owner}/{repo}/git/commits", post(create_commit))
        .route(
            "/repos/{owner}/{repo}/git/refs/{*reference}",
            patch(update_ref),
        )
        .with_state(state)
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn commit_json(commit: &MockCommit) -> Value {
    json!({
        "sha": commit.sha,
        "tree": { "sha": commit.tree },
        "parents": commit.parents.iter().map(|p| json!({ "sha": p })).collect::<Vec<_>>(),
        "message": commit.message,
    })
}

fn decode_content(content: &str) -> Result<Vec<u8>, (StatusCode, Json<Value>)> {
    let stripped: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(stripped)
        .map_err(|_| error(StatusCode::BAD_REQUEST, "content is not valid base64"))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

// GET /repos/{owner}/{repo}/contents/{path}?ref=branch
async fn get_contents(
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<SharedState>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state poisoned");
    state.calls.get_contents += 1;

    let branch = params
        .get("ref")
        .map(|r| r.strip_prefix("heads/").unwrap_or(r).to_string())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

    let Some(sha) = state.file_sha_at_head(&branch, &path) else {
        return error(StatusCode::NOT_FOUND, "Not Found");
    };
    let content = state.blobs.get(&sha).cloned().unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({
            "sha": sha,
            "path": path,
            "content": base64::engine::general_purpose::STANDARD.encode(content),
            "encoding": "base64",
        })),
    )
}

#[derive(Deserialize)]
struct PutContentsBody {
    message: String,
    content: String,
    sha: Option<String>,
    branch: Option<String>,
}

// PUT /repos/{owner}/{repo}/contents/{path}
async fn put_contents(
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    State(state): State<SharedState>,
    Json(body): Json<PutContentsBody>,
) -> (StatusCode, Json<Value>) {
    let content = match decode_content(&body.content) {
        Ok(content) => content,
        Err(e) => return e,
    };

    let mut state = state.lock().expect("mock state poisoned");
    state.calls.put_contents += 1;

    let branch = body.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string());
    let existing = state.file_sha_at_head(&branch, &path);

    // Optimistic-concurrency rules of the real service
    match (&existing, &body.sha) {
        (Some(_), None) => {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "\"sha\" wasn't supplied");
        }
        (Some(current), Some(given)) if current != given => {
            return error(StatusCode::CONFLICT, "is at a different sha");
        }
        (None, Some(_)) => {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "sha supplied for a new file");
        }
        _ => {}
    }

    let created = existing.is_none();
    let head = state.refs.get(&format!("heads/{branch}")).cloned();

    let mut entries = head
        .as_ref()
        .and_then(|h| state.commits.get(h))
        .and_then(|c| state.trees.get(&c.tree))
        .cloned()
        .unwrap_or_default();

    let blob = state.put_blob(&content);
    entries.insert(path.clone(), blob.clone());
    let tree = state.put_tree(entries);
    let parents = head.into_iter().collect();
    let commit = state.put_commit(tree, parents, body.message);
    state.refs.insert(format!("heads/{branch}"), commit.clone());

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(json!({
            "content": { "sha": blob, "path": path },
            "commit": { "sha": commit },
        })),
    )
}

#[derive(Deserialize)]
struct CreateBlobBody {
    content: String,
    #[allow(dead_code)]
    encoding: String,
}

// POST /repos/{owner}/{repo}/git/blobs
async fn create_blob(
    Path((_owner, _repo)): Path<(String, String)>,
    State(state): State<SharedState>,
    Json(body): Json<CreateBlobBody>,
) -> (StatusCode, Json<Value>) {
    let content = match decode_content(&body.content) {
        Ok(content) => content,
        Err(e) => return e,
    };

    let mut state = state.lock().expect("mock state poisoned");
    state.calls.create_blob += 1;

    let injected = state
        .fail_blobs_containing
        .iter()
        .any(|needle| contains(&content, needle));
    if injected {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "injected blob failure");
    }

    let sha = state.put_blob(&content);
    (StatusCode::CREATED, Json(json!({ "sha": sha })))
}

// GET /repos/{owner}/{repo}/git/ref/{reference}
async fn get_ref(
    Path((_owner, _repo, reference)): Path<(String, String, String)>,
    State(state): State<SharedState>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state poisoned");
    state.calls.get_ref += 1;

    let Some(sha) = state.refs.get(&reference).cloned() else {
        return error(StatusCode::NOT_FOUND, "Not Found");
    };

    (
        StatusCode::OK,
        Json(json!({
            "ref": format!("refs/{reference}"),
            "object": { "sha": sha, "type": "commit" },
        })),
    )
}

// GET /repos/{owner}/{repo}/git/commits/{sha}
async fn get_commit(
    Path((_owner, _repo, sha)): Path<(String, String, String)>,
    State(state): State<SharedState>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state poisoned");
    state.calls.get_commit += 1;

    match state.commits.get(&sha) {
        Some(commit) => (StatusCode::OK, Json(commit_json(commit))),
        None => error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

#[derive(Deserialize)]
struct TreeEntryBody {
    path: String,
    #[allow(dead_code)]
    mode: String,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    entry_type: String,
    sha: String,
}

#[derive(Deserialize)]
struct CreateTreeBody {
    base_tree: String,
    tree: Vec<TreeEntryBody>,
}

// POST /repos/{owner}/{repo}/git/trees
async fn create_tree(
    Path((_owner, _repo)): Path<(String, String)>,
    State(state): State<SharedState>,
    Json(body): Json<CreateTreeBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state poisoned");
    state.calls.create_tree += 1;
    if state.blob_calls_at_first_tree.is_none() {
        state.blob_calls_at_first_tree = Some(state.calls.create_blob);
    }
    state.base_trees_requested.push(body.base_tree.clone());

    let Some(base) = state.trees.get(&body.base_tree).cloned() else {
        return error(StatusCode::NOT_FOUND, "Base tree not found");
    };

    let mut entries: BTreeMap<String, String> = base;
    for entry in &body.tree {
        if !state.blobs.contains_key(&entry.sha) {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "tree entry sha not found");
        }
        entries.insert(entry.path.clone(), entry.sha.clone());
    }

    let sha = state.put_tree(entries);
    (StatusCode::CREATED, Json(json!({ "sha": sha })))
}

#[derive(Deserialize)]
struct CreateCommitBody {
    message: String,
    tree: String,
    #[serde(default)]
    parents: Vec<String>,
}

// POST /repos/{owner}/{repo}/git/commits
async fn create_commit(
    Path((_owner, _repo)): Path<(String, String)>,
    State(state): State<SharedState>,
    Json(body): Json<CreateCommitBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state poisoned");
    state.calls.create_commit += 1;

    if !state.trees.contains_key(&body.tree) {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Tree SHA does not exist");
    }
    for parent in &body.parents {
        if !state.commits.contains_key(parent) {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "Parent SHA does not exist");
        }
    }

    let sha = state.put_commit(body.tree, body.parents, body.message);
    let commit = state.commits.get(&sha).cloned().expect("just inserted");
    (StatusCode::CREATED, Json(commit_json(&commit)))
}

#[derive(Deserialize)]
struct UpdateRefBody {
    sha: String,
    #[serde(default)]
    force: bool,
}

// PATCH /repos/{owner}/{repo}/git/refs/{reference}
async fn update_ref(
    Path((_owner, _repo, reference)): Path<(String, String, String)>,
    State(state): State<SharedState>,
    Json(body): Json<UpdateRefBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().expect("mock state poisoned");
    state.calls.update_ref += 1;

    if !state.commits.contains_key(&body.sha) {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Object does not exist");
    }

    if let Some(current) = state.refs.get(&reference).cloned() {
        if !body.force && !state.is_ancestor(&current, &body.sha) {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Update is not a fast forward",
            );
        }
    }

    state.refs.insert(reference.clone(), body.sha.clone());
    (
        StatusCode::OK,
        Json(json!({
            "ref": format!("refs/{reference}"),
            "object": { "sha": body.sha, "type": "commit" },
        })),
    )
}
