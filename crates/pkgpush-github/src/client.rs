use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};

use crate::error::{ApiError, ApiResult};
use crate::types::{
    ApiMessage, ContentInfo, CreateBlobRequest, CreateBlobResponse, CreateCommitRequest,
    CreateOrUpdateFileRequest, CreateTreeRequest, FileCommitInfo, FileUpdate, GitCommit, GitRef,
    RepoId, TreeEntry, TreeInfo, UpdateRefRequest,
};

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// HTTP client for the hosting service's REST API
///
/// Constructed once with the credentials and passed by reference to every
/// operation; there is no process-global client state.
pub struct GitHubClient {
    api_base: String,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `api_base` - Base URL of the REST API (e.g., "https://api.github.com")
    /// * `token` - Bearer token used for every request
    /// * `user_agent` - User-Agent header value (required by the service)
    pub fn new(api_base: impl Into<String>, token: &str, user_agent: &str) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        let api_base = api_base.into();

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch a file through the contents API
    ///
    /// Returns `Ok(None)` when the file does not exist on the remote, which
    /// the single-file push path treats as "create new file".
    pub async fn get_contents(
        &self,
        repo: &RepoId,
        path: &str,
        reference: Option<&str>,
    ) -> ApiResult<Option<ContentInfo>> {
        let url = self.repo_url(repo, &format!("contents/{path}"));
        tracing::debug!("GET {}", url);

        let mut request = self.http.get(&url);
        if let Some(reference) = reference {
            request = request.query(&[("ref", reference)]);
        }

        match Self::check(request.send().await?).await {
            Ok(response) => Ok(Some(response.json::<ContentInfo>().await?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create or replace a single file through the contents API
    ///
    /// The service requires the prior content hash when replacing an existing
    /// file (optimistic concurrency); `update.prior_sha` is omitted from the
    /// request body entirely for new files.
    pub async fn create_or_update_file(
        &self,
        repo: &RepoId,
        path: &str,
        update: FileUpdate,
    ) -> ApiResult<FileCommitInfo> {
        let url = self.repo_url(repo, &format!("contents/{path}"));
        tracing::debug!("PUT {}", url);

        let body = CreateOrUpdateFileRequest {
            message: update.message,
            content: base64::engine::general_purpose::STANDARD.encode(&update.content),
            sha: update.prior_sha,
            branch: update.branch,
        };

        let response = Self::check(self.http.put(&url).json(&body).send().await?).await?;
        Ok(response.json::<FileCommitInfo>().await?)
    }

    /// Register file content as a new blob and return its content hash
    pub async fn create_blob(&self, repo: &RepoId, content: &[u8]) -> ApiResult<String> {
        let url = self.repo_url(repo, "git/blobs");
        tracing::debug!("POST {} ({} bytes)", url, content.len());

        let body = CreateBlobRequest {
            content: base64::engine::general_purpose::STANDARD.encode(content),
            encoding: "base64".to_string(),
        };

        let response = Self::check(self.http.post(&url).json(&body).send().await?).await?;
        Ok(response.json::<CreateBlobResponse>().await?.sha)
    }

    /// Resolve a reference (e.g. "heads/main") to the object it points at
    pub async fn get_ref(&self, repo: &RepoId, reference: &str) -> ApiResult<GitRef> {
        let url = self.repo_url(repo, &format!("git/ref/{reference}"));
        tracing::debug!("GET {}", url);

        let response = Self::check(self.http.get(&url).send().await?).await?;
        Ok(response.json::<GitRef>().await?)
    }

    /// Fetch a commit object, including the tree hash it snapshots
    pub async fn get_commit(&self, repo: &RepoId, sha: &str) -> ApiResult<GitCommit> {
        let url = self.repo_url(repo, &format!("git/commits/{sha}"));
        tracing::debug!("GET {}", url);

        let response = Self::check(self.http.get(&url).send().await?).await?;
        Ok(response.json::<GitCommit>().await?)
    }

    /// Create a tree layering `entries` over `base_tree`
    pub async fn create_tree(
        &self,
        repo: &RepoId,
        base_tree: &str,
        entries: Vec<TreeEntry>,
    ) -> ApiResult<TreeInfo> {
        let url = self.repo_url(repo, "git/trees");
        tracing::debug!("POST {} ({} entries)", url, entries.len());

        let body = CreateTreeRequest {
            base_tree: base_tree.to_string(),
            tree: entries,
        };

        let response = Self::check(self.http.post(&url).json(&body).send().await?).await?;
        Ok(response.json::<TreeInfo>().await?)
    }

    /// Create a commit object pointing at `tree` with the given parents
    pub async fn create_commit(
        &self,
        repo: &RepoId,
        message: &str,
        tree: &str,
        parents: Vec<String>,
    ) -> ApiResult<GitCommit> {
        let url = self.repo_url(repo, "git/commits");
        tracing::debug!("POST {}", url);

        let body = CreateCommitRequest {
            message: message.to_string(),
            tree: tree.to_string(),
            parents,
        };

        let response = Self::check(self.http.post(&url).json(&body).send().await?).await?;
        Ok(response.json::<GitCommit>().await?)
    }

    /// Advance a reference to `sha`
    ///
    /// With `force` false the service rejects non-fast-forward updates, which
    /// is the only mode the publish pipeline uses.
    pub async fn update_ref(
        &self,
        repo: &RepoId,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> ApiResult<GitRef> {
        let url = self.repo_url(repo, &format!("git/refs/{reference}"));
        tracing::debug!("PATCH {} -> {}", url, sha);

        let body = UpdateRefRequest {
            sha: sha.to_string(),
            force,
        };

        let response = Self::check(self.http.patch(&url).json(&body).send().await?).await?;
        Ok(response.json::<GitRef>().await?)
    }

    fn repo_url(&self, repo: &RepoId, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, repo.owner, repo.name, suffix
        )
    }

    /// Map non-success statuses to the error taxonomy, pulling the message
    /// out of the service's `{"message": ...}` body when present.
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiMessage>()
            .await
            .map(|m| m.message)
            .unwrap_or_default();
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            message
        };

        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN if message.to_lowercase().contains("rate limit") => {
                ApiError::RateLimited(message)
            }
            StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client =
            GitHubClient::new("https://api.github.com/", "token", "pkgpush-tests").unwrap();
        assert_eq!(client.api_base, "https://api.github.com");
    }

    #[test]
    fn test_repo_url_layout() {
        let client = GitHubClient::new("http://localhost:3000", "token", "pkgpush-tests").unwrap();
        let repo = RepoId::new("octo-org", "widgets");
        assert_eq!(
            client.repo_url(&repo, "git/blobs"),
            "http://localhost:3000/repos/octo-org/widgets/git/blobs"
        );
    }

    #[test]
    fn test_rejects_token_with_invalid_header_bytes() {
        let result = GitHubClient::new("http://localhost:3000", "tok\nen", "pkgpush-tests");
        assert!(matches!(result, Err(ApiError::InvalidHeader(_))));
    }
}
