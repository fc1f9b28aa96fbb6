use serde::{Deserialize, Serialize};

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Hosting service API settings
    pub github: GithubConfig,

    /// Target repository and branch
    pub repo: RepoConfig,

    /// Local monorepo layout
    pub monorepo: MonorepoConfig,

    /// Publishing behavior
    pub push: PushConfig,

    /// Logging settings
    pub observability: ObservabilityConfig,
}

/// Hosting service API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GithubConfig {
    /// Base URL of the REST API
    pub api_base: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Bearer token; normally supplied via environment, never re-serialized
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

/// Target repository and branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepoConfig {
    /// Account that owns the repository
    pub owner: String,

    /// Repository name
    pub name: String,

    /// Branch the pipeline commits to
    pub branch: String,
}

impl RepoConfig {
    /// The `owner/name` slug form
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Local monorepo layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonorepoConfig {
    /// Monorepo checkout root
    pub root: String,

    /// Directory under the root holding one subdirectory per package
    pub packages_dir: String,

    /// Manifest file name inside each package directory
    pub manifest_name: String,
}

/// Publishing behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PushConfig {
    /// Commit message for multi-file publishes
    pub commit_message: String,

    /// Per-file upload failure handling ("abort" or "best-effort")
    pub upload_policy: String,

    /// Skip commit creation when nothing changed
    pub skip_empty: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log format (pretty, compact, json)
    pub log_format: String,
}

// Default value functions
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("pkgpush/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_root() -> String {
    ".".to_string()
}

fn default_packages_dir() -> String {
    "packages".to_string()
}

fn default_manifest_name() -> String {
    "package.json".to_string()
}

fn default_commit_message() -> String {
    "Release of new version!".to_string()
}

fn default_upload_policy() -> String {
    "abort".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            github: GithubConfig::default(),
            repo: RepoConfig::default(),
            monorepo: MonorepoConfig::default(),
            push: PushConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        RepoConfig {
            owner: String::new(),
            name: String::new(),
            branch: default_branch(),
        }
    }
}

impl Default for MonorepoConfig {
    fn default() -> Self {
        MonorepoConfig {
            root: default_root(),
            packages_dir: default_packages_dir(),
            manifest_name: default_manifest_name(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            commit_message: default_commit_message(),
            upload_policy: default_upload_policy(),
            skip_empty: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}
