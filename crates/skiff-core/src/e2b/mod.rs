//! E2B backend - file access to E2B cloud sandboxes.
//!
//! An [`E2bSandbox`] is attached to an already running sandbox (creating
//! and killing sandboxes is the job of whoever owns them). Attaching asks
//! the E2B control plane for the sandbox's envd access token, after which
//! all file traffic goes straight to envd inside the sandbox.
//!
//! ```ignore
//! use skiff_core::e2b::{E2bConfig, E2bSandbox};
//!
//! let sandbox = E2bSandbox::connect(&E2bConfig::from_env(), "i7x0k2...").await?;
//! let entries = sandbox.files().list("/home/user").await?;
//! let info = sandbox.filesystem().info("/home/user/data.csv").await?;
//! ```

mod envd;
mod files;

pub use files::{E2bFileType, E2bFiles, E2bFilesystem, EntryInfo};

use crate::error::{CoreError, FileError};
use crate::files::{FileEntry, FileInterface, FileMetadata};
use crate::sandbox::Sandbox;
use async_trait::async_trait;
use envd::EnvdClient;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Port envd listens on inside every sandbox.
pub const ENVD_PORT: u16 = 49983;

/// Default public domain of E2B sandboxes.
pub const DEFAULT_DOMAIN: &str = "e2b.app";

/// Default base URL of the E2B control plane API.
pub const DEFAULT_API_URL: &str = "https://api.e2b.app";

/// Default sandbox user that owns written files.
pub const DEFAULT_USER: &str = "user";

/// Timeout for a single HTTP request to E2B.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for reaching E2B.
#[derive(Clone)]
pub struct E2bConfig {
    /// API key for the control plane (`E2B_API_KEY`).
    pub api_key: Option<String>,
    /// Control plane base URL.
    pub api_url: String,
    /// Sandbox domain used to build envd URLs.
    pub domain: String,
    /// Sandbox user for file operations.
    pub user: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for E2bConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            user: DEFAULT_USER.to_string(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for E2bConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("E2bConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("domain", &self.domain)
            .field("user", &self.user)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl E2bConfig {
    /// Load settings from `E2B_API_KEY`, `E2B_API_URL` and `E2B_DOMAIN`.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("E2B_API_KEY").ok().filter(|k| !k.is_empty()),
            api_url: std::env::var("E2B_API_URL").unwrap_or(default.api_url),
            domain: std::env::var("E2B_DOMAIN").unwrap_or(default.domain),
            ..default
        }
    }

    /// envd base URL for a sandbox on the given domain.
    pub fn envd_url(sandbox_id: &str, domain: &str) -> String {
        format!("https://{ENVD_PORT}-{sandbox_id}.{domain}")
    }

    fn http_client(&self) -> Result<reqwest::Client, CoreError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| CoreError::Connection(format!("failed to build HTTP client: {e}")))
    }
}

/// Sandbox details returned by `GET /sandboxes/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SandboxDetail {
    #[serde(rename = "sandboxID")]
    sandbox_id: String,
    #[serde(default)]
    envd_access_token: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

/// A running E2B sandbox, seen through its two file API families.
#[derive(Debug, Clone)]
pub struct E2bSandbox {
    id: String,
    files: E2bFiles,
    filesystem: E2bFilesystem,
}

impl E2bSandbox {
    /// Attach to a running sandbox by ID.
    ///
    /// # Errors
    ///
    /// Fails if no API key is configured, the control plane cannot be
    /// reached, or it does not know the sandbox.
    pub async fn connect(config: &E2bConfig, sandbox_id: &str) -> Result<Self, CoreError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| CoreError::InvalidConfig("E2B_API_KEY is not set".into()))?;

        let http = config.http_client()?;
        let url = format!(
            "{}/sandboxes/{}",
            config.api_url.trim_end_matches('/'),
            sandbox_id
        );
        tracing::debug!(sandbox_id = %sandbox_id, url = %url, "Fetching sandbox details");

        let resp = http.get(&url).header("X-API-Key", api_key).send().await?;

        let status = resp.status();
        let body_text = resp
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable>".to_string());

        if !status.is_success() {
            tracing::warn!(sandbox_id = %sandbox_id, status = %status, "E2B API rejected sandbox lookup");
            return Err(CoreError::Api {
                status: status.as_u16(),
                message: body_text,
            });
        }

        let detail: SandboxDetail = serde_json::from_str(&body_text)?;
        let domain = detail.domain.as_deref().unwrap_or(&config.domain);
        let envd_url = E2bConfig::envd_url(&detail.sandbox_id, domain);

        let sandbox = Self::from_client(
            detail.sandbox_id,
            EnvdClient::new(http, envd_url, detail.envd_access_token, config.user.as_str()),
        );
        tracing::info!(sandbox_id = %sandbox.id, envd = %sandbox.files.envd_url(), "Attached to E2B sandbox");
        Ok(sandbox)
    }

    /// Attach to a sandbox whose envd URL is already known.
    ///
    /// Skips the control plane lookup. Useful for self-hosted deployments
    /// and tests.
    pub fn with_envd_url(
        config: &E2bConfig,
        sandbox_id: impl Into<String>,
        envd_url: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, CoreError> {
        let http = config.http_client()?;
        Ok(Self::from_client(
            sandbox_id.into(),
            EnvdClient::new(http, envd_url, access_token, config.user.as_str()),
        ))
    }

    fn from_client(id: String, envd: EnvdClient) -> Self {
        Self {
            id,
            files: E2bFiles::new(envd.clone()),
            filesystem: E2bFilesystem::new(envd),
        }
    }

    /// Get the sandbox ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Listing, reading and writing.
    pub fn files(&self) -> &E2bFiles {
        &self.files
    }

    /// Metadata and removal.
    pub fn filesystem(&self) -> &E2bFilesystem {
        &self.filesystem
    }

    /// Turn this sandbox into a registry handle.
    pub fn into_handle(self) -> Sandbox {
        let id = self.id.clone();
        Sandbox::new(id, "e2b", Arc::new(E2bFileInterface::new(self)))
    }
}

/// [`FileInterface`] over an [`E2bSandbox`].
///
/// `list`, `read` and `write` go through `files`; `delete` and `stat` go
/// through `filesystem`.
#[derive(Debug, Clone)]
pub struct E2bFileInterface {
    sandbox: E2bSandbox,
}

impl E2bFileInterface {
    /// Wrap an attached sandbox.
    pub fn new(sandbox: E2bSandbox) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl FileInterface for E2bFileInterface {
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FileError> {
        let entries = self.sandbox.files().list(path).await?;
        Ok(entries.iter().map(EntryInfo::to_file_entry).collect())
    }

    async fn read(&self, path: &str) -> Result<String, FileError> {
        self.sandbox.files().read(path).await
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), FileError> {
        self.sandbox.files().write(path, content).await
    }

    async fn delete(&self, path: &str) -> Result<(), FileError> {
        self.sandbox.filesystem().remove(path).await
    }

    async fn stat(&self, path: &str) -> Result<FileMetadata, FileError> {
        let info = self.sandbox.filesystem().info(path).await?;
        Ok(FileMetadata::from(&info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envd_url() {
        assert_eq!(
            E2bConfig::envd_url("sbx123", "e2b.app"),
            "https://49983-sbx123.e2b.app"
        );
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = E2bConfig {
            api_key: Some("e2b_secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("e2b_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_connect_without_api_key_fails() {
        let config = E2bConfig::default();
        let err = E2bSandbox::connect(&config, "sbx").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
        assert!(err.to_string().contains("E2B_API_KEY is not set"));
    }

    #[test]
    fn test_into_handle() {
        let sandbox =
            E2bSandbox::with_envd_url(&E2bConfig::default(), "sbx1", "http://127.0.0.1:1", None)
                .unwrap();
        let handle = sandbox.into_handle();
        assert_eq!(handle.id(), "sbx1");
        assert_eq!(handle.backend(), "e2b");
    }
}
