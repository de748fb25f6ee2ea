//! HTTP client for envd, the daemon running inside every E2B sandbox.
//!
//! envd serves two APIs on the same port:
//!
//! - a plain HTTP `/files` endpoint for downloading and uploading content
//! - Connect RPC services (`filesystem.Filesystem/*`) speaking JSON over POST
//!
//! This module knows how to call both and how to turn their failures into
//! [`FileError`] values.

use crate::error::FileError;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Header carrying the per-sandbox envd access token.
const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Connect protocol version header required for unary JSON calls.
const CONNECT_VERSION_HEADER: &str = "Connect-Protocol-Version";

/// Client bound to one sandbox's envd endpoint.
#[derive(Debug, Clone)]
pub(crate) struct EnvdClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    username: String,
}

/// Error body returned by the `/files` endpoint.
#[derive(Debug, Deserialize)]
struct FilesErrorBody {
    message: String,
}

/// Error body returned by Connect RPC calls.
#[derive(Debug, Deserialize)]
struct ConnectErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl EnvdClient {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: Option<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            username: username.into(),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.header(ACCESS_TOKEN_HEADER, token),
            None => request,
        }
    }

    /// Download a file as text via `GET /files`.
    pub(crate) async fn download(&self, path: &str) -> Result<String, FileError> {
        let url = format!("{}/files", self.base_url);
        tracing::trace!(url = %url, path = %path, "envd download");

        let resp = self
            .authorize(self.http.get(&url))
            .query(&[("path", path), ("username", self.username.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(files_error(status, &body));
        }

        Ok(resp.text().await?)
    }

    /// Upload text content via multipart `POST /files`.
    pub(crate) async fn upload(&self, path: &str, content: &str) -> Result<(), FileError> {
        let url = format!("{}/files", self.base_url);
        tracing::trace!(url = %url, path = %path, content_len = content.len(), "envd upload");

        let part = reqwest::multipart::Part::bytes(content.as_bytes().to_vec())
            .file_name(path.to_string())
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .authorize(self.http.post(&url))
            .query(&[("path", path), ("username", self.username.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(files_error(status, &body));
        }

        Ok(())
    }

    /// Make a unary Connect RPC call with a JSON body.
    ///
    /// `method` is the fully qualified procedure, e.g.
    /// `filesystem.Filesystem/Stat`.
    pub(crate) async fn rpc<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, FileError> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::trace!(url = %url, "envd RPC request");

        let resp = self
            .authorize(self.http.post(&url))
            .basic_auth(&self.username, None::<&str>)
            .header(CONNECT_VERSION_HEADER, "1")
            .json(params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::debug!(method = %method, status = %status, "envd RPC error response");
            return Err(connect_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a `/files` failure to a [`FileError`].
pub(crate) fn files_error(status: StatusCode, body: &str) -> FileError {
    let message = serde_json::from_str::<FilesErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::NOT_FOUND => FileError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FileError::PermissionDenied(message),
        StatusCode::INSUFFICIENT_STORAGE => {
            FileError::Io(format!("not enough disk space: {message}"))
        }
        _ => FileError::Unknown(format!("{status}: {message}")),
    }
}

/// Map a Connect RPC failure to a [`FileError`].
///
/// Prefers the Connect error code from the body and falls back to the
/// HTTP status when the body is not a Connect error.
pub(crate) fn connect_error(status: StatusCode, body: &str) -> FileError {
    let Ok(err) = serde_json::from_str::<ConnectErrorBody>(body) else {
        return files_error(status, body);
    };

    match err.code.as_str() {
        "not_found" => FileError::NotFound(err.message),
        "permission_denied" | "unauthenticated" => FileError::PermissionDenied(err.message),
        "resource_exhausted" => FileError::Io(err.message),
        "" => files_error(status, &err.message),
        code => FileError::Unknown(format!("{code}: {}", err.message)),
    }
}
