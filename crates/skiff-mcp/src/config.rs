//! Configuration for the MCP server.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use skiff_core::e2b::E2bConfig;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Stdio only (for local AI tools like Claude Desktop)
    #[default]
    Stdio,
    /// HTTP only (for remote AI agents)
    Http,
    /// Both stdio and HTTP
    Both,
}

impl TransportMode {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "http" | "sse" | "remote" => Self::Http,
            "both" => Self::Both,
            _ => Self::Stdio,
        }
    }

    /// Check if stdio transport should be enabled.
    pub fn stdio_enabled(&self) -> bool {
        matches!(self, Self::Stdio | Self::Both)
    }

    /// Check if HTTP transport should be enabled.
    pub fn http_enabled(&self) -> bool {
        matches!(self, Self::Http | Self::Both)
    }
}

/// Which file backend sessions are attached with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// E2B cloud sandboxes.
    #[default]
    E2b,
    /// Process-local in-memory filesystem (development only).
    Memory,
}

impl BackendKind {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" | "mem" | "local" => Self::Memory,
            _ => Self::E2b,
        }
    }

    /// Short backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E2b => "e2b",
            Self::Memory => "memory",
        }
    }
}

/// A session to attach at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    /// Session ID clients pass to the tools.
    pub session_id: String,
    /// Backend-side sandbox ID.
    pub sandbox_id: String,
}

/// Configuration for the Skiff MCP server.
#[derive(Debug, Clone)]
pub struct SkiffConfig {
    /// Transport mode (default: stdio).
    pub transport_mode: TransportMode,

    /// HTTP server bind address.
    pub http_addr: SocketAddr,

    /// File backend (default: e2b).
    pub backend: BackendKind,

    /// Sessions attached at startup.
    pub sessions: Vec<SessionBinding>,

    /// E2B connection settings.
    pub e2b: E2bConfig,
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("E2B_API_KEY is required to attach E2B sessions")]
    MissingApiKey,

    #[error("invalid session binding '{0}', expected session=sandbox_id")]
    InvalidSession(String),

    #[error("session '{0}' is bound more than once")]
    DuplicateSession(String),
}

impl Default for SkiffConfig {
    fn default() -> Self {
        Self {
            transport_mode: TransportMode::Stdio,
            http_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
            backend: BackendKind::E2b,
            sessions: Vec::new(),
            e2b: E2bConfig::default(),
        }
    }
}

/// Parse `session=sandbox_id` pairs separated by commas.
pub fn parse_sessions(spec: &str) -> Result<Vec<SessionBinding>, ConfigError> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((session, sandbox)) if !session.trim().is_empty() && !sandbox.trim().is_empty() => {
                Ok(SessionBinding {
                    session_id: session.trim().to_string(),
                    sandbox_id: sandbox.trim().to_string(),
                })
            }
            _ => Err(ConfigError::InvalidSession(entry.to_string())),
        })
        .collect()
}

impl SkiffConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SKIFF_TRANSPORT` | `stdio` (stdio, http, both) |
    /// | `SKIFF_HTTP_HOST` | `127.0.0.1` |
    /// | `SKIFF_HTTP_PORT` | `8080` |
    /// | `SKIFF_BACKEND` | `e2b` (e2b, memory) |
    /// | `SKIFF_SESSIONS` | empty (`session=sandbox_id,...`) |
    /// | `E2B_API_KEY` | unset |
    /// | `E2B_API_URL` | `https://api.e2b.app` |
    /// | `E2B_DOMAIN` | `e2b.app` |
    ///
    /// Malformed `SKIFF_SESSIONS` entries are skipped with a warning.
    pub fn from_env() -> Self {
        let default = Self::default();

        let http_host: IpAddr = std::env::var("SKIFF_HTTP_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.http_addr.ip());

        let http_port: u16 = std::env::var("SKIFF_HTTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.http_addr.port());

        let sessions = std::env::var("SKIFF_SESSIONS")
            .map(|spec| {
                spec.split(',')
                    .filter_map(|entry| match parse_sessions(entry) {
                        Ok(bindings) => Some(bindings),
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping session binding");
                            None
                        }
                    })
                    .flatten()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            transport_mode: std::env::var("SKIFF_TRANSPORT")
                .map(|v| TransportMode::parse(&v))
                .unwrap_or(default.transport_mode),
            http_addr: SocketAddr::new(http_host, http_port),
            backend: std::env::var("SKIFF_BACKEND")
                .map(|v| BackendKind::parse(&v))
                .unwrap_or(default.backend),
            sessions,
            e2b: E2bConfig::from_env(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendKind::E2b
            && !self.sessions.is_empty()
            && self.e2b.api_key.is_none()
        {
            return Err(ConfigError::MissingApiKey);
        }

        let mut seen = HashSet::new();
        for binding in &self.sessions {
            if !seen.insert(binding.session_id.as_str()) {
                return Err(ConfigError::DuplicateSession(binding.session_id.clone()));
            }
        }

        Ok(())
    }

    /// Validate configuration but only log warnings instead of failing.
    ///
    /// Use this for development environments where no sandboxes exist yet.
    pub fn validate_warn(&self) {
        if let Err(e) = self.validate() {
            tracing::warn!("{e}");
        }

        if self.backend == BackendKind::E2b {
            if self.e2b.api_key.is_some() {
                tracing::info!("E2B API key found in environment");
            } else {
                tracing::warn!("E2B API key not found in environment");
            }
        }

        if self.sessions.is_empty() {
            tracing::warn!("No sessions configured; every tool call will report a missing sandbox");
        }
    }
}
