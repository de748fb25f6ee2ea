//! # skiff-mcp
//!
//! MCP (Model Context Protocol) server giving AI agents file access inside
//! code execution sandboxes.
//!
//! Sandboxes are not created here. Each configured session is attached to
//! an existing sandbox at startup, and every tool call names the session
//! it works on.
//!
//! ## Quick Start
//!
//! ```bash
//! export E2B_API_KEY=e2b_...
//! export SKIFF_SESSIONS=main=i7x2kq9c0l1
//! cargo run -p skiff-mcp
//! ```
//!
//! Or without a remote backend:
//!
//! ```bash
//! SKIFF_BACKEND=memory SKIFF_SESSIONS=dev=local cargo run -p skiff-mcp
//! ```
//!
//! ## MCP Tools
//!
//! | Tool | Description |
//! |------|-------------|
//! | `list_files` | List a directory (default `/`) |
//! | `read_file` | Read a file as text |
//! | `write_file` | Create or replace a file |
//! | `upload_file` | Create `file_name` inside `destination_path` |
//! | `delete_file` | Remove a file |
//! | `get_file_metadata` | `is_dir` and `size` of a path |
//!
//! Every tool answers with either its success record or `{"error": "..."}`.

mod config;
pub mod http;
mod server;
mod sessions;
mod tools;
mod types;

pub use config::{
    parse_sessions, BackendKind, ConfigError, SessionBinding, SkiffConfig, TransportMode,
};
pub use server::{SkiffServer, TOOL_NAMES};
pub use sessions::attach_sessions;
pub use tools::{upload_path, FileTools, ToolError, DELETE_OK, UPLOAD_OK, WRITE_OK};
pub use types::*;
