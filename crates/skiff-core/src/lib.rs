//! # skiff-core
//!
//! File access layer for remote code-execution sandboxes.
//!
//! This crate defines the [`FileInterface`] capability set (list, read,
//! write, delete, stat), the [`Sandbox`] handle that carries it, and the
//! [`SessionRegistry`] through which tool handlers find a session's
//! sandbox. Backends implement [`FileInterface`]; callers never see which
//! one they are talking to.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        skiff-core                        │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐    │
//! │  │ SessionRegistry │────▶│  HashMap<session_id,     │    │
//! │  │   - get()       │     │       Arc<Sandbox>>      │    │
//! │  │   - contains()  │     └──────────────────────────┘    │
//! │  └─────────────────┘                                     │
//! │           │                                              │
//! │           ▼                                              │
//! │  ┌─────────────────┐     ┌──────────────────────────┐    │
//! │  │    Sandbox      │────▶│  dyn FileInterface       │    │
//! │  │  - id()         │     │  - list / read / write   │    │
//! │  │  - files()      │     │  - delete / stat         │    │
//! │  └─────────────────┘     └──────────────────────────┘    │
//! │                             │                 │          │
//! │                             ▼                 ▼          │
//! │                  ┌──────────────────┐ ┌───────────────┐  │
//! │                  │ E2bFileInterface │ │ MemoryFile-   │  │
//! │                  │ (envd over HTTPS)│ │ Interface     │  │
//! │                  └──────────────────┘ └───────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use skiff_core::{MemoryFileInterface, Sandbox, SandboxRegistry, SessionRegistry};
//! use std::sync::Arc;
//!
//! let registry = SandboxRegistry::new();
//! registry
//!     .insert("s1", Sandbox::new("local", "memory", Arc::new(MemoryFileInterface::new())))
//!     .await;
//!
//! let sandbox = registry.get("s1").await.expect("registered");
//! sandbox.files().write("/notes.txt", "hello").await?;
//! let metadata = sandbox.files().stat("/notes.txt").await?;
//! assert_eq!(metadata.size, 5);
//! ```

pub mod e2b;
mod error;
mod files;
mod memory;
mod registry;
mod sandbox;

pub use error::{CoreError, FileError, Result};
pub use files::{EntryType, FileEntry, FileInterface, FileMetadata};
pub use memory::MemoryFileInterface;
pub use registry::{SandboxRegistry, SessionRegistry};
pub use sandbox::Sandbox;
