//! Sandbox handle - a reference to a remote sandbox and its file API.

use crate::files::FileInterface;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// A handle to a running sandbox.
///
/// The sandbox itself lives elsewhere (a cloud microVM, a container, or
/// memory in tests). This type only carries its identity and the file
/// interface used to reach it. Whoever creates the sandbox owns its
/// lifecycle; the handle is shared through the registry as `Arc<Sandbox>`.
#[derive(Clone)]
pub struct Sandbox {
    id: String,
    backend: &'static str,
    files: Arc<dyn FileInterface>,
    attached_at: DateTime<Utc>,
}

impl Sandbox {
    /// Wrap a file interface into a sandbox handle.
    ///
    /// # Arguments
    ///
    /// * `id` - Backend-side sandbox identifier
    /// * `backend` - Short backend name used in logs (e.g. `"e2b"`)
    /// * `files` - File interface bound to this sandbox
    pub fn new(
        id: impl Into<String>,
        backend: &'static str,
        files: Arc<dyn FileInterface>,
    ) -> Self {
        Self {
            id: id.into(),
            backend,
            files,
            attached_at: Utc::now(),
        }
    }

    /// Get the backend-side sandbox ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the backend name.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Get the time this handle was created.
    pub fn attached_at(&self) -> DateTime<Utc> {
        self.attached_at
    }

    /// Get the file interface of this sandbox.
    pub fn files(&self) -> &dyn FileInterface {
        self.files.as_ref()
    }
}

impl fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sandbox")
            .field("id", &self.id)
            .field("backend", &self.backend)
            .field("attached_at", &self.attached_at)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.id)
    }
}
