//! Session registry - maps session IDs to sandbox handles.

use crate::sandbox::Sandbox;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-only view of the active sessions.
///
/// Tool handlers depend on this trait rather than on a concrete map so the
/// owner of the sandboxes (a lifecycle service, a test, the binary's
/// startup code) decides how sessions are stored.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Look up the sandbox for a session.
    async fn get(&self, session_id: &str) -> Option<Arc<Sandbox>>;

    /// Check whether a session is registered.
    async fn contains(&self, session_id: &str) -> bool {
        self.get(session_id).await.is_some()
    }
}

/// In-memory session registry.
///
/// Uses an async RwLock internally and is safe to share across tasks.
/// Lookups take a read lock only long enough to clone the `Arc`, so no
/// lock is held while a file operation runs.
#[derive(Debug, Default)]
pub struct SandboxRegistry {
    sessions: RwLock<HashMap<String, Arc<Sandbox>>>,
}

impl SandboxRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sandbox under a session ID.
    ///
    /// Returns the handle previously registered under the same ID, if any.
    pub async fn insert(
        &self,
        session_id: impl Into<String>,
        sandbox: Sandbox,
    ) -> Option<Arc<Sandbox>> {
        let session_id = session_id.into();
        tracing::info!(session_id = %session_id, sandbox = %sandbox, "Session registered");
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(sandbox))
    }

    /// Remove a session.
    pub async fn remove(&self, session_id: &str) -> Option<Arc<Sandbox>> {
        let removed = self.sessions.write().await.remove(session_id);
        if removed.is_some() {
            tracing::info!(session_id = %session_id, "Session removed");
        }
        removed
    }

    /// List registered session IDs.
    pub async fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get the number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Check if no sessions are registered.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRegistry for SandboxRegistry {
    async fn get(&self, session_id: &str) -> Option<Arc<Sandbox>> {
        self.sessions.read().await.get(session_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryFileInterface;

    fn memory_sandbox(id: &str) -> Sandbox {
        Sandbox::new(id, "memory", Arc::new(MemoryFileInterface::new()))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = SandboxRegistry::new();
        assert!(registry.is_empty().await);

        registry.insert("s1", memory_sandbox("sbx-1")).await;

        assert!(registry.contains("s1").await);
        assert!(!registry.contains("s2").await);
        assert_eq!(registry.get("s1").await.unwrap().id(), "sbx-1");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_replaces_existing() {
        let registry = SandboxRegistry::new();
        assert!(registry.insert("s1", memory_sandbox("a")).await.is_none());

        let previous = registry.insert("s1", memory_sandbox("b")).await;

        assert_eq!(previous.unwrap().id(), "a");
        assert_eq!(registry.get("s1").await.unwrap().id(), "b");
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SandboxRegistry::new();
        registry.insert("s1", memory_sandbox("a")).await;

        assert!(registry.remove("s1").await.is_some());
        assert!(registry.remove("s1").await.is_none());
        assert!(!registry.contains("s1").await);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let registry = SandboxRegistry::new();
        registry.insert("zeta", memory_sandbox("z")).await;
        registry.insert("alpha", memory_sandbox("a")).await;

        assert_eq!(registry.list().await, vec!["alpha", "zeta"]);
    }
}
