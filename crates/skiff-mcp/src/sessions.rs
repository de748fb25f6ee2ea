//! Startup session attachment.
//!
//! The server never creates sandboxes. Sessions listed in the
//! configuration are attached to sandboxes that already exist, and the
//! resulting handles are placed in the registry before any transport
//! starts.

use crate::config::{BackendKind, SessionBinding, SkiffConfig};
use skiff_core::e2b::E2bSandbox;
use skiff_core::{CoreError, MemoryFileInterface, Sandbox, SandboxRegistry};
use std::sync::Arc;

async fn attach(config: &SkiffConfig, binding: &SessionBinding) -> Result<Sandbox, CoreError> {
    match config.backend {
        BackendKind::E2b => Ok(E2bSandbox::connect(&config.e2b, &binding.sandbox_id)
            .await?
            .into_handle()),
        BackendKind::Memory => Ok(Sandbox::new(
            binding.sandbox_id.clone(),
            BackendKind::Memory.as_str(),
            Arc::new(MemoryFileInterface::new()),
        )),
    }
}

/// Attach every configured session and register it.
///
/// Sessions that fail to attach are logged and skipped so one dead
/// sandbox does not keep the server from starting.
///
/// # Returns
///
/// The number of sessions registered.
pub async fn attach_sessions(config: &SkiffConfig, registry: &SandboxRegistry) -> usize {
    let mut attached = 0;

    for binding in &config.sessions {
        match attach(config, binding).await {
            Ok(sandbox) => {
                registry.insert(binding.session_id.clone(), sandbox).await;
                attached += 1;
            }
            Err(e) => {
                tracing::error!(
                    session_id = %binding.session_id,
                    sandbox_id = %binding.sandbox_id,
                    backend = config.backend.as_str(),
                    error = %e,
                    "Failed to attach session"
                );
            }
        }
    }

    tracing::info!(
        attached,
        configured = config.sessions.len(),
        "Sessions attached"
    );
    attached
}
