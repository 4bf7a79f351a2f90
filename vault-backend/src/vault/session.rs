//! VaultSession: the single "which directory is active" binding.
//!
//! The binding is an immutable snapshot (`VaultBinding`) swapped behind a
//! lock. Rebinding starts the new watcher, swaps the snapshot, and releases
//! the old one on a blocking task without waiting for it. Until that
//! release completes both watchers may report events; duplicates are
//! harmless to viewers, which simply reload.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use super::coalescing::CoalescerConfig;
use super::watcher::VaultWatcher;
use crate::errors::{VaultError, VaultResult};
use crate::gateway::{EventBroadcaster, GatewayMessage};
use crate::notes::VaultStore;

/// One bound vault directory and the watcher observing it
pub struct VaultBinding {
    path: PathBuf,
    watcher: Option<VaultWatcher>,
}

impl VaultBinding {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False when the watcher could not be started; the vault stays usable
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn store(&self) -> VaultStore {
        VaultStore::new(self.path.clone())
    }
}

pub struct VaultSession {
    current: RwLock<Option<Arc<VaultBinding>>>,
    broadcaster: Arc<EventBroadcaster>,
    watch_config: CoalescerConfig,
}

impl VaultSession {
    pub fn new(broadcaster: Arc<EventBroadcaster>, watch_config: CoalescerConfig) -> Self {
        Self {
            current: RwLock::new(None),
            broadcaster,
            watch_config,
        }
    }

    /// Snapshot of the current binding, if any
    pub fn current(&self) -> Option<Arc<VaultBinding>> {
        self.current.read().clone()
    }

    /// Store over the bound directory, or `Unbound`
    pub fn store(&self) -> VaultResult<VaultStore> {
        self.current()
            .map(|binding| binding.store())
            .ok_or(VaultError::Unbound)
    }

    /// Bind `new_path` as the active vault. On validation failure the
    /// previous binding (if any) stays in place.
    pub async fn bind(&self, new_path: impl AsRef<Path>) -> VaultResult<Arc<VaultBinding>> {
        let new_path = new_path.as_ref();

        let metadata = fs::metadata(new_path).await.map_err(|e| {
            log::error!("[Vault] Error accessing path {}: {}", new_path.display(), e);
            VaultError::validation(format!("Invalid path: {}", e))
        })?;
        if !metadata.is_dir() {
            return Err(VaultError::validation("Path is not a directory"));
        }

        let path = fs::canonicalize(new_path)
            .await
            .map_err(|e| VaultError::validation(format!("Invalid path: {}", e)))?;

        let watcher = match VaultWatcher::start(&path, Arc::clone(&self.broadcaster), self.watch_config.clone()) {
            Ok(w) => Some(w),
            Err(e) => {
                log::error!("[Watcher] Failed to watch {}: {}", path.display(), e);
                self.broadcaster
                    .broadcast(GatewayMessage::watch_error("", format!("Failed to watch vault: {}", e)));
                None
            }
        };

        let binding = Arc::new(VaultBinding { path, watcher });
        let previous = self.current.write().replace(Arc::clone(&binding));
        log::info!("[Vault] Vault path set to: {}", binding.path.display());

        if let Some(previous) = previous {
            release(previous);
        }

        Ok(binding)
    }
}

/// Drop a replaced binding off the async workers; stopping a watcher may
/// join its backend thread.
fn release(previous: Arc<VaultBinding>) {
    tokio::task::spawn_blocking(move || {
        let path = previous.path.clone();
        drop(previous);
        log::debug!("[Vault] Released previous binding {}", path.display());
    });
}
