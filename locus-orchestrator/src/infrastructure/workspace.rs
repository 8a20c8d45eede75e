//! Request-scoped workspace directories
//!
//! Each request gets `<root>/<order token>`. The directory is held by a
//! [`Workspace`] guard: [`Workspace::release`] removes it on the normal
//! path, and `Drop` removes it on any path that never reaches `release`
//! (early `?` returns, panics, a request timeout dropping the future).
//! Inside a runtime the drop-time removal runs on the blocking pool.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::value_objects::OrderToken;

/// Name of the directory uploads are extracted into
pub const SOURCE_DIR: &str = "src";

/// Workspace creation error
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Workspace {path} is already in use")]
    AlreadyExists { path: PathBuf },

    #[error("Failed to create workspace {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Allocates and sweeps workspaces under a fixed staging root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager, making the staging root if it is missing.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, order: &OrderToken) -> PathBuf {
        self.root.join(order.to_string())
    }

    /// Create the workspace for `order`.
    ///
    /// Uses a non-recursive mkdir so a directory still held by another live
    /// request is never shared.
    pub async fn create(&self, order: &OrderToken) -> Result<Workspace, WorkspaceError> {
        let path = self.path_for(order);
        match tokio::fs::create_dir(&path).await {
            Ok(()) => {
                debug!(order = %order, path = %path.display(), "Workspace created");
                Ok(Workspace {
                    path,
                    released: false,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(WorkspaceError::AlreadyExists { path })
            }
            Err(source) => Err(WorkspaceError::Create { path, source }),
        }
    }

    /// Remove every entry under the staging root. Run once at startup,
    /// before any request is served.
    pub fn purge_stale(&self) -> io::Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        if removed > 0 {
            info!(root = %self.root.display(), removed, "Purged stale workspaces");
        }
        Ok(removed)
    }
}

/// Remove a workspace directory. A missing directory counts as removed.
pub async fn try_destroy(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Best-effort removal; failures are logged, never returned.
pub async fn destroy(path: &Path) {
    match try_destroy(path).await {
        Ok(()) => debug!(path = %path.display(), "Workspace removed"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove workspace"),
    }
}

/// Guard over one live workspace directory
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory uploads are extracted into
    pub fn source_dir(&self) -> PathBuf {
        self.path.join(SOURCE_DIR)
    }

    /// Remove the directory now. Consumes the guard so removal happens once.
    pub async fn release(mut self) {
        destroy(&self.path).await;
        self.released = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_on_drop(&path));
            }
            Err(_) => remove_on_drop(&path),
        }
    }
}

fn remove_on_drop(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!(path = %path.display(), "Workspace removed on drop"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove workspace on drop"),
    }
}
