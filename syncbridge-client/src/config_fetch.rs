//! Sync-root fetch. Fire-and-forget; every failure lands on the default.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use syncbridge_core::sync_root::{default_sync_root, extract_sync_root};

use crate::client::Shared;
use crate::transport::{round_trip, DaemonCall};

pub(crate) struct SyncRootSlot {
    home: PathBuf,
    root: RwLock<PathBuf>,
}

impl SyncRootSlot {
    pub(crate) fn new(home: PathBuf) -> Self {
        let root = RwLock::new(default_sync_root(&home));
        Self { home, root }
    }

    pub(crate) fn home(&self) -> &Path {
        &self.home
    }

    pub(crate) fn get(&self) -> PathBuf {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, root: PathBuf) {
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = root;
    }
}

/// Ask the daemon for its settings in the background and store the sync
/// root it names.
pub(crate) fn spawn_fetch(shared: &Arc<Shared>) {
    let shared = shared.clone();
    shared.runtime.clone().spawn(async move {
        fetch(&shared).await;
    });
}

/// Resolve the sync root from the daemon's settings and store it.
///
/// Without a daemon link the current value is kept.
pub(crate) async fn fetch(shared: &Shared) -> PathBuf {
    let Some(calls) = shared.supervisor.calls() else {
        tracing::debug!("no daemon link; keeping current sync root");
        return shared.sync_root.get();
    };
    let limit = shared.config.query_timeout();
    let reply = round_trip(&calls, limit, |respond_to| DaemonCall::GetConfig { respond_to }).await;
    let home = shared.sync_root.home();
    let root = match reply {
        Ok(blob) => extract_sync_root(&blob, home).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "daemon settings carry no usable sync root; using default");
            default_sync_root(home)
        }),
        Err(err) => {
            tracing::warn!(error = %err, "failed to fetch daemon settings; using default sync root");
            default_sync_root(home)
        }
    };
    tracing::info!(sync_root = %root.display(), "sync root resolved");
    shared.sync_root.set(root.clone());
    root
}
