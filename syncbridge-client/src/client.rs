//! The service object adapters hold a reference to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::{Handle, Runtime};
use tokio::sync::{broadcast, oneshot};

use syncbridge_core::{ActionError, ActionKind, ClientConfig, ConfigError, ConnectionState, FileStatus};

use crate::cache::{Presence, StatusCache};
use crate::config_fetch::{self, SyncRootSlot};
use crate::dbus::DbusBackend;
use crate::dispatch::{self, ActionHandle, InFlight};
use crate::error::ClientError;
use crate::events::{ClientEvent, EventHub, SubscriptionId};
use crate::supervisor::{self, ConnectionSupervisor};
use crate::transport::{round_trip, Backend, DaemonCall};

/// State reachable from the client's background tasks.
pub(crate) struct Shared {
    pub(crate) config: ClientConfig,
    pub(crate) runtime: Handle,
    pub(crate) supervisor: ConnectionSupervisor,
    pub(crate) cache: StatusCache,
    pub(crate) events: EventHub,
    pub(crate) sync_root: SyncRootSlot,
    pub(crate) in_flight: Arc<InFlight>,
}

/// Client for the sync daemon.
///
/// Build one at startup, call [`connect`](Self::connect), and share it.
/// Reads never fail and never block on the daemon, except
/// [`get_batch_file_status`](Self::get_batch_file_status), which is a
/// deliberate blocking round trip.
pub struct SyncClient {
    shared: Arc<Shared>,
    backend: Arc<dyn Backend>,
    runtime: Option<Runtime>,
}

impl SyncClient {
    /// Client for the session-bus daemon, using the current user's home.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        let backend = DbusBackend::new(config.clone());
        Self::with_backend(config, home, backend)
    }

    /// Client over any backend, on a runtime of its own.
    pub fn with_backend(
        config: ClientConfig,
        home: PathBuf,
        backend: impl Backend,
    ) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("syncbridge")
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;
        let mut client = Self::with_handle(config, home, backend, runtime.handle().clone());
        client.runtime = Some(runtime);
        Ok(client)
    }

    /// Client whose background tasks run on an existing tokio runtime.
    ///
    /// [`get_batch_file_status`](Self::get_batch_file_status) must not be
    /// called from that runtime's own threads.
    pub fn with_handle(
        config: ClientConfig,
        home: PathBuf,
        backend: impl Backend,
        runtime: Handle,
    ) -> Self {
        let presence = Arc::new(Presence::default());
        let shared = Arc::new(Shared {
            config,
            runtime,
            supervisor: ConnectionSupervisor::new(presence.clone()),
            cache: StatusCache::new(presence),
            events: EventHub::new(),
            sync_root: SyncRootSlot::new(home),
            in_flight: Arc::new(InFlight::default()),
        });
        Self {
            shared,
            backend: Arc::new(backend),
            runtime: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open the link to the daemon without launching it. Idempotent.
    pub fn connect(&self) {
        supervisor::connect(&self.shared, &self.backend);
    }

    /// Close the link. Safe to call without `connect` and more than once.
    pub fn shutdown(&self) {
        supervisor::teardown(&self.shared);
    }

    pub fn is_daemon_running(&self) -> bool {
        self.shared.supervisor.is_available()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.shared.supervisor.presence().state()
    }

    /// Whether `connect` has been called and not yet undone by `shutdown`.
    pub fn is_linked(&self) -> bool {
        self.shared.supervisor.is_linked()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Cached status of `path`; `Unknown` if unseen or the daemon is absent.
    pub fn get_file_status(&self, path: &Path) -> FileStatus {
        self.shared.cache.get(path)
    }

    /// Ask the daemon for many statuses at once, blocking the calling thread
    /// for up to the query timeout (5s by default).
    ///
    /// Results are written to the cache before returning. Without a daemon,
    /// or when the call fails, the returned map is empty.
    ///
    /// Panics if called from inside an async context on the client's runtime.
    pub fn get_batch_file_status(&self, paths: &[PathBuf]) -> HashMap<PathBuf, FileStatus> {
        if paths.is_empty() {
            return HashMap::new();
        }
        let Some(calls) = self.shared.supervisor.calls() else {
            return HashMap::new();
        };

        let wire: Vec<String> = paths
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        let limit = self.shared.config.query_timeout();
        let shared = self.shared.clone();
        let requested = paths.len();

        self.shared.runtime.block_on(async move {
            let reply = round_trip(&calls, limit, |respond_to| DaemonCall::GetBatchFileStatus {
                paths: wire,
                respond_to,
            })
            .await;
            match reply {
                Ok(raw) => {
                    let statuses: HashMap<PathBuf, FileStatus> = raw
                        .into_iter()
                        .map(|(path, status)| (PathBuf::from(path), FileStatus::parse(&status)))
                        .collect();
                    shared.cache.batch_replace(statuses.clone());
                    statuses
                }
                Err(err) => {
                    tracing::warn!(error = %err, requested, "batch status query failed");
                    HashMap::new()
                }
            }
        })
    }

    /// Sync root reported by the daemon, or `<home>/OneDrive` until it is.
    pub fn get_sync_root(&self) -> PathBuf {
        self.shared.sync_root.get()
    }

    /// Fetch the sync root from the daemon now, blocking for up to the query
    /// timeout. Same fallbacks as the fetch that follows daemon appearance.
    ///
    /// Panics if called from inside an async context on the client's runtime.
    pub fn refresh_sync_root(&self) -> PathBuf {
        let shared = self.shared.clone();
        self.shared
            .runtime
            .block_on(async move { config_fetch::fetch(&shared).await })
    }

    pub fn cache(&self) -> &StatusCache {
        &self.shared.cache
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Download `path` and keep it local.
    pub fn pin<F>(&self, path: impl Into<PathBuf>, on_done: F) -> ActionHandle
    where
        F: FnOnce(Result<(), ActionError>) + Send + 'static,
    {
        self.dispatch(ActionKind::Pin, path.into(), on_done)
    }

    /// Turn `path` back into a cloud-only placeholder.
    pub fn unpin<F>(&self, path: impl Into<PathBuf>, on_done: F) -> ActionHandle
    where
        F: FnOnce(Result<(), ActionError>) + Send + 'static,
    {
        self.dispatch(ActionKind::Unpin, path.into(), on_done)
    }

    /// Sync `path` now.
    pub fn sync_path<F>(&self, path: impl Into<PathBuf>, on_done: F) -> ActionHandle
    where
        F: FnOnce(Result<(), ActionError>) + Send + 'static,
    {
        self.dispatch(ActionKind::Sync, path.into(), on_done)
    }

    pub fn dispatch<F>(&self, kind: ActionKind, path: PathBuf, on_done: F) -> ActionHandle
    where
        F: FnOnce(Result<(), ActionError>) + Send + 'static,
    {
        dispatch::dispatch(&self.shared, kind, path, Box::new(on_done))
    }

    pub async fn pin_async(&self, path: impl Into<PathBuf>) -> Result<(), ActionError> {
        self.dispatch_async(ActionKind::Pin, path.into()).await
    }

    pub async fn unpin_async(&self, path: impl Into<PathBuf>) -> Result<(), ActionError> {
        self.dispatch_async(ActionKind::Unpin, path.into()).await
    }

    pub async fn sync_path_async(&self, path: impl Into<PathBuf>) -> Result<(), ActionError> {
        self.dispatch_async(ActionKind::Sync, path.into()).await
    }

    async fn dispatch_async(&self, kind: ActionKind, path: PathBuf) -> Result<(), ActionError> {
        let (tx, rx) = oneshot::channel();
        let _handle = self.dispatch(kind, path, move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.await.unwrap_or(Err(ActionError::Cancelled))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Register an observer for `status-changed` and `availability-changed`.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        self.shared.events.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Broadcast receiver for async consumers.
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.shared.events.receiver()
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
