//! Daemon presence and the lifetime of the backend link.
//!
//! Presence is only ever changed by [`on_presence`], driven by events from the
//! backend. Losing the daemon is not an error: the cache is swept to
//! `unknown`, subscribers are told, and every read keeps answering.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use syncbridge_core::ActionError;

use crate::bridge;
use crate::cache::Presence;
use crate::client::Shared;
use crate::config_fetch;
use crate::events::ClientEvent;
use crate::transport::{Backend, BackendLink, DaemonCall};

const CALL_QUEUE_DEPTH: usize = 64;

struct Session {
    calls: mpsc::Sender<DaemonCall>,
    shutdown: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

pub(crate) struct ConnectionSupervisor {
    presence: Arc<Presence>,
    session: Mutex<Option<Session>>,
}

impl ConnectionSupervisor {
    pub(crate) fn new(presence: Arc<Presence>) -> Self {
        Self {
            presence,
            session: Mutex::new(None),
        }
    }

    pub(crate) fn is_available(&self) -> bool {
        self.presence.get()
    }

    pub(crate) fn presence(&self) -> &Presence {
        &self.presence
    }

    /// Call channel, only while the daemon is present.
    pub(crate) fn calls(&self) -> Option<mpsc::Sender<DaemonCall>> {
        if !self.presence.get() {
            return None;
        }
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.calls.clone())
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Start the backend link. A second call while linked does nothing.
///
/// The event bridge is spawned before the backend so that nothing the
/// backend reports during its handshake is lost.
pub(crate) fn connect(shared: &Arc<Shared>, backend: &Arc<dyn Backend>) {
    let mut slot = shared
        .supervisor
        .session
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        tracing::debug!("connect called while already linked; ignoring");
        return;
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (call_tx, call_rx) = mpsc::channel(CALL_QUEUE_DEPTH);
    let (shutdown_tx, _) = broadcast::channel(4);

    let bridge_task = shared.runtime.spawn(bridge::run(
        shared.clone(),
        event_rx,
        shutdown_tx.subscribe(),
    ));

    let link = BackendLink {
        events: event_tx,
        calls: call_rx,
        shutdown: shutdown_tx.subscribe(),
    };
    let backend_future = backend.start(link);
    let backend_task = shared.runtime.spawn(async move {
        match backend_future.await {
            Ok(()) => tracing::debug!("daemon link closed"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to open daemon link; staying disconnected")
            }
        }
    });

    *slot = Some(Session {
        calls: call_tx,
        shutdown: shutdown_tx,
        tasks: vec![bridge_task, backend_task],
    });
}

/// Release the link. Safe without a prior `connect` and safe to repeat.
///
/// Actions still waiting on the daemon are failed with
/// `ActionError::Connection` before their tasks go away.
pub(crate) fn teardown(shared: &Arc<Shared>) {
    let failed = shared.in_flight.fail_all(ActionError::Connection);
    if failed > 0 {
        tracing::warn!(failed, "daemon link released with actions in flight");
    }

    let session = shared
        .supervisor
        .session
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    let Some(session) = session else {
        return;
    };

    let _ = session.shutdown.send(());
    for task in session.tasks {
        task.abort();
    }
    on_presence(shared, false);
    tracing::debug!("daemon link released");
}

/// Apply a presence report. Repeated reports of the same value are ignored.
pub(crate) fn on_presence(shared: &Arc<Shared>, present: bool) {
    let previous = shared.supervisor.presence.swap(present);
    if previous == present {
        return;
    }

    if present {
        tracing::info!("sync daemon appeared; refreshing state");
        config_fetch::spawn_fetch(shared);
    } else {
        tracing::info!("sync daemon went away; entering degraded mode");
        shared.cache.invalidate_all();
    }
    shared.events.emit(ClientEvent::AvailabilityChanged(present));
}
