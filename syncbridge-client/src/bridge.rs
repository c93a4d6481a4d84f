//! Event bridge: daemon push notifications into the cache and out to
//! subscribers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use syncbridge_core::FileStatus;

use crate::client::Shared;
use crate::events::ClientEvent;
use crate::supervisor;
use crate::transport::DaemonEvent;

pub(crate) async fn run(
    shared: Arc<Shared>,
    mut events: mpsc::UnboundedReceiver<DaemonEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                handle(&shared, event);
            }
        }
    }
}

fn handle(shared: &Arc<Shared>, event: DaemonEvent) {
    match event {
        DaemonEvent::Presence(present) => supervisor::on_presence(shared, present),
        DaemonEvent::FileStatusChanged { path, status } => {
            tracing::debug!(path = %path, status = %status, "file status changed");
            let path = PathBuf::from(path);
            let status = FileStatus::parse(&status);
            shared.cache.replace(path.clone(), status);
            shared
                .events
                .emit(ClientEvent::StatusChanged { path, status });
        }
    }
}
