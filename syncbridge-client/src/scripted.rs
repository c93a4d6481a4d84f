//! In-process stand-in for the daemon.
//!
//! [`ScriptedBackend`] plugs into [`SyncClient`](crate::SyncClient) like the
//! D-Bus backend; the paired [`ScriptedDaemon`] handle lets a test or demo
//! flip presence, push status changes, and program replies.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use syncbridge_core::ActionKind;

use crate::transport::{Backend, BackendFuture, BackendLink, DaemonCall, DaemonEvent, RemoteFailure};

#[derive(Default)]
struct Script {
    present: bool,
    statuses: HashMap<String, String>,
    config_blob: Option<String>,
    action_failures: HashMap<String, RemoteFailure>,
    action_delay: Duration,
    query_delay: Duration,
    received: Vec<(ActionKind, String)>,
    events: Option<mpsc::UnboundedSender<DaemonEvent>>,
}

/// Control handle for a scripted daemon.
#[derive(Clone, Default)]
pub struct ScriptedDaemon {
    script: Arc<Mutex<Script>>,
}

/// Backend half of a scripted daemon.
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> ScriptedBackend {
        ScriptedBackend {
            script: self.script.clone(),
        }
    }

    /// A present daemon whose sync root is `<home>/SyncBridge`, holding a
    /// handful of files.
    pub fn demo(home: &Path) -> Self {
        let daemon = Self::new();
        let root = home.join("SyncBridge");
        let entry = |rel: &str| root.join(rel).to_string_lossy().into_owned();
        {
            let mut script = daemon.lock();
            script.present = true;
            script.config_blob = Some("version: 1\nsync_root: ~/SyncBridge\n".to_string());
            script.statuses.extend([
                (entry("Documents/report.odt"), "synced".to_string()),
                (entry("Photos/trip.jpg"), "cloud-only".to_string()),
                (entry("notes.md"), "syncing".to_string()),
                (entry("budget.xlsx"), "conflict".to_string()),
                (entry("locked.xlsx"), "synced".to_string()),
                (entry(".cache/thumbs.db"), "excluded".to_string()),
            ]);
            script.action_failures.insert(
                entry("locked.xlsx"),
                RemoteFailure::new(
                    "org.enigmora.LNXDrive.Error.FileInUse",
                    "locked.xlsx is open in another application",
                ),
            );
        }
        daemon
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the daemon owns its bus name. Reported to a linked client.
    pub fn set_present(&self, present: bool) {
        let mut script = self.lock();
        script.present = present;
        if let Some(events) = &script.events {
            let _ = events.send(DaemonEvent::Presence(present));
        }
    }

    pub fn set_status(&self, path: impl Into<String>, status: impl Into<String>) {
        self.lock().statuses.insert(path.into(), status.into());
    }

    /// Record a status and push `FileStatusChanged` to a linked client.
    pub fn emit_status(&self, path: impl Into<String>, status: impl Into<String>) {
        let (path, status) = (path.into(), status.into());
        let mut script = self.lock();
        script.statuses.insert(path.clone(), status.clone());
        if let Some(events) = &script.events {
            let _ = events.send(DaemonEvent::FileStatusChanged { path, status });
        }
    }

    /// `None` makes `GetConfig` fail.
    pub fn set_config(&self, blob: Option<&str>) {
        self.lock().config_blob = blob.map(str::to_string);
    }

    pub fn fail_action(&self, path: impl Into<String>, failure: RemoteFailure) {
        self.lock().action_failures.insert(path.into(), failure);
    }

    /// Hold every action reply for `delay`.
    pub fn set_action_delay(&self, delay: Duration) {
        self.lock().action_delay = delay;
    }

    /// Hold every status query and settings reply for `delay`.
    pub fn set_query_delay(&self, delay: Duration) {
        self.lock().query_delay = delay;
    }

    /// Actions received so far, in arrival order.
    pub fn received_actions(&self) -> Vec<(ActionKind, String)> {
        self.lock().received.clone()
    }
}

impl Backend for ScriptedBackend {
    fn start(&self, link: BackendLink) -> BackendFuture {
        let script = self.script.clone();
        Box::pin(async move {
            let BackendLink {
                events,
                mut calls,
                mut shutdown,
            } = link;

            let present = {
                let mut guard = script.lock().unwrap_or_else(PoisonError::into_inner);
                guard.events = Some(events.clone());
                guard.present
            };
            let _ = events.send(DaemonEvent::Presence(present));

            loop {
                tokio::select! {
                    _ = shutdown.recv() => break,
                    call = calls.recv() => {
                        let Some(call) = call else { break };
                        tokio::spawn(serve(script.clone(), call));
                    }
                }
            }

            script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .events = None;
            Ok(())
        })
    }
}

async fn serve(script: Arc<Mutex<Script>>, call: DaemonCall) {
    let lock = || script.lock().unwrap_or_else(PoisonError::into_inner);
    if matches!(
        call,
        DaemonCall::GetBatchFileStatus { .. } | DaemonCall::GetConfig { .. }
    ) {
        let delay = lock().query_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    match call {
        DaemonCall::GetBatchFileStatus { paths, respond_to } => {
            let reply: HashMap<String, String> = {
                let guard = lock();
                paths
                    .into_iter()
                    .filter_map(|path| {
                        let status = guard.statuses.get(&path)?.clone();
                        Some((path, status))
                    })
                    .collect()
            };
            let _ = respond_to.send(Ok(reply));
        }
        DaemonCall::GetConfig { respond_to } => {
            let reply = lock().config_blob.clone().ok_or_else(|| {
                RemoteFailure::new("org.freedesktop.DBus.Error.Failed", "settings unavailable")
            });
            let _ = respond_to.send(reply);
        }
        DaemonCall::Action {
            kind,
            path,
            respond_to,
        } => {
            let delay = {
                let mut guard = lock();
                guard.received.push((kind, path.clone()));
                guard.action_delay
            };
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let failure = lock().action_failures.get(&path).cloned();
            if let Some(failure) = failure {
                let _ = respond_to.send(Err(failure));
                return;
            }

            let settled = match kind {
                ActionKind::Pin => Some("synced"),
                ActionKind::Unpin => Some("cloud-only"),
                ActionKind::Sync => None,
            };
            let _ = respond_to.send(Ok(()));
            if let Some(status) = settled {
                let mut guard = lock();
                guard.statuses.insert(path.clone(), status.to_string());
                if let Some(events) = &guard.events {
                    let _ = events.send(DaemonEvent::FileStatusChanged {
                        path,
                        status: status.to_string(),
                    });
                }
            }
        }
    }
}
