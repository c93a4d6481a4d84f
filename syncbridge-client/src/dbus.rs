//! Session-bus backend.
//!
//! Handshake order: subscribe to `FileStatusChanged` and to owner changes of
//! the daemon's bus name, then ask whether the name currently has an owner.
//! Doing it the other way round could drop a notification sent in between.
//! Every method call carries the no-auto-start flag: an absent daemon stays
//! absent.

use std::collections::HashMap;

use futures_util::StreamExt;
use zbus::fdo::DBusProxy;
use zbus::names::BusName;
use zbus::proxy::CacheProperties;
use zbus::Connection;

use syncbridge_core::{ActionKind, ClientConfig};

use crate::error::ClientError;
use crate::transport::{Backend, BackendFuture, BackendLink, DaemonCall, DaemonEvent, RemoteFailure};

#[zbus::proxy(
    interface = "org.enigmora.LNXDrive.Files",
    default_service = "org.enigmora.LNXDrive",
    default_path = "/org/enigmora/LNXDrive",
    gen_blocking = false
)]
trait Files {
    #[zbus(no_autostart)]
    fn get_batch_file_status(&self, paths: &[&str]) -> zbus::Result<HashMap<String, String>>;

    #[zbus(no_autostart)]
    fn pin_file(&self, path: &str) -> zbus::Result<()>;

    #[zbus(no_autostart)]
    fn unpin_file(&self, path: &str) -> zbus::Result<()>;

    #[zbus(no_autostart)]
    fn sync_path(&self, path: &str) -> zbus::Result<()>;

    #[zbus(signal)]
    fn file_status_changed(&self, path: &str, status: &str) -> zbus::Result<()>;
}

#[zbus::proxy(
    interface = "org.enigmora.LNXDrive.Settings",
    default_service = "org.enigmora.LNXDrive",
    default_path = "/org/enigmora/LNXDrive",
    gen_blocking = false
)]
trait Settings {
    #[zbus(no_autostart)]
    fn get_config(&self) -> zbus::Result<String>;
}

/// Backend speaking to the daemon over the D-Bus session bus.
#[derive(Debug, Clone)]
pub struct DbusBackend {
    config: ClientConfig,
}

impl DbusBackend {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl Backend for DbusBackend {
    fn start(&self, link: BackendLink) -> BackendFuture {
        Box::pin(run(self.config.clone(), link))
    }
}

async fn run(config: ClientConfig, link: BackendLink) -> Result<(), ClientError> {
    let BackendLink {
        events,
        mut calls,
        mut shutdown,
    } = link;

    let conn = Connection::session().await?;
    let files = FilesProxy::builder(&conn)
        .destination(config.bus_name.clone())?
        .path(config.object_path.clone())?
        .interface(config.files_interface.clone())?
        .cache_properties(CacheProperties::No)
        .build()
        .await?;
    let settings = SettingsProxy::builder(&conn)
        .destination(config.bus_name.clone())?
        .path(config.object_path.clone())?
        .interface(config.settings_interface.clone())?
        .cache_properties(CacheProperties::No)
        .build()
        .await?;

    let mut status_changes = files.receive_file_status_changed().await?;
    let mut owner_changes = files.inner().receive_owner_changed().await?;

    let bus = DBusProxy::new(&conn).await?;
    let present = bus
        .name_has_owner(BusName::try_from(config.bus_name.as_str())?)
        .await
        .map_err(zbus::Error::from)?;
    tracing::debug!(bus_name = %config.bus_name, present, "daemon link ready");
    let _ = events.send(DaemonEvent::Presence(present));

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            Some(signal) = status_changes.next() => {
                match signal.args() {
                    Ok(args) => {
                        let _ = events.send(DaemonEvent::FileStatusChanged {
                            path: args.path().to_string(),
                            status: args.status().to_string(),
                        });
                    }
                    Err(err) => tracing::warn!(error = %err, "malformed FileStatusChanged signal"),
                }
            }
            Some(owner) = owner_changes.next() => {
                let _ = events.send(DaemonEvent::Presence(owner.is_some()));
            }
            call = calls.recv() => {
                let Some(call) = call else { break };
                tokio::spawn(serve(call, files.clone(), settings.clone()));
            }
        }
    }

    Ok(())
}

async fn serve(call: DaemonCall, files: FilesProxy<'static>, settings: SettingsProxy<'static>) {
    match call {
        DaemonCall::GetBatchFileStatus { paths, respond_to } => {
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            let reply = files
                .get_batch_file_status(&refs)
                .await
                .map_err(remote_failure);
            let _ = respond_to.send(reply);
        }
        DaemonCall::Action {
            kind,
            path,
            respond_to,
        } => {
            let reply = match kind {
                ActionKind::Pin => files.pin_file(&path).await,
                ActionKind::Unpin => files.unpin_file(&path).await,
                ActionKind::Sync => files.sync_path(&path).await,
            };
            let _ = respond_to.send(reply.map_err(remote_failure));
        }
        DaemonCall::GetConfig { respond_to } => {
            let reply = settings.get_config().await.map_err(remote_failure);
            let _ = respond_to.send(reply);
        }
    }
}

fn remote_failure(err: zbus::Error) -> RemoteFailure {
    match err {
        zbus::Error::MethodError(name, detail, _) => RemoteFailure {
            message: detail.unwrap_or_else(|| name.to_string()),
            name: Some(name.to_string()),
        },
        other => RemoteFailure {
            name: None,
            message: other.to_string(),
        },
    }
}
