//! Seam between the client and whatever carries calls to the daemon.
//!
//! The client never talks to a bus directly. It hands a [`Backend`] a
//! [`BackendLink`]: an event sender that the event bridge is already draining,
//! and a receiver of [`DaemonCall`]s, each carrying its own oneshot responder.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};

use syncbridge_core::{ActionError, ActionKind, RemoteErrorKind};

use crate::error::ClientError;

/// Error reported by the daemon for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    /// Remote error identifier, e.g. `org.enigmora.LNXDrive.Error.FileInUse`.
    pub name: Option<String>,
    pub message: String,
}

impl RemoteFailure {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RemoteErrorKind {
        RemoteErrorKind::classify(self.name.as_deref(), &self.message)
    }
}

pub type Responder<T> = oneshot::Sender<Result<T, RemoteFailure>>;

/// A request for the daemon.
#[derive(Debug)]
pub enum DaemonCall {
    GetBatchFileStatus {
        paths: Vec<String>,
        respond_to: Responder<HashMap<String, String>>,
    },
    Action {
        kind: ActionKind,
        path: String,
        respond_to: Responder<()>,
    },
    GetConfig {
        respond_to: Responder<String>,
    },
}

/// Something the daemon (or the bus) pushed at us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonEvent {
    /// The daemon's bus name gained (`true`) or lost (`false`) an owner.
    Presence(bool),
    FileStatusChanged { path: String, status: String },
}

/// Channels handed to a backend when the client connects.
pub struct BackendLink {
    pub events: mpsc::UnboundedSender<DaemonEvent>,
    pub calls: mpsc::Receiver<DaemonCall>,
    pub shutdown: broadcast::Receiver<()>,
}

pub type BackendFuture = Pin<Box<dyn Future<Output = Result<(), ClientError>> + Send + 'static>>;

/// A way of reaching the daemon.
///
/// `start` must subscribe to push notifications and presence changes before
/// it reports the initial presence, then serve calls until `shutdown` fires or
/// the call channel closes. An `Err` means the channel could not be built; the
/// client logs it and stays disconnected.
pub trait Backend: Send + Sync + 'static {
    fn start(&self, link: BackendLink) -> BackendFuture;
}

/// Why a round trip produced no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallError {
    /// The backend went away before answering.
    Closed,
    Timeout(Duration),
    Remote(RemoteFailure),
}

impl From<CallError> for ActionError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Closed => ActionError::Connection,
            CallError::Timeout(limit) => ActionError::Timeout { limit },
            CallError::Remote(failure) => ActionError::remote(failure.kind()),
        }
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Closed => write!(f, "daemon link closed"),
            CallError::Timeout(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
            CallError::Remote(failure) => match &failure.name {
                Some(name) => write!(f, "{name}: {}", failure.message),
                None => f.write_str(&failure.message),
            },
        }
    }
}

/// Send one call and wait for its reply, bounded by `limit` end to end.
pub(crate) async fn round_trip<T>(
    calls: &mpsc::Sender<DaemonCall>,
    limit: Duration,
    make: impl FnOnce(Responder<T>) -> DaemonCall,
) -> Result<T, CallError> {
    let (tx, rx) = oneshot::channel();
    let exchange = async {
        calls.send(make(tx)).await.map_err(|_| CallError::Closed)?;
        match rx.await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(failure)) => Err(CallError::Remote(failure)),
            Err(_) => Err(CallError::Closed),
        }
    };
    tokio::time::timeout(limit, exchange)
        .await
        .map_err(|_| CallError::Timeout(limit))?
}
