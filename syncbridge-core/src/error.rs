//! Error types for syncbridge-core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Classification of a failure reported by the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    InsufficientDiskSpace,
    FileInUse,
    InvalidPath,
    /// Any other remote error; the original message is kept for display.
    Unclassified(String),
}

impl RemoteErrorKind {
    /// Classify a remote error by name.
    ///
    /// Names are matched on their last dotted segment so that
    /// `org.example.Drive.Error.FileInUse` and `FileInUse` are equivalent.
    pub fn classify(name: Option<&str>, message: &str) -> Self {
        let segment = name.and_then(|n| n.rsplit('.').next()).unwrap_or_default();
        match segment {
            "InsufficientDiskSpace" => RemoteErrorKind::InsufficientDiskSpace,
            "FileInUse" => RemoteErrorKind::FileInUse,
            "InvalidPath" => RemoteErrorKind::InvalidPath,
            _ => RemoteErrorKind::Unclassified(message.to_string()),
        }
    }
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteErrorKind::InsufficientDiskSpace => write!(f, "insufficient disk space"),
            RemoteErrorKind::FileInUse => write!(f, "file is in use"),
            RemoteErrorKind::InvalidPath => write!(f, "path is not inside the sync folder"),
            RemoteErrorKind::Unclassified(message) => f.write_str(message),
        }
    }
}

/// Outcome of a failed pin / unpin / sync request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No live channel to the daemon; no request was sent.
    #[error("sync daemon is not available")]
    Connection,

    /// The daemon answered with an error.
    #[error("daemon error: {kind}")]
    Remote { kind: RemoteErrorKind },

    /// The round trip exceeded its bound.
    #[error("request timed out after {}s", .limit.as_secs())]
    Timeout { limit: Duration },

    /// The caller withdrew interest before a result arrived.
    #[error("request was cancelled")]
    Cancelled,
}

impl ActionError {
    pub fn remote(kind: RemoteErrorKind) -> Self {
        ActionError::Remote { kind }
    }

    /// Desktop-notification text for this failure, `None` for cancellations.
    pub fn notification(&self, action_title: &str) -> Option<Notification> {
        let (title, body) = match self {
            ActionError::Cancelled => return None,
            ActionError::Remote {
                kind: RemoteErrorKind::InsufficientDiskSpace,
            } => (
                "Not Enough Disk Space",
                "There is not enough disk space to complete this operation. \
                 Free up some space and try again."
                    .to_string(),
            ),
            ActionError::Remote {
                kind: RemoteErrorKind::FileInUse,
            } => (
                "File In Use",
                "The file is currently in use by another process. \
                 Close the file and try again."
                    .to_string(),
            ),
            ActionError::Remote {
                kind: RemoteErrorKind::InvalidPath,
            } => (
                "File Not in Sync Folder",
                "This file is not inside the sync folder.".to_string(),
            ),
            other => (
                "Operation Failed",
                format!("The \"{action_title}\" operation failed: {}", failure_text(other)),
            ),
        };
        Some(Notification {
            title: title.to_string(),
            body,
        })
    }
}

fn failure_text(err: &ActionError) -> String {
    match err {
        ActionError::Remote {
            kind: RemoteErrorKind::Unclassified(message),
        } => message.clone(),
        other => other.to_string(),
    }
}

/// Title and body of a user-facing failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Errors loading the client's own configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse client config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Why a settings blob yielded no sync root. Internal to the fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("settings blob has no `sync_root:` entry")]
    MissingKey,

    #[error("`sync_root:` entry is empty")]
    EmptyValue,
}
