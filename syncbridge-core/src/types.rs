//! Domain types shared by the client and its consumers.
//!
//! Status strings on the wire are kebab-case (`cloud-only`). Anything the
//! daemon sends outside the fixed vocabulary is read as [`FileStatus::Unknown`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// File status
// ---------------------------------------------------------------------------

/// Last observed sync state of a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Synced,
    CloudOnly,
    Syncing,
    Pending,
    Conflict,
    Error,
    Excluded,
    #[default]
    Unknown,
}

impl FileStatus {
    pub const ALL: [FileStatus; 8] = [
        FileStatus::Synced,
        FileStatus::CloudOnly,
        FileStatus::Syncing,
        FileStatus::Pending,
        FileStatus::Conflict,
        FileStatus::Error,
        FileStatus::Excluded,
        FileStatus::Unknown,
    ];

    /// Parse a daemon status string. Unrecognized values map to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "synced" => FileStatus::Synced,
            "cloud-only" => FileStatus::CloudOnly,
            "syncing" => FileStatus::Syncing,
            "pending" => FileStatus::Pending,
            "conflict" => FileStatus::Conflict,
            "error" => FileStatus::Error,
            "excluded" => FileStatus::Excluded,
            _ => FileStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Synced => "synced",
            FileStatus::CloudOnly => "cloud-only",
            FileStatus::Syncing => "syncing",
            FileStatus::Pending => "pending",
            FileStatus::Conflict => "conflict",
            FileStatus::Error => "error",
            FileStatus::Excluded => "excluded",
            FileStatus::Unknown => "unknown",
        }
    }

    /// Human-readable column label.
    pub fn label(self) -> &'static str {
        match self {
            FileStatus::Synced => "Synced",
            FileStatus::CloudOnly => "Cloud Only",
            FileStatus::Syncing => "Syncing",
            FileStatus::Pending => "Pending",
            FileStatus::Conflict => "Conflict",
            FileStatus::Error => "Error",
            FileStatus::Excluded => "Excluded",
            FileStatus::Unknown => "Unknown",
        }
    }

    /// Overlay icon name, or `None` when the file should look unmanaged.
    pub fn emblem(self, excluded: ExcludedMarker) -> Option<&'static str> {
        match self {
            FileStatus::Synced => Some("syncbridge-synced"),
            FileStatus::CloudOnly => Some("syncbridge-cloud-only"),
            FileStatus::Syncing => Some("syncbridge-syncing"),
            FileStatus::Pending => Some("syncbridge-pending"),
            FileStatus::Conflict => Some("syncbridge-conflict"),
            FileStatus::Error => Some("syncbridge-error"),
            FileStatus::Unknown => Some("syncbridge-unknown"),
            FileStatus::Excluded => match excluded {
                ExcludedMarker::None => None,
                ExcludedMarker::Distinct => Some("syncbridge-excluded"),
            },
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FileStatus {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Whether `excluded` files get their own emblem or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExcludedMarker {
    #[default]
    None,
    Distinct,
}

// ---------------------------------------------------------------------------
// Actions and connection
// ---------------------------------------------------------------------------

/// A mutating request the daemon can be asked to perform on one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Hydrate and keep local.
    Pin,
    /// Dehydrate back to a cloud-only placeholder.
    Unpin,
    /// Force an immediate sync.
    Sync,
}

impl ActionKind {
    /// Daemon method name for this action.
    pub fn daemon_method(self) -> &'static str {
        match self {
            ActionKind::Pin => "PinFile",
            ActionKind::Unpin => "UnpinFile",
            ActionKind::Sync => "SyncPath",
        }
    }

    /// User-facing title, used in menus and failure notifications.
    pub fn title(self) -> &'static str {
        match self {
            ActionKind::Pin => "Keep Available Offline",
            ActionKind::Unpin => "Free Up Space",
            ActionKind::Sync => "Sync Now",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Pin => write!(f, "pin"),
            ActionKind::Unpin => write!(f, "unpin"),
            ActionKind::Sync => write!(f, "sync"),
        }
    }
}

/// Presence of the daemon on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    NotConnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl From<bool> for ConnectionState {
    fn from(present: bool) -> Self {
        if present {
            ConnectionState::Connected
        } else {
            ConnectionState::NotConnected
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_covers_vocabulary() {
        for status in FileStatus::ALL {
            assert_eq!(FileStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        assert_eq!(FileStatus::parse("hydrating-v2"), FileStatus::Unknown);
        assert_eq!(FileStatus::parse(""), FileStatus::Unknown);
        assert_eq!(FileStatus::parse("SYNCED"), FileStatus::Unknown);
    }

    #[test]
    fn serde_uses_wire_names() {
        let yaml = serde_yaml::to_string(&FileStatus::CloudOnly).expect("serialize");
        assert_eq!(yaml.trim(), "cloud-only");
    }

    #[test]
    fn excluded_emblem_follows_policy() {
        assert_eq!(FileStatus::Excluded.emblem(ExcludedMarker::None), None);
        assert_eq!(
            FileStatus::Excluded.emblem(ExcludedMarker::Distinct),
            Some("syncbridge-excluded")
        );
        assert_eq!(
            FileStatus::Unknown.emblem(ExcludedMarker::None),
            Some("syncbridge-unknown")
        );
    }

    #[test]
    fn action_method_names() {
        assert_eq!(ActionKind::Pin.daemon_method(), "PinFile");
        assert_eq!(ActionKind::Unpin.daemon_method(), "UnpinFile");
        assert_eq!(ActionKind::Sync.daemon_method(), "SyncPath");
    }

    #[test]
    fn connection_state_from_presence() {
        assert!(ConnectionState::from(true).is_connected());
        assert!(!ConnectionState::from(false).is_connected());
        assert_eq!(ConnectionState::default(), ConnectionState::NotConnected);
    }
}
