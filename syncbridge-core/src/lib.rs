//! Syncbridge core library — status vocabulary, errors, sync-root policy.
//!
//! Public API surface:
//! - [`types`] — [`FileStatus`], [`ActionKind`], [`ConnectionState`], presentation policy
//! - [`error`] — [`ActionError`], [`RemoteErrorKind`], [`ConfigError`]
//! - [`sync_root`] — `sync_root:` extraction with home fallback, root containment
//! - [`config`] — [`ClientConfig`] load
//! - [`menu`] — which actions a selection of files is offered

pub mod config;
pub mod error;
pub mod menu;
pub mod sync_root;
pub mod types;

pub use config::ClientConfig;
pub use error::{ActionError, ConfigError, Notification, RemoteErrorKind};
pub use types::{ActionKind, ConnectionState, ExcludedMarker, FileStatus};
