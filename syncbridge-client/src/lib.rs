//! Syncbridge client — the file browser's link to the sync daemon.
//!
//! One [`SyncClient`] is built at application start and shared by reference
//! with every adapter. It owns:
//! - the connection supervisor (daemon presence, graceful degradation)
//! - the status cache (non-blocking per-path reads)
//! - the config fetcher (sync root, with a `<home>/OneDrive` fallback)
//! - the action dispatcher (pin / unpin / sync with exactly-once completion)
//! - the event bridge (daemon push notifications fanned out to subscribers)
//!
//! The daemon itself is reached through a [`Backend`]: [`DbusBackend`] on a
//! real session bus, [`ScriptedBackend`] for tests and demos.

mod bridge;
mod cache;
mod client;
mod config_fetch;
mod dbus;
mod dispatch;
mod error;
mod events;
mod logging;
pub mod scripted;
mod supervisor;
pub mod transport;

pub use cache::StatusCache;
pub use client::SyncClient;
pub use dbus::DbusBackend;
pub use dispatch::ActionHandle;
pub use error::ClientError;
pub use events::{ClientEvent, SubscriptionId};
pub use logging::init_tracing;
pub use scripted::{ScriptedBackend, ScriptedDaemon};
pub use transport::{Backend, BackendLink, DaemonCall, DaemonEvent, RemoteFailure};
