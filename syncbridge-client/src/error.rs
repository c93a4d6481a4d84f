use thiserror::Error;

/// Error surface for client construction and transport plumbing.
///
/// Nothing here reaches action callers; they see `ActionError`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    #[error("invalid D-Bus name: {0}")]
    Name(#[from] zbus::names::Error),

    #[error("failed to start client runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] syncbridge_core::ConfigError),
}
