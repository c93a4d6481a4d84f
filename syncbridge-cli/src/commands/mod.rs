pub mod action;
pub mod menu;
pub mod root;
pub mod status;
pub mod watch;

use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;

use syncbridge_client::{ScriptedDaemon, SyncClient};
use syncbridge_core::ClientConfig;

/// How long a command waits for the daemon to announce itself.
const PRESENCE_SETTLE: Duration = Duration::from_millis(750);
const PRESENCE_POLL: Duration = Duration::from_millis(10);

/// A connected client plus the scripted daemon behind it in demo mode.
pub struct Session {
    pub client: SyncClient,
    demo: Option<(ScriptedDaemon, PathBuf)>,
}

impl Session {
    pub fn open(demo: bool) -> Result<Self> {
        let config = ClientConfig::load().context("failed to load client config")?;

        let (client, demo) = if demo {
            let home = dirs::home_dir().context("could not determine home directory")?;
            let daemon = ScriptedDaemon::demo(&home);
            let client = SyncClient::with_backend(config, home.clone(), daemon.backend())
                .context("failed to start client runtime")?;
            (client, Some((daemon, home)))
        } else {
            let client = SyncClient::new(config).context("failed to start client")?;
            (client, None)
        };

        client.connect();
        let deadline = Instant::now() + PRESENCE_SETTLE;
        while !client.is_daemon_running() && Instant::now() < deadline {
            sleep(PRESENCE_POLL);
        }

        Ok(Self { client, demo })
    }

    /// The scripted daemon and the home it was seeded under, in demo mode.
    pub fn demo(&self) -> Option<(&ScriptedDaemon, &Path)> {
        self.demo
            .as_ref()
            .map(|(daemon, home)| (daemon, home.as_path()))
    }

    /// Print the degraded-mode banner when the daemon is absent.
    pub fn warn_if_degraded(&self) {
        if !self.client.is_daemon_running() {
            eprintln!(
                "{} sync daemon is not running; statuses are unknown and actions will fail",
                "warning:".yellow().bold()
            );
        }
    }
}

/// Anchor relative paths at the working directory; the daemon only knows
/// absolute ones.
pub fn absolutize(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    Ok(paths.iter().map(|path| anchor(&cwd, path)).collect())
}

fn anchor(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
