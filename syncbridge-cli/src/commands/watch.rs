//! `syncbridge watch` — stream client events to stdout.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;

use syncbridge_client::ClientEvent;

use super::Session;

/// Demo file that finishes syncing shortly after `watch` starts.
const DEMO_SETTLING_FILE: &str = "SyncBridge/notes.md";

/// Arguments for `syncbridge watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Stop after this many seconds instead of running until interrupted.
    #[arg(long)]
    pub for_secs: Option<u64>,
}

impl WatchArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let subscription = session.client.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });

        println!(
            "watching (daemon {})",
            if session.client.is_daemon_running() {
                "available"
            } else {
                "not running"
            }
        );

        if let Some((daemon, home)) = session.demo() {
            daemon.emit_status(home.join(DEMO_SETTLING_FILE).display().to_string(), "synced");
        }

        let deadline = self
            .for_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        loop {
            let event = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    match rx.recv_timeout(left) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match rx.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            println!("{}", render(&event));
        }

        session.client.unsubscribe(subscription);
        Ok(())
    }
}

fn render(event: &ClientEvent) -> String {
    match event {
        ClientEvent::StatusChanged { path, status } => {
            format!("status-changed {} {status}", path.display())
        }
        ClientEvent::AvailabilityChanged(available) => {
            format!("availability-changed {available}")
        }
    }
}
