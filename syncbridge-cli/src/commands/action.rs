//! `syncbridge pin|unpin|sync` — dispatch an action for each path.

use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use syncbridge_core::{ActionError, ActionKind};

use super::{absolutize, Session};

/// Arguments shared by `pin`, `unpin` and `sync`.
#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Paths to act on.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl ActionArgs {
    pub fn run(self, session: &Session, kind: ActionKind) -> Result<()> {
        let paths = absolutize(&self.paths)?;
        session.warn_if_degraded();

        let (tx, rx) = mpsc::channel();
        let handles: Vec<_> = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let tx = tx.clone();
                session.client.dispatch(kind, path.clone(), move |outcome| {
                    let _ = tx.send((index, outcome));
                })
            })
            .collect();
        drop(tx);

        let mut outcomes: Vec<Option<Result<(), ActionError>>> = vec![None; paths.len()];
        for _ in 0..handles.len() {
            let (index, outcome) = rx.recv().context("action completion was dropped")?;
            outcomes[index] = Some(outcome);
        }

        let mut failed = 0;
        for (path, outcome) in paths.iter().zip(outcomes) {
            match outcome.unwrap_or(Err(ActionError::Cancelled)) {
                Ok(()) => println!("{} {kind} {}", "ok".green().bold(), path.display()),
                Err(err) => {
                    failed += 1;
                    println!("{} {kind} {}: {err}", "failed".red().bold(), path.display());
                    if let Some(notice) = err.notification(kind.title()) {
                        println!("  {}: {}", notice.title.bold(), notice.body);
                    }
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} {kind} request(s) failed", paths.len());
        }
        Ok(())
    }
}
