//! `syncbridge menu` — preview the context-menu actions for a selection.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use syncbridge_core::menu::{plan_file_actions, plan_folder_actions, Menu};

use super::{absolutize, Session};

/// Arguments for `syncbridge menu`.
#[derive(Args, Debug)]
pub struct MenuArgs {
    /// Selected paths. A single existing directory is planned as an open folder.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl MenuArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let selection = absolutize(&self.paths)?;
        let client = &session.client;
        let root = client.refresh_sync_root();
        let running = client.is_daemon_running();

        let menu = match selection.as_slice() {
            [folder] if folder.is_dir() => plan_folder_actions(folder, &root, running),
            _ => {
                client.get_batch_file_status(&selection);
                plan_file_actions(&selection, &root, running, |path| {
                    client.get_file_status(path)
                })
            }
        };

        match menu {
            Menu::Hidden => println!("no actions: nothing selected is inside {}", root.display()),
            Menu::ServiceUnavailable => {
                println!("{}", "Sync service is not running (disabled)".bright_black())
            }
            Menu::Actions(actions) => {
                for action in actions {
                    println!("{}", action.title().bold());
                    for target in &action.targets {
                        println!("  {}", target.display());
                    }
                }
            }
        }
        Ok(())
    }
}
