//! `syncbridge status` — per-path sync state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use syncbridge_core::sync_root::is_under_sync_root;
use syncbridge_core::FileStatus;

use super::{absolutize, Session};

/// Arguments for `syncbridge status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Paths to query.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let paths = absolutize(&self.paths)?;
        let report = build_report(session, paths);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        session.warn_if_degraded();
        print_table(report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    daemon_running: bool,
    sync_root: String,
    files: Vec<FileRow>,
}

#[derive(Debug, Serialize)]
struct FileRow {
    path: String,
    status: FileStatus,
    label: &'static str,
    emblem: Option<&'static str>,
    in_sync_root: bool,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "label")]
    label: String,
}

fn build_report(session: &Session, paths: Vec<PathBuf>) -> StatusReport {
    let client = &session.client;
    let answered = client.get_batch_file_status(&paths);
    let root = client.refresh_sync_root();
    let excluded = client.config().excluded_marker;

    let files = paths
        .into_iter()
        .map(|path| {
            let status = answered
                .get(&path)
                .copied()
                .unwrap_or_else(|| client.get_file_status(&path));
            FileRow {
                in_sync_root: is_under_sync_root(&path, &root),
                path: path.display().to_string(),
                status,
                label: status.label(),
                emblem: status.emblem(excluded),
            }
        })
        .collect();

    StatusReport {
        daemon_running: client.is_daemon_running(),
        sync_root: root.display().to_string(),
        files,
    }
}

fn print_table(report: StatusReport) {
    println!("Sync root: {}", report.sync_root);

    let rows: Vec<StatusTableRow> = report
        .files
        .into_iter()
        .map(|row| StatusTableRow {
            path: if row.in_sync_root {
                row.path
            } else {
                format!("{} (outside sync root)", row.path)
            },
            status: status_indicator(row.status).to_string(),
            label: row.label.to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn status_indicator(status: FileStatus) -> ColoredString {
    let key = status.as_str();
    match status {
        FileStatus::Synced => key.green(),
        FileStatus::CloudOnly => key.blue(),
        FileStatus::Syncing | FileStatus::Pending => key.cyan(),
        FileStatus::Conflict | FileStatus::Error => key.red().bold(),
        FileStatus::Excluded | FileStatus::Unknown => key.bright_black(),
    }
}
