//! Which file actions a selection is offered.
//!
//! The planner is a pure function of the selection, the sync root, daemon
//! presence and a status lookup, so menu adapters stay free of policy.

use std::path::{Path, PathBuf};

use crate::sync_root::is_under_sync_root;
use crate::types::{ActionKind, FileStatus};

/// One offered action and the paths it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuAction {
    pub kind: ActionKind,
    pub targets: Vec<PathBuf>,
}

impl MenuAction {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Menu {
    /// Nothing in the selection is managed; show no items.
    Hidden,
    /// The daemon is absent; show a single disabled "service not running" item.
    ServiceUnavailable,
    Actions(Vec<MenuAction>),
}

/// Plan the context menu for a selection of files.
///
/// Pin is offered for cloud-only files, unpin for synced files, and sync for
/// every selected path inside the sync root.
pub fn plan_file_actions<F>(
    selection: &[PathBuf],
    sync_root: &Path,
    daemon_running: bool,
    mut status_of: F,
) -> Menu
where
    F: FnMut(&Path) -> FileStatus,
{
    if !daemon_running {
        return Menu::ServiceUnavailable;
    }

    let managed: Vec<&PathBuf> = selection
        .iter()
        .filter(|path| is_under_sync_root(path, sync_root))
        .collect();
    if managed.is_empty() {
        return Menu::Hidden;
    }

    let mut pin = Vec::new();
    let mut unpin = Vec::new();
    for path in &managed {
        match status_of(path) {
            FileStatus::CloudOnly => pin.push((*path).clone()),
            FileStatus::Synced => unpin.push((*path).clone()),
            _ => {}
        }
    }

    let mut actions = Vec::new();
    if !pin.is_empty() {
        actions.push(MenuAction {
            kind: ActionKind::Pin,
            targets: pin,
        });
    }
    if !unpin.is_empty() {
        actions.push(MenuAction {
            kind: ActionKind::Unpin,
            targets: unpin,
        });
    }
    actions.push(MenuAction {
        kind: ActionKind::Sync,
        targets: managed.into_iter().cloned().collect(),
    });
    Menu::Actions(actions)
}

/// Plan the background menu for an open folder: sync it when managed.
pub fn plan_folder_actions(folder: &Path, sync_root: &Path, daemon_running: bool) -> Menu {
    if !daemon_running {
        return Menu::ServiceUnavailable;
    }
    if !is_under_sync_root(folder, sync_root) {
        return Menu::Hidden;
    }
    Menu::Actions(vec![MenuAction {
        kind: ActionKind::Sync,
        targets: vec![folder.to_path_buf()],
    }])
}
