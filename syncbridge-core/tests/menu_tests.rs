//! Context-menu planning over mixed selections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rstest::rstest;
use syncbridge_core::menu::{plan_file_actions, plan_folder_actions, Menu, MenuAction};
use syncbridge_core::{ActionKind, FileStatus};

fn root() -> PathBuf {
    PathBuf::from("/home/ana/OneDrive")
}

fn lookup(entries: &[(&str, FileStatus)]) -> impl FnMut(&Path) -> FileStatus {
    let map: HashMap<PathBuf, FileStatus> = entries
        .iter()
        .map(|(p, s)| (PathBuf::from(p), *s))
        .collect();
    move |path| map.get(path).copied().unwrap_or_default()
}

#[test]
fn daemon_absent_shows_unavailable() {
    let selection = vec![root().join("a.txt")];
    let menu = plan_file_actions(&selection, &root(), false, lookup(&[]));
    assert_eq!(menu, Menu::ServiceUnavailable);
}

#[test]
fn selection_outside_root_is_hidden() {
    let selection = vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/home/ana/Other/b")];
    let menu = plan_file_actions(&selection, &root(), true, lookup(&[]));
    assert_eq!(menu, Menu::Hidden);
}

#[test]
fn mixed_selection_offers_pin_unpin_and_sync() {
    let cloud = "/home/ana/OneDrive/cloud.bin";
    let local = "/home/ana/OneDrive/local.txt";
    let busy = "/home/ana/OneDrive/busy.txt";
    let selection = vec![
        PathBuf::from(cloud),
        PathBuf::from(local),
        PathBuf::from(busy),
        PathBuf::from("/tmp/outside"),
    ];
    let status = lookup(&[
        (cloud, FileStatus::CloudOnly),
        (local, FileStatus::Synced),
        (busy, FileStatus::Syncing),
    ]);

    let menu = plan_file_actions(&selection, &root(), true, status);
    assert_eq!(
        menu,
        Menu::Actions(vec![
            MenuAction {
                kind: ActionKind::Pin,
                targets: vec![PathBuf::from(cloud)],
            },
            MenuAction {
                kind: ActionKind::Unpin,
                targets: vec![PathBuf::from(local)],
            },
            MenuAction {
                kind: ActionKind::Sync,
                targets: vec![PathBuf::from(cloud), PathBuf::from(local), PathBuf::from(busy)],
            },
        ])
    );
}

#[rstest]
#[case(FileStatus::Unknown)]
#[case(FileStatus::Pending)]
#[case(FileStatus::Conflict)]
#[case(FileStatus::Excluded)]
fn non_pinnable_status_offers_sync_only(#[case] status: FileStatus) {
    let path = "/home/ana/OneDrive/doc.odt";
    let selection = vec![PathBuf::from(path)];
    let menu = plan_file_actions(&selection, &root(), true, lookup(&[(path, status)]));
    match menu {
        Menu::Actions(actions) => {
            assert_eq!(actions.len(), 1);
            assert_eq!(actions[0].kind, ActionKind::Sync);
            assert_eq!(actions[0].title(), "Sync Now");
        }
        other => panic!("expected actions, got {other:?}"),
    }
}

#[rstest]
#[case("/home/ana/OneDrive", true, true)]
#[case("/home/ana/OneDrive/Photos", true, true)]
#[case("/home/ana/Downloads", true, false)]
fn folder_menu(#[case] folder: &str, #[case] running: bool, #[case] offered: bool) {
    let menu = plan_folder_actions(Path::new(folder), &root(), running);
    assert_eq!(matches!(menu, Menu::Actions(_)), offered, "menu: {menu:?}");
}

#[test]
fn folder_menu_without_daemon() {
    let menu = plan_folder_actions(&root(), &root(), false);
    assert_eq!(menu, Menu::ServiceUnavailable);
}
