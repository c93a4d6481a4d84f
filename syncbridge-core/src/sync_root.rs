//! Sync-root resolution from the daemon's settings blob.
//!
//! The settings blob is not parsed as structured config. The extractor looks
//! for the first literal `sync_root:` substring anywhere in the text and takes
//! the rest of that line as the value. A `sync_root:` inside another value or a
//! comment will match too; that is the daemon contract as it stands and is kept
//! as-is.
//!
//! Every failure (missing key, empty value, or no blob at all) resolves to
//! `<home>/OneDrive`.

use std::path::{Path, PathBuf};

use crate::error::ParseError;

pub const SYNC_ROOT_KEY: &str = "sync_root:";
pub const DEFAULT_SYNC_FOLDER: &str = "OneDrive";

/// `<home>/OneDrive`
pub fn default_sync_root(home: &Path) -> PathBuf {
    home.join(DEFAULT_SYNC_FOLDER)
}

/// Pull the sync root out of a settings blob, expanding a leading `~`.
pub fn extract_sync_root(blob: &str, home: &Path) -> Result<PathBuf, ParseError> {
    let start = blob.find(SYNC_ROOT_KEY).ok_or(ParseError::MissingKey)? + SYNC_ROOT_KEY.len();
    let line = blob[start..]
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default();
    let value = line.trim();
    if value.is_empty() {
        return Err(ParseError::EmptyValue);
    }
    Ok(expand_home(value, home))
}

/// [`extract_sync_root`] with the `<home>/OneDrive` fallback applied.
///
/// `None` stands for a blob that never arrived (transport error or timeout).
pub fn resolve_sync_root(blob: Option<&str>, home: &Path) -> PathBuf {
    blob.and_then(|blob| extract_sync_root(blob, home).ok())
        .unwrap_or_else(|| default_sync_root(home))
}

/// `~` and `~/rest` expand to the home directory; `~user/...` does not.
fn expand_home(value: &str, home: &Path) -> PathBuf {
    if value == "~" {
        return home.to_path_buf();
    }
    match value.strip_prefix("~/") {
        Some(rest) => {
            let rest = rest.trim_start_matches('/');
            if rest.is_empty() {
                home.to_path_buf()
            } else {
                home.join(rest)
            }
        }
        None => PathBuf::from(value),
    }
}

/// True when `path` is the sync root itself or lies below it.
///
/// Comparison is per path component, so `/data/OneDrive2` is not under
/// `/data/OneDrive`. An empty root contains nothing.
pub fn is_under_sync_root(path: &Path, root: &Path) -> bool {
    if root.as_os_str().is_empty() {
        return false;
    }
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> PathBuf {
        PathBuf::from("/home/ana")
    }

    #[test]
    fn expands_tilde_prefix() {
        let blob = "version: 2\nsync_root: ~/Work/Drive\nother: 1\n";
        assert_eq!(
            extract_sync_root(blob, &home()).expect("root"),
            PathBuf::from("/home/ana/Work/Drive")
        );
    }

    #[test]
    fn bare_tilde_is_home() {
        assert_eq!(
            extract_sync_root("sync_root: ~", &home()).expect("root"),
            home()
        );
        assert_eq!(
            extract_sync_root("sync_root: ~/", &home()).expect("root"),
            home()
        );
    }

    #[test]
    fn tilde_user_is_verbatim() {
        assert_eq!(
            extract_sync_root("sync_root: ~bob/Drive", &home()).expect("root"),
            PathBuf::from("~bob/Drive")
        );
    }

    #[test]
    fn absolute_value_is_verbatim_and_trimmed() {
        assert_eq!(
            extract_sync_root("sync_root:\t /srv/drive  \r\nx: 1", &home()).expect("root"),
            PathBuf::from("/srv/drive")
        );
    }

    #[test]
    fn first_match_wins() {
        let blob = "sync_root: /first\nsync_root: /second\n";
        assert_eq!(
            extract_sync_root(blob, &home()).expect("root"),
            PathBuf::from("/first")
        );
    }

    #[test]
    fn substring_match_is_not_line_anchored() {
        let blob = "# old_sync_root: /legacy\nsync_root: /current\n";
        assert_eq!(
            extract_sync_root(blob, &home()).expect("root"),
            PathBuf::from("/legacy")
        );
    }

    #[test]
    fn missing_and_empty_fall_back() {
        assert_eq!(
            extract_sync_root("version: 2\n", &home()),
            Err(ParseError::MissingKey)
        );
        assert_eq!(
            extract_sync_root("sync_root:   \n", &home()),
            Err(ParseError::EmptyValue)
        );
        assert_eq!(
            resolve_sync_root(Some("version: 2\n"), &home()),
            PathBuf::from("/home/ana/OneDrive")
        );
        assert_eq!(
            resolve_sync_root(None, &home()),
            PathBuf::from("/home/ana/OneDrive")
        );
    }

    #[test]
    fn containment_is_component_wise() {
        let root = Path::new("/home/ana/OneDrive");
        assert!(is_under_sync_root(root, root));
        assert!(is_under_sync_root(Path::new("/home/ana/OneDrive/a/b.txt"), root));
        assert!(!is_under_sync_root(Path::new("/home/ana/OneDrive2/a"), root));
        assert!(!is_under_sync_root(Path::new("/tmp/x"), root));
        assert!(!is_under_sync_root(Path::new("/tmp/x"), Path::new("")));
    }
}
