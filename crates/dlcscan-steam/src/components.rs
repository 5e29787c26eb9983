use std::io;
use std::path::{Path, PathBuf};

use dlcscan_utils::CancelToken;
use walkdir::WalkDir;

/// Result of walking one directory subtree.
#[derive(Debug)]
pub enum WalkOutcome {
    /// Directories containing a marker file, in pre-order.
    Done(Vec<PathBuf>),
    /// The root could not be listed, so nothing was searched.
    Skipped { path: PathBuf, error: io::Error },
    Cancelled,
}

/// Finds every directory under `install_dir` (itself included) that directly
/// contains one of the `markers`.
///
/// Returns `None` when nothing was found, the root is missing or unreadable,
/// or the walk was cancelled.
pub fn locate_components<S: AsRef<str>>(
    install_dir: &Path,
    markers: &[S],
    cancel: &CancelToken,
) -> Option<Vec<PathBuf>> {
    if !install_dir.is_dir() {
        return None;
    }
    match walk(install_dir, markers, cancel) {
        WalkOutcome::Done(hits) if !hits.is_empty() => Some(hits),
        WalkOutcome::Done(_) | WalkOutcome::Cancelled => None,
        WalkOutcome::Skipped { path, error } => {
            tracing::debug!(path = %path.display(), %error, "install directory is unreadable");
            None
        }
    }
}

/// Walks `dir` in sorted pre-order, following linked directories.
///
/// Sub-directories that cannot be listed are logged and contribute nothing.
pub fn walk<S: AsRef<str>>(dir: &Path, markers: &[S], cancel: &CancelToken) -> WalkOutcome {
    let mut hits = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();
    for entry in walker {
        if cancel.is_cancelled() {
            return WalkOutcome::Cancelled;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                let error = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
                return WalkOutcome::Skipped { path, error };
            }
            Err(err) => {
                tracing::debug!(path = ?err.path(), %err, "skipping unreadable directory");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if markers
            .iter()
            .any(|marker| entry.path().join(marker.as_ref()).is_file())
        {
            hits.push(entry.into_path());
        }
    }
    WalkOutcome::Done(hits)
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::config::DEFAULT_MARKERS;

    #[test]
    fn finds_single_deep_marker() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a").join("b").join("c");
        create_dir_all(&deep).unwrap();
        create_dir_all(dir.path().join("other")).unwrap();
        write(deep.join("steam_api64.dll"), b"").unwrap();
        assert_eq!(
            locate_components(dir.path(), &DEFAULT_MARKERS, &CancelToken::new()),
            Some(vec![deep])
        );
    }

    #[test]
    fn records_root_before_children() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("Bin");
        create_dir_all(&bin).unwrap();
        write(dir.path().join("steam_api.dll"), b"").unwrap();
        write(dir.path().join("steam_api64.dll"), b"").unwrap();
        write(bin.join("steam_api.dll"), b"").unwrap();
        assert_eq!(
            locate_components(dir.path(), &DEFAULT_MARKERS, &CancelToken::new()),
            Some(vec![dir.path().to_path_buf(), bin])
        );
    }

    #[test]
    fn no_markers_or_missing_root_yields_none() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("x/y")).unwrap();
        write(dir.path().join("x/steam_api.txt"), b"").unwrap();
        assert_eq!(
            locate_components(dir.path(), &DEFAULT_MARKERS, &CancelToken::new()),
            None
        );
        assert_eq!(
            locate_components(&dir.path().join("nope"), &DEFAULT_MARKERS, &CancelToken::new()),
            None
        );
    }

    #[test]
    fn marker_directories_named_like_files_do_not_count() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("steam_api.dll")).unwrap();
        assert_eq!(
            locate_components(dir.path(), &DEFAULT_MARKERS, &CancelToken::new()),
            None
        );
    }

    #[test]
    fn cancellation_stops_the_walk() {
        let dir = tempdir().unwrap();
        write(dir.path().join("steam_api.dll"), b"").unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            walk(dir.path(), &DEFAULT_MARKERS, &cancel),
            WalkOutcome::Cancelled
        ));
        assert_eq!(locate_components(dir.path(), &DEFAULT_MARKERS, &cancel), None);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_does_not_stop_the_walk() {
        use std::fs::{read_dir, set_permissions, Permissions};
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("a_locked");
        let open = dir.path().join("b_open");
        create_dir_all(locked.join("inner")).unwrap();
        create_dir_all(&open).unwrap();
        write(locked.join("inner").join("steam_api.dll"), b"").unwrap();
        write(open.join("steam_api64.dll"), b"").unwrap();
        set_permissions(&locked, Permissions::from_mode(0o000)).unwrap();

        // Permissions do not apply to root.
        let listable = read_dir(&locked).is_ok();
        let found = locate_components(dir.path(), &DEFAULT_MARKERS, &CancelToken::new());
        set_permissions(&locked, Permissions::from_mode(0o755)).unwrap();
        if listable {
            return;
        }
        assert_eq!(found, Some(vec![open]));
    }

    #[cfg(unix)]
    #[test]
    fn linked_directories_are_followed() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("real");
        create_dir_all(&target).unwrap();
        write(target.join("steam_api.dll"), b"").unwrap();
        let game = dir.path().join("game");
        create_dir_all(&game).unwrap();
        std::os::unix::fs::symlink(&target, game.join("linked")).unwrap();
        assert_eq!(
            locate_components(&game, &DEFAULT_MARKERS, &CancelToken::new()),
            Some(vec![game.join("linked")])
        );
    }
}
