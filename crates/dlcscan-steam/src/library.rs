use std::path::{Path, PathBuf};

use dlcscan_utils::CancelToken;
use dlcscan_vdf::Value;

use crate::config::{SteamConfig, LIBRARY_DIR, LIBRARY_FOLDERS_FILE};
use crate::manifest::read_vdf_file;

/// Resolves every `steamapps` directory known to the local Steam install.
///
/// The main library always comes first, followed by the extra roots listed in
/// `libraryfolders.vdf` in file order. Paths are deduplicated exactly as written.
pub fn locate_libraries(config: &SteamConfig, cancel: &CancelToken) -> Vec<PathBuf> {
    if cancel.is_cancelled() {
        return Vec::new();
    }
    match config.install_dir() {
        Some(install) => libraries_from_install(&install),
        None => {
            tracing::debug!("no Steam installation found");
            Vec::new()
        }
    }
}

pub fn libraries_from_install(install: &Path) -> Vec<PathBuf> {
    let mut libraries = Vec::new();
    let main_library = install.join(LIBRARY_DIR);
    if !main_library.is_dir() {
        return libraries;
    }
    libraries.push(main_library.clone());

    let folders_file = main_library.join(LIBRARY_FOLDERS_FILE);
    if !folders_file.is_file() {
        return libraries;
    }
    let Some(root) = read_vdf_file(&folders_file) else {
        return libraries;
    };
    for folder in root.value.children() {
        if folder.key.parse::<u32>().is_err() {
            continue;
        }
        let Some(path) = folder_path(&folder.value) else {
            continue;
        };
        let library = PathBuf::from(path).join(LIBRARY_DIR);
        if library.is_dir() && !libraries.contains(&library) {
            tracing::debug!(library = %library.display(), "found extra library");
            libraries.push(library);
        }
    }
    libraries
}

/// Current files nest the path under `path`; older ones store it as the entry's value.
fn folder_path(folder: &Value) -> Option<&str> {
    match folder {
        Value::Branch(_) => folder.non_blank("path"),
        Value::Leaf(path) => Some(path.trim()).filter(|path| !path.is_empty()),
    }
}
