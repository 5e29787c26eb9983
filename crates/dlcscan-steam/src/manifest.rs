use std::fs;
use std::path::{Path, PathBuf};

use dlcscan_utils::CancelToken;
use dlcscan_vdf::Property;
use serde::{Deserialize, Serialize};

use crate::config::{COMMON_DIR, LAUNCHER_NAME, MANIFEST_EXTENSION};

/// An installed application found in a library, not yet checked against metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    pub branch: String,
    pub build_id: u32,
    pub install_dir: PathBuf,
}

impl Candidate {
    /// The launcher pseudo-application, which never goes through a metadata lookup.
    pub fn launcher(root: PathBuf) -> Self {
        Self {
            id: 0,
            name: LAUNCHER_NAME.to_string(),
            branch: String::new(),
            build_id: 0,
            install_dir: root,
        }
    }

    pub fn is_launcher(&self) -> bool {
        self.id == 0
    }
}

/// Reads and parses a VDF file, treating unreadable or malformed files as absent.
pub fn read_vdf_file(path: &Path) -> Option<Property> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "unable to read vdf file");
            return None;
        }
    };
    match dlcscan_vdf::parse(&raw) {
        Ok(root) => Some(root),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "skipping malformed vdf file");
            None
        }
    }
}

/// Lists the app manifests directly inside `library` and turns each valid one into a [`Candidate`].
///
/// Returns `None` when the directory is missing, the scan was cancelled, or no
/// manifest produced a candidate.
pub fn scan_library(library: &Path, cancel: &CancelToken) -> Option<Vec<Candidate>> {
    if cancel.is_cancelled() || !library.is_dir() {
        return None;
    }
    let read_dir = match fs::read_dir(library) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            tracing::debug!(library = %library.display(), %err, "unable to list library");
            return None;
        }
    };
    let mut manifests: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(MANIFEST_EXTENSION)
        })
        .collect();
    manifests.sort();

    let mut candidates = Vec::new();
    for manifest in manifests {
        if cancel.is_cancelled() {
            return None;
        }
        let Some(root) = read_vdf_file(&manifest) else {
            continue;
        };
        match candidate_from_manifest(library, &root) {
            Some(candidate) => candidates.push(candidate),
            None => tracing::debug!(manifest = %manifest.display(), "manifest lacks required fields"),
        }
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates)
    }
}

/// Builds a candidate from a parsed `AppState` document.
///
/// `appid`, `installdir`, `name` and `buildid` must all be present and
/// non-blank; ids must be numeric. The branch comes from `UserConfig.betakey`.
pub fn candidate_from_manifest(library: &Path, root: &Property) -> Option<Candidate> {
    let state = &root.value;
    let id = state.non_blank("appid")?;
    let install_dir = state.non_blank("installdir")?;
    let name = state.non_blank("name")?;
    let build_id = state.non_blank("buildid")?;
    let branch = state
        .get("UserConfig")
        .and_then(|config| config.non_blank("betakey"))
        .unwrap_or("public");
    Some(Candidate {
        id: id.parse().ok()?,
        name: name.to_string(),
        branch: branch.to_string(),
        build_id: build_id.parse().ok()?,
        install_dir: library.join(COMMON_DIR).join(install_dir),
    })
}
