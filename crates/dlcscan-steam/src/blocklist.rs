use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::manifest::Candidate;

/// Decides whether a candidate is removed before any per-candidate work starts.
pub trait Exclusion: Send + Sync {
    fn excludes(&self, candidate: &Candidate) -> bool;
}

impl<F> Exclusion for F
where
    F: Fn(&Candidate) -> bool + Send + Sync,
{
    fn excludes(&self, candidate: &Candidate) -> bool {
        self(candidate)
    }
}

const PROTECTED_NAMES: &[&str] = &["PAYDAY 2", "Call to Arms"];
const PROTECTED_DIRECTORIES: &[&str] = &["EasyAntiCheat", "BattlEye"];
const PROTECTED_EXCEPTIONS: &[&str] = &["Arma 3"];

/// Games guarded by DLL checks or anti-cheats, or known not to work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockList {
    /// Application names that are always blocked.
    pub names: Vec<String>,
    /// Sub-directory names whose presence blocks an application.
    pub directories: Vec<String>,
    /// Application names never blocked because of their sub-directories.
    pub exceptions: Vec<String>,
    /// How deep below the install directory protected directories are looked for.
    pub max_depth: usize,
}

impl Default for BlockList {
    fn default() -> Self {
        let owned = |values: &[&str]| -> Vec<String> {
            values.iter().map(|value| value.to_string()).collect()
        };
        Self {
            names: owned(PROTECTED_NAMES),
            directories: owned(PROTECTED_DIRECTORIES),
            exceptions: owned(PROTECTED_EXCEPTIONS),
            max_depth: 1,
        }
    }
}

impl BlockList {
    pub fn is_blocked(&self, name: &str, install_dir: &Path) -> bool {
        if self.names.iter().any(|blocked| blocked == name) {
            return true;
        }
        if self.exceptions.iter().any(|allowed| allowed == name) {
            return false;
        }
        WalkDir::new(install_dir)
            .min_depth(1)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(%err, "skipping entry while checking protections");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .any(|entry| {
                let file_name = entry.file_name().to_string_lossy();
                self.directories
                    .iter()
                    .any(|protected| file_name.eq_ignore_ascii_case(protected))
            })
    }
}

impl Exclusion for BlockList {
    fn excludes(&self, candidate: &Candidate) -> bool {
        let blocked = self.is_blocked(&candidate.name, &candidate.install_dir);
        if blocked {
            tracing::info!(id = candidate.id, name = %candidate.name, "skipping protected game");
        }
        blocked
    }
}
