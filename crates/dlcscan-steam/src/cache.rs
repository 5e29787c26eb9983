use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::metadata::{AppInfo, MetadataClient};

/// File-backed app-info cache reading `<dir>/appinfo/<id>.vdf` dumps.
///
/// Results, including misses, are memoized for the lifetime of the cache. No
/// lock is held while a dump is read from disk, so two workers asking for the
/// same id may both read it; the second insert simply wins.
#[derive(Debug)]
pub struct AppInfoCache {
    dir: PathBuf,
    entries: RwLock<HashMap<u32, Option<AppInfo>>>,
}

impl AppInfoCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("dlcscan"))
    }

    pub fn path_for(&self, id: u32) -> PathBuf {
        self.dir.join("appinfo").join(format!("{id}.vdf"))
    }

    /// Stores a fresh app-info dump and forgets any memoized result for `id`.
    pub fn store(&self, id: u32, text: &str) -> io::Result<()> {
        let path = self.path_for(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        self.entries.write().remove(&id);
        Ok(())
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn load(&self, id: u32) -> Option<AppInfo> {
        let path = self.path_for(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(id, path = %path.display(), %err, "no cached app info");
                return None;
            }
        };
        let roots = match dlcscan_vdf::parse_document(&raw) {
            Ok(roots) => roots,
            Err(err) => {
                tracing::debug!(id, %err, "cached app info is malformed");
                return None;
            }
        };
        let key = id.to_string();
        let root = roots
            .iter()
            .find(|root| root.key == key)
            .or_else(|| roots.first())
            .cloned()?;
        Some(AppInfo::new(root))
    }
}

impl MetadataClient for AppInfoCache {
    /// Creates the working directory; failure here aborts the whole run.
    fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(self.dir.join("appinfo"))
    }

    fn app_info(&self, id: u32, branch: Option<&str>, build_id: Option<u32>) -> Option<AppInfo> {
        let memoized = self.entries.read().get(&id).cloned();
        let info = match memoized {
            Some(info) => info,
            None => {
                let loaded = self.load(id);
                self.entries.write().insert(id, loaded.clone());
                loaded
            }
        }?;
        if let Some(requested) = build_id {
            let branch = branch.filter(|branch| !branch.is_empty()).unwrap_or("public");
            if let Some(cached) = info.build_id(branch) {
                if cached < requested {
                    tracing::warn!(id, branch, cached, requested, "cached app info is stale");
                    return None;
                }
            }
        }
        Some(info)
    }
}
