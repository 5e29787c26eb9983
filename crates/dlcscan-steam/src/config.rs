use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the library directory below the Steam install and every extra library root.
pub const LIBRARY_DIR: &str = "steamapps";
/// Cross-reference file listing additional library roots.
pub const LIBRARY_FOLDERS_FILE: &str = "libraryfolders.vdf";
/// Extension of `appmanifest_<id>.acf` files.
pub const MANIFEST_EXTENSION: &str = "acf";
/// Directory below a library that holds the installed applications.
pub const COMMON_DIR: &str = "common";
/// Files marking a directory as a Steamworks integration target.
pub const DEFAULT_MARKERS: [&str; 2] = ["steam_api.dll", "steam_api64.dll"];
/// Display name of the launcher pseudo-application seeded with id 0.
pub const LAUNCHER_NAME: &str = "Paradox Launcher";
/// Launcher executable carrying the icon, relative to the launcher root.
pub const LAUNCHER_EXECUTABLE: &str = "launcher/bootstrapper-v2.exe";
/// Publisher whose games can be added to the launcher configuration.
pub const LAUNCHER_PUBLISHER: &str = "Paradox Interactive";

/// Where the Steam installation and the launcher live on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamConfig {
    /// Checked first for the Steam install path.
    pub primary_install: Option<PathBuf>,
    /// Compatibility location checked when the primary one does not exist.
    pub secondary_install: Option<PathBuf>,
    pub launcher_root: Option<PathBuf>,
}

impl Default for SteamConfig {
    fn default() -> Self {
        let (primary_install, secondary_install) = default_install_paths();
        Self {
            primary_install,
            secondary_install,
            launcher_root: dirs::data_local_dir()
                .map(|dir| dir.join("Programs").join(LAUNCHER_PUBLISHER)),
        }
    }
}

impl SteamConfig {
    /// First configured install path that resolves to an existing directory.
    pub fn install_dir(&self) -> Option<PathBuf> {
        [&self.primary_install, &self.secondary_install]
            .into_iter()
            .flatten()
            .find(|path| path.is_dir())
            .cloned()
    }

    pub fn launcher_dir(&self) -> Option<PathBuf> {
        self.launcher_root.clone().filter(|path| path.is_dir())
    }
}

#[cfg(target_os = "windows")]
fn default_install_paths() -> (Option<PathBuf>, Option<PathBuf>) {
    let x86 = std::env::var_os("ProgramFiles(x86)")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));
    let native = std::env::var_os("ProgramFiles")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
    (Some(x86.join("Steam")), Some(native.join("Steam")))
}

#[cfg(target_os = "macos")]
fn default_install_paths() -> (Option<PathBuf>, Option<PathBuf>) {
    let home = dirs::home_dir();
    (
        home.as_ref()
            .map(|home| home.join("Library/Application Support/Steam")),
        dirs::data_dir().map(|dir| dir.join("Steam")),
    )
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_install_paths() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        dirs::home_dir().map(|home| home.join(".steam").join("steam")),
        dirs::data_local_dir().map(|dir| dir.join("Steam")),
    )
}
