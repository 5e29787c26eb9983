#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dlcscan_scanner::selection::SelectionRegistry;
use dlcscan_scanner::steam::{AppInfoCache, MetadataClient, SteamConfig};
use dlcscan_scanner::{Discovery, DiscoveryOptions};
use dlcscan_vdf::Property;
use tempfile::TempDir;

/// A throwaway Steam installation plus an app-info cache next to it.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(fixture.library()).unwrap();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn steam(&self) -> PathBuf {
        self.root().join("Steam")
    }

    pub fn library(&self) -> PathBuf {
        self.steam().join("steamapps")
    }

    pub fn cache(&self) -> PathBuf {
        self.root().join("cache")
    }

    pub fn launcher(&self) -> PathBuf {
        self.root().join("Paradox Interactive")
    }

    /// Creates `<root>/<name>/steamapps` and returns the library root (without `steamapps`).
    pub fn extra_library_root(&self, name: &str) -> PathBuf {
        let root = self.root().join(name);
        fs::create_dir_all(root.join("steamapps")).unwrap();
        root
    }

    pub fn write_library_folders(&self, roots: &[&Path]) {
        let folders = roots
            .iter()
            .enumerate()
            .map(|(index, root)| {
                Property::branch(
                    index.to_string(),
                    vec![Property::leaf("path", root.display().to_string())],
                )
            })
            .collect();
        let document = Property::branch("libraryfolders", folders);
        fs::write(self.library().join("libraryfolders.vdf"), document.to_vdf()).unwrap();
    }

    /// Installs a game with a Steamworks DLL into `library` (a `steamapps` directory).
    pub fn install_into(&self, library: &Path, id: u32, name: &str, build: u32) -> PathBuf {
        let install_dir = format!("{name} Dir");
        let game = library.join("common").join(&install_dir);
        fs::create_dir_all(game.join("bin")).unwrap();
        fs::write(game.join("bin").join("steam_api64.dll"), b"").unwrap();
        let manifest = Property::branch(
            "AppState",
            vec![
                Property::leaf("appid", id.to_string()),
                Property::leaf("name", name),
                Property::leaf("installdir", install_dir),
                Property::leaf("buildid", build.to_string()),
            ],
        );
        fs::write(
            library.join(format!("appmanifest_{id}.acf")),
            manifest.to_vdf(),
        )
        .unwrap();
        game
    }

    pub fn install(&self, id: u32, name: &str, build: u32) -> PathBuf {
        self.install_into(&self.library(), id, name, build)
    }

    pub fn uninstall(&self, id: u32) {
        fs::remove_file(self.library().join(format!("appmanifest_{id}.acf"))).unwrap();
    }

    pub fn install_launcher(&self) {
        let launcher = self.launcher().join("launcher");
        fs::create_dir_all(&launcher).unwrap();
        fs::write(launcher.join("bootstrapper-v2.exe"), b"").unwrap();
        fs::write(launcher.join("steam_api64.dll"), b"").unwrap();
    }

    /// Writes the cached app-info dump for a game and one per DLC.
    pub fn app_info(&self, id: u32, name: &str, build: u32, dlc: &[(u32, &str)]) {
        self.app_info_with(id, name, build, dlc, None);
    }

    pub fn app_info_with(
        &self,
        id: u32,
        name: &str,
        build: u32,
        dlc: &[(u32, &str)],
        publisher: Option<&str>,
    ) {
        let list = dlc
            .iter()
            .map(|(id, _)| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut extended = vec![Property::leaf("listofdlc", list)];
        if let Some(publisher) = publisher {
            extended.push(Property::leaf("publisher", publisher));
        }
        let dump = Property::branch(
            id.to_string(),
            vec![
                Property::branch(
                    "common",
                    vec![
                        Property::leaf("name", name),
                        Property::leaf("icon", format!("icon{id}")),
                        Property::leaf("clienticon", format!("client{id}")),
                    ],
                ),
                Property::branch("extended", extended),
                Property::branch(
                    "depots",
                    vec![Property::branch(
                        "branches",
                        vec![Property::branch(
                            "public",
                            vec![Property::leaf("buildid", build.to_string())],
                        )],
                    )],
                ),
            ],
        );
        let cache = AppInfoCache::new(self.cache());
        cache.store(id, &dump.to_vdf()).unwrap();
        for (dlc_id, dlc_name) in dlc {
            let dump = Property::branch(
                dlc_id.to_string(),
                vec![Property::branch(
                    "common",
                    vec![Property::leaf("name", *dlc_name)],
                )],
            );
            cache.store(*dlc_id, &dump.to_vdf()).unwrap();
        }
    }

    pub fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            steam: SteamConfig {
                primary_install: Some(self.steam()),
                secondary_install: None,
                launcher_root: Some(self.launcher()),
            },
            spawn_delay_ms: 0,
            cache_dir: Some(self.cache()),
            ..DiscoveryOptions::default()
        }
    }

    /// A discovery reading a fresh cache, so dumps written since the last run are seen.
    pub fn discovery(&self, options: DiscoveryOptions) -> Discovery {
        let client: Arc<dyn MetadataClient> = Arc::new(AppInfoCache::new(self.cache()));
        Discovery::new(options, client)
    }
}

/// Registry contents as JSON, which covers every serialized field of every entry.
pub fn dump(registry: &SelectionRegistry) -> serde_json::Value {
    serde_json::to_value(registry.snapshot()).unwrap()
}
