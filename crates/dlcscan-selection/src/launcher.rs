use std::collections::BTreeMap;

use dlcscan_steam::LAUNCHER_PUBLISHER;
use serde::Serialize;

use crate::entry::SelectionEntry;
use crate::registry::SelectionRegistry;

/// A game whose DLC gets added to the launcher's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LauncherExtra {
    pub id: u32,
    pub name: String,
    pub addable: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherCheck {
    /// The launcher was not found or is not enabled.
    NotApplicable,
    Ready(Vec<LauncherExtra>),
    /// The launcher is enabled but no installed game can contribute DLC.
    NothingToAdd,
}

impl SelectionRegistry {
    /// Games from the launcher's publisher, with the DLC to configure for them.
    ///
    /// Prefers enabled games with their selected DLC and falls back to every
    /// usable game with all of its DLC.
    pub fn launcher_extras(&self) -> Vec<LauncherExtra> {
        let Some(launcher) = self.get(0) else {
            return Vec::new();
        };
        let from_publisher = |entry: &SelectionEntry| {
            entry.name != launcher.name
                && entry
                    .app_info
                    .as_ref()
                    .and_then(|info| info.publisher())
                    == Some(LAUNCHER_PUBLISHER)
        };
        let extras: Vec<_> = self
            .usable_enabled()
            .into_iter()
            .filter(|entry| from_publisher(entry))
            .map(|entry| LauncherExtra {
                id: entry.id,
                addable: entry.selected_addable().clone(),
                name: entry.name,
            })
            .collect();
        if !extras.is_empty() {
            return extras;
        }
        self.usable()
            .into_iter()
            .filter(|entry| from_publisher(entry))
            .map(|entry| LauncherExtra {
                id: entry.id,
                addable: entry.all_addable().clone(),
                name: entry.name,
            })
            .collect()
    }

    pub fn launcher_check(&self) -> LauncherCheck {
        match self.get(0) {
            Some(launcher) if launcher.usable && launcher.enabled => {
                let extras = self.launcher_extras();
                if extras.is_empty() {
                    LauncherCheck::NothingToAdd
                } else {
                    LauncherCheck::Ready(extras)
                }
            }
            _ => LauncherCheck::NotApplicable,
        }
    }
}
