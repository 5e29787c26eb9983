use std::collections::BTreeMap;
use std::path::PathBuf;

use dlcscan_steam::AppInfo;
use serde::{Deserialize, Serialize};

/// Where the UI gets an application's icon from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IconRef {
    /// Icon embedded in a local executable.
    Executable { path: PathBuf },
    /// Static ids of the store icons.
    Remote {
        icon: Option<String>,
        client_icon: Option<String>,
    },
}

/// A discovered application together with the user's choices for it.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionEntry {
    pub id: u32,
    pub name: String,
    pub root_directory: PathBuf,
    pub integration_directories: Vec<PathBuf>,
    pub enabled: bool,
    /// False when the latest scan did not find this application.
    pub usable: bool,
    pub icon: Option<IconRef>,
    #[serde(skip)]
    pub app_info: Option<AppInfo>,
    all_addable: BTreeMap<u32, String>,
    selected_addable: BTreeMap<u32, String>,
}

impl SelectionEntry {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            root_directory: PathBuf::new(),
            integration_directories: Vec::new(),
            enabled: false,
            usable: false,
            icon: None,
            app_info: None,
            all_addable: BTreeMap::new(),
            selected_addable: BTreeMap::new(),
        }
    }

    pub fn all_addable(&self) -> &BTreeMap<u32, String> {
        &self.all_addable
    }

    pub fn selected_addable(&self) -> &BTreeMap<u32, String> {
        &self.selected_addable
    }

    pub fn is_addable_selected(&self, addable_id: u32) -> bool {
        self.selected_addable.contains_key(&addable_id)
    }

    /// True when the entry and every one of its addables are checked.
    pub fn fully_checked(&self) -> bool {
        self.enabled && self.selected_addable.len() == self.all_addable.len()
    }

    pub(crate) fn merge_addable(&mut self, addable: BTreeMap<u32, String>, select_new: bool) {
        for (id, name) in addable {
            let is_new = self.all_addable.insert(id, name.clone()).is_none();
            if let Some(selected) = self.selected_addable.get_mut(&id) {
                *selected = name;
            } else if is_new && select_new {
                self.selected_addable.insert(id, name);
            }
        }
    }

    pub(crate) fn toggle_addable(&mut self, addable_id: u32, value: bool) -> bool {
        let Some(name) = self.all_addable.get(&addable_id) else {
            return false;
        };
        if value {
            self.selected_addable.insert(addable_id, name.clone());
        } else {
            self.selected_addable.remove(&addable_id);
        }
        self.enabled = !self.selected_addable.is_empty();
        true
    }

    pub(crate) fn toggle_all_addable(&mut self, value: bool) {
        if value {
            self.selected_addable = self.all_addable.clone();
        } else {
            self.selected_addable.clear();
        }
        self.enabled = if self.all_addable.is_empty() {
            value
        } else {
            !self.selected_addable.is_empty()
        };
    }
}

/// Everything one discovery unit learned about an application.
#[derive(Debug, Clone)]
pub struct SelectionDelta {
    pub id: u32,
    pub name: String,
    pub root_directory: PathBuf,
    pub integration_directories: Vec<PathBuf>,
    pub app_info: Option<AppInfo>,
    pub icon: Option<IconRef>,
    pub addable: BTreeMap<u32, String>,
}
