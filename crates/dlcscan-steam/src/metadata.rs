use std::io;
use std::sync::Arc;

use dlcscan_vdf::{Property, Value};

/// Handle onto the cached app-info document of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    root: Arc<Property>,
}

impl AppInfo {
    pub fn new(root: Property) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Value {
        &self.root.value
    }

    pub fn name(&self) -> Option<&str> {
        self.root().get("common")?.non_blank("name")
    }

    pub fn icon(&self) -> Option<&str> {
        self.root().get("common")?.non_blank("icon")
    }

    pub fn client_icon(&self) -> Option<&str> {
        self.root().get("common")?.non_blank("clienticon")
    }

    pub fn publisher(&self) -> Option<&str> {
        self.root().get("extended")?.non_blank("publisher")
    }

    /// Build currently published on `branch`.
    pub fn build_id(&self, branch: &str) -> Option<u32> {
        self.root()
            .get_path(&["depots", "branches", branch])?
            .parse("buildid")
    }

    /// DLC ids listed in `extended.listofdlc` followed by every `depots.*.dlcappid`,
    /// without duplicates.
    pub fn listed_addable_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        let mut push = |id: u32| {
            if !ids.contains(&id) {
                ids.push(id);
            }
        };
        if let Some(list) = self
            .root()
            .get("extended")
            .and_then(|extended| extended.str("listofdlc"))
        {
            list.split(',')
                .filter_map(|id| id.trim().parse().ok())
                .for_each(&mut push);
        }
        if let Some(depots) = self.root().get("depots") {
            depots
                .children()
                .iter()
                .filter_map(|depot| depot.value.parse("dlcappid"))
                .for_each(&mut push);
        }
        ids
    }
}

/// Source of app-info metadata; shared by every discovery worker.
///
/// Implementations must tolerate concurrent identical requests. A `None`
/// result means the id is unknown or the lookup failed, which only excludes
/// that application.
pub trait MetadataClient: Send + Sync {
    /// Creates whatever working state the client needs before a run.
    fn prepare(&self) -> io::Result<()> {
        Ok(())
    }

    fn app_info(&self, id: u32, branch: Option<&str>, build_id: Option<u32>) -> Option<AppInfo>;

    fn addable_ids(&self, info: &AppInfo) -> Vec<u32> {
        info.listed_addable_ids()
    }
}

impl<T: MetadataClient + ?Sized> MetadataClient for Arc<T> {
    fn prepare(&self) -> io::Result<()> {
        (**self).prepare()
    }

    fn app_info(&self, id: u32, branch: Option<&str>, build_id: Option<u32>) -> Option<AppInfo> {
        (**self).app_info(id, branch, build_id)
    }

    fn addable_ids(&self, info: &AppInfo) -> Vec<u32> {
        (**self).addable_ids(info)
    }
}
