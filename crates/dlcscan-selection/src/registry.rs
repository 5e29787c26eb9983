use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dlcscan_utils::CancelToken;
use parking_lot::RwLock;
use serde::Serialize;

use crate::entry::{SelectionDelta, SelectionEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Serializable copy of the registry, ordered by id.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub entries: Vec<SelectionEntry>,
}

/// All selection entries keyed by application id.
///
/// Every mutation happens under one write lock, so readers only ever see
/// whole entries. Entries are never removed; a re-scan that no longer finds
/// an application only clears its `usable` flag.
#[derive(Debug, Default)]
pub struct SelectionRegistry {
    entries: RwLock<BTreeMap<u32, SelectionEntry>>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shareable handle that can be cloned across threads.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Marks every entry the finished scan did not report as unusable.
    ///
    /// Like [`upsert_unless_cancelled`](Self::upsert_unless_cancelled), nothing
    /// is written once `cancel` has tripped, so an interrupted re-scan keeps the
    /// flags of the previous one. Returns whether the flags were updated.
    pub fn finish_scan(&self, seen: &HashSet<u32>, cancel: &CancelToken) -> bool {
        let mut entries = self.entries.write();
        if cancel.is_cancelled() {
            return false;
        }
        for entry in entries.values_mut() {
            if !seen.contains(&entry.id) {
                entry.usable = false;
            }
        }
        true
    }

    /// Creates or refreshes the entry described by `delta`.
    ///
    /// Existing `enabled` and selected addables are kept, addables are only
    /// ever added, and with `select_all_new` the entry is enabled and newly
    /// seen addables are selected.
    pub fn upsert(&self, delta: SelectionDelta, select_all_new: bool) -> Upsert {
        let mut entries = self.entries.write();
        Self::upsert_locked(&mut entries, delta, select_all_new)
    }

    /// Same as [`upsert`](Self::upsert), but checks `cancel` while holding the
    /// write lock and drops the delta once cancellation has been requested.
    pub fn upsert_unless_cancelled(
        &self,
        delta: SelectionDelta,
        select_all_new: bool,
        cancel: &CancelToken,
    ) -> Option<Upsert> {
        let mut entries = self.entries.write();
        if cancel.is_cancelled() {
            return None;
        }
        Some(Self::upsert_locked(&mut entries, delta, select_all_new))
    }

    fn upsert_locked(
        entries: &mut BTreeMap<u32, SelectionEntry>,
        delta: SelectionDelta,
        select_all_new: bool,
    ) -> Upsert {
        let mut outcome = Upsert::Updated;
        let entry = entries.entry(delta.id).or_insert_with(|| {
            outcome = Upsert::Created;
            SelectionEntry::new(delta.id)
        });
        entry.usable = true;
        entry.name = delta.name;
        entry.root_directory = delta.root_directory;
        entry.integration_directories = delta.integration_directories;
        entry.app_info = delta.app_info;
        if entry.icon.is_none() {
            entry.icon = delta.icon;
        }
        if select_all_new {
            entry.enabled = true;
        }
        entry.merge_addable(delta.addable, select_all_new);
        tracing::debug!(id = entry.id, name = %entry.name, ?outcome, "selection entry upserted");
        outcome
    }

    pub fn toggle_enabled(&self, id: u32, value: bool) -> bool {
        match self.entries.write().get_mut(&id) {
            Some(entry) => {
                entry.enabled = value;
                true
            }
            None => false,
        }
    }

    /// Selects or deselects one addable; ids the entry does not know are ignored.
    pub fn toggle_addable(&self, id: u32, addable_id: u32, value: bool) -> bool {
        self.entries
            .write()
            .get_mut(&id)
            .map(|entry| entry.toggle_addable(addable_id, value))
            .unwrap_or(false)
    }

    pub fn toggle_all_addable(&self, id: u32, value: bool) -> bool {
        match self.entries.write().get_mut(&id) {
            Some(entry) => {
                entry.toggle_all_addable(value);
                true
            }
            None => false,
        }
    }

    /// Checks or unchecks every usable entry together with its addables.
    pub fn set_all(&self, value: bool) {
        for entry in self.entries.write().values_mut() {
            if !entry.usable {
                continue;
            }
            if entry.all_addable().is_empty() {
                entry.enabled = value;
            } else {
                entry.toggle_all_addable(value);
            }
        }
    }

    pub fn get(&self, id: u32) -> Option<SelectionEntry> {
        self.entries.read().get(&id).cloned()
    }

    pub fn entries(&self) -> Vec<SelectionEntry> {
        self.entries.read().values().cloned().collect()
    }

    pub fn usable(&self) -> Vec<SelectionEntry> {
        self.filtered(|entry| entry.usable)
    }

    pub fn usable_enabled(&self) -> Vec<SelectionEntry> {
        self.filtered(|entry| entry.usable && entry.enabled)
    }

    fn filtered(&self, keep: impl Fn(&SelectionEntry) -> bool) -> Vec<SelectionEntry> {
        self.entries
            .read()
            .values()
            .filter(|entry| keep(entry))
            .cloned()
            .collect()
    }

    /// True when no usable application is known, which the UI shows as "none found".
    pub fn is_empty(&self) -> bool {
        !self.entries.read().values().any(|entry| entry.usable)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn all_checked(&self) -> bool {
        let entries = self.entries.read();
        let mut usable = entries.values().filter(|entry| entry.usable).peekable();
        usable.peek().is_some() && usable.all(SelectionEntry::fully_checked)
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entries: self.entries(),
        }
    }
}
