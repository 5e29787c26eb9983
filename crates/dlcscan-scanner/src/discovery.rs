use std::collections::{BTreeMap, HashSet};
use std::io;
use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use dlcscan_selection::{IconRef, SelectionDelta, SelectionRegistry};
use dlcscan_steam::{
    locate_components, locate_libraries, scan_library, Candidate, Exclusion, MetadataClient,
    LAUNCHER_EXECUTABLE,
};
use dlcscan_utils::{CancelToken, SpanTimer};
use parking_lot::Mutex;
use thiserror::Error;

use crate::options::DiscoveryOptions;
use crate::progress::{Progress, ProgressReporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    Cancelled,
}

/// Phase of the current (or last) discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryState {
    #[default]
    Idle,
    LocatingLibraries,
    ScanningManifests,
    FanningOutCandidates,
    AggregatingAddables,
    Settled(Outcome),
}

#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    State(DiscoveryState),
    Progress(Progress),
    /// A fully resolved application, published once all of its DLC lookups finished.
    Entry(SelectionDelta),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to prepare metadata client: {source}")]
    Setup {
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub outcome: Outcome,
    pub libraries: usize,
    pub candidates: usize,
    /// Deltas written to the registry.
    pub applied: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct Found {
    libraries: usize,
    candidates: usize,
}

/// Finds installed applications and their DLC and feeds them into a registry.
///
/// A run has one producer and one consumer. The producer walks libraries and
/// spawns a scoped worker per candidate, each with a nested scoped worker per
/// DLC; finished candidates are sent as [`DiscoveryEvent::Entry`]. The calling
/// thread consumes the events and applies them, refusing every write once the
/// cancel token has tripped.
pub struct Discovery {
    options: DiscoveryOptions,
    metadata: Arc<dyn MetadataClient>,
    exclusions: Vec<Arc<dyn Exclusion>>,
    state: Arc<Mutex<DiscoveryState>>,
}

impl Discovery {
    pub fn new(options: DiscoveryOptions, metadata: Arc<dyn MetadataClient>) -> Self {
        let mut exclusions: Vec<Arc<dyn Exclusion>> = Vec::new();
        if options.block_protected {
            exclusions.push(Arc::new(options.block_list.clone()));
        }
        Self {
            options,
            metadata,
            exclusions,
            state: Arc::new(Mutex::new(DiscoveryState::Idle)),
        }
    }

    /// Adds a predicate that removes candidates before any per-candidate work starts.
    pub fn with_exclusion(mut self, exclusion: impl Exclusion + 'static) -> Self {
        self.exclusions.push(Arc::new(exclusion));
        self
    }

    pub fn state(&self) -> DiscoveryState {
        *self.state.lock()
    }

    pub fn run(
        &self,
        registry: &SelectionRegistry,
        cancel: &CancelToken,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        self.run_with(registry, cancel, |_| {})
    }

    /// Runs discovery to completion, passing every event to `observer` after it was applied.
    pub fn run_with(
        &self,
        registry: &SelectionRegistry,
        cancel: &CancelToken,
        mut observer: impl FnMut(&DiscoveryEvent),
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let timer = SpanTimer::new("discovery");
        self.metadata
            .prepare()
            .map_err(|source| DiscoveryError::Setup { source })?;

        let mut applied = 0;
        let mut seen = HashSet::new();
        let found = if cancel.is_cancelled() {
            Found::default()
        } else {
            let (events, inbox) = crossbeam_channel::unbounded();
            let select_all_new = self.options.select_all_new;
            let producer_result = thread::scope(|scope| {
                let producer = scope.spawn(move || self.produce(events, cancel));
                for event in inbox.iter() {
                    if let DiscoveryEvent::Entry(delta) = &event {
                        if registry
                            .upsert_unless_cancelled(delta.clone(), select_all_new, cancel)
                            .is_some()
                        {
                            applied += 1;
                            seen.insert(delta.id);
                        }
                    }
                    observer(&event);
                }
                producer.join()
            });
            producer_result.unwrap_or_else(|payload| panic::resume_unwind(payload))
        };

        let outcome = if !cancel.is_cancelled() && registry.finish_scan(&seen, cancel) {
            Outcome::Complete
        } else {
            Outcome::Cancelled
        };
        let settled = DiscoveryState::Settled(outcome);
        *self.state.lock() = settled;
        observer(&DiscoveryEvent::State(settled));

        let elapsed = timer.finish();
        tracing::info!(
            ?outcome,
            libraries = found.libraries,
            candidates = found.candidates,
            applied,
            ?elapsed,
            "discovery settled"
        );
        Ok(DiscoveryReport {
            outcome,
            libraries: found.libraries,
            candidates: found.candidates,
            applied,
            elapsed,
        })
    }

    /// Runs discovery on a background thread.
    pub fn spawn(
        self: Arc<Self>,
        registry: Arc<SelectionRegistry>,
        cancel: CancelToken,
    ) -> DiscoveryHandle {
        let (forward, events) = crossbeam_channel::unbounded();
        let state = Arc::clone(&self.state);
        let worker_cancel = cancel.clone();
        let worker = thread::spawn(move || {
            self.run_with(&registry, &worker_cancel, |event| {
                let _ = forward.send(event.clone());
            })
        });
        DiscoveryHandle {
            events,
            cancel,
            state,
            worker,
        }
    }

    fn enter(&self, state: DiscoveryState, events: &Sender<DiscoveryEvent>) {
        tracing::info!(?state, "discovery phase");
        *self.state.lock() = state;
        let _ = events.send(DiscoveryEvent::State(state));
    }

    fn produce(&self, events: Sender<DiscoveryEvent>, cancel: &CancelToken) -> Found {
        let mut found = Found::default();
        self.enter(DiscoveryState::LocatingLibraries, &events);
        let mut candidates = Vec::new();
        if let Some(root) = self.options.steam.launcher_dir() {
            candidates.push(Candidate::launcher(root));
        }
        let libraries = locate_libraries(&self.options.steam, cancel);
        found.libraries = libraries.len();
        if cancel.is_cancelled() {
            return found;
        }

        self.enter(DiscoveryState::ScanningManifests, &events);
        for library in &libraries {
            if cancel.is_cancelled() {
                return found;
            }
            if let Some(scanned) = scan_library(library, cancel) {
                candidates.extend(scanned);
            }
        }
        let mut seen = HashSet::new();
        candidates.retain(|candidate| seen.insert(candidate.id));
        candidates.retain(|candidate| {
            !self
                .exclusions
                .iter()
                .any(|exclusion| exclusion.excludes(candidate))
        });
        found.candidates = candidates.len();
        if cancel.is_cancelled() {
            return found;
        }

        self.enter(DiscoveryState::FanningOutCandidates, &events);
        let progress = ProgressReporter::new(events.clone());
        let progress = &progress;
        let events = &events;
        thread::scope(|scope| {
            for candidate in &candidates {
                if cancel.is_cancelled() {
                    break;
                }
                progress.add_units(1);
                scope.spawn(move || {
                    if let Some(delta) = self.resolve(candidate, progress, cancel) {
                        let _ = events.send(DiscoveryEvent::Entry(delta));
                    }
                    progress.complete_unit();
                });
            }
            if !cancel.is_cancelled() {
                self.enter(DiscoveryState::AggregatingAddables, events);
            }
        });
        if !cancel.is_cancelled() {
            progress.finish();
        }
        found
    }

    fn resolve(
        &self,
        candidate: &Candidate,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Option<SelectionDelta> {
        if cancel.is_cancelled() {
            return None;
        }
        let integration_directories =
            locate_components(&candidate.install_dir, &self.options.markers, cancel)?;

        let (app_info, icon, addable) = if candidate.is_launcher() {
            let icon = IconRef::Executable {
                path: candidate.install_dir.join(LAUNCHER_EXECUTABLE),
            };
            (None, icon, BTreeMap::new())
        } else {
            if cancel.is_cancelled() {
                return None;
            }
            let Some(info) = self.metadata.app_info(
                candidate.id,
                Some(&candidate.branch),
                Some(candidate.build_id),
            ) else {
                tracing::debug!(id = candidate.id, name = %candidate.name, "no app info, skipping");
                return None;
            };
            if cancel.is_cancelled() {
                return None;
            }
            let ids = self.metadata.addable_ids(&info);
            if ids.is_empty() {
                tracing::debug!(id = candidate.id, name = %candidate.name, "no DLC, skipping");
                return None;
            }
            let addable = self.resolve_addable(ids, progress, cancel);
            let icon = IconRef::Remote {
                icon: info.icon().map(str::to_string),
                client_icon: info.client_icon().map(str::to_string),
            };
            (Some(info), icon, addable)
        };

        if cancel.is_cancelled() || candidate.name.trim().is_empty() {
            return None;
        }
        Some(SelectionDelta {
            id: candidate.id,
            name: candidate.name.clone(),
            root_directory: candidate.install_dir.clone(),
            integration_directories,
            app_info,
            icon: Some(icon),
            addable,
        })
    }

    fn resolve_addable(
        &self,
        ids: Vec<u32>,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> BTreeMap<u32, String> {
        let delay = self.options.spawn_delay();
        thread::scope(|scope| {
            let mut lookups = Vec::with_capacity(ids.len());
            for (index, addable_id) in ids.into_iter().enumerate() {
                if cancel.is_cancelled() {
                    break;
                }
                if index > 0 && !delay.is_zero() {
                    thread::sleep(delay);
                }
                progress.add_units(1);
                lookups.push(scope.spawn(move || {
                    let name = if cancel.is_cancelled() {
                        None
                    } else {
                        self.addable_name(addable_id)
                    };
                    progress.complete_unit();
                    name.map(|name| (addable_id, name))
                }));
            }
            lookups
                .into_iter()
                .filter_map(|lookup| {
                    lookup
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    fn addable_name(&self, addable_id: u32) -> Option<String> {
        let info = self.metadata.app_info(addable_id, None, None)?;
        match info.name().map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => Some(name.to_string()),
            None => {
                tracing::debug!(addable_id, "DLC has no name, skipping");
                None
            }
        }
    }
}

/// Background discovery run started by [`Discovery::spawn`].
pub struct DiscoveryHandle {
    events: Receiver<DiscoveryEvent>,
    cancel: CancelToken,
    state: Arc<Mutex<DiscoveryState>>,
    worker: JoinHandle<Result<DiscoveryReport, DiscoveryError>>,
}

impl DiscoveryHandle {
    /// Events in the order they were applied; the channel closes when the run ends.
    pub fn events(&self) -> &Receiver<DiscoveryEvent> {
        &self.events
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> DiscoveryState {
        *self.state.lock()
    }

    pub fn join(self) -> Result<DiscoveryReport, DiscoveryError> {
        self.worker
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload))
    }
}
