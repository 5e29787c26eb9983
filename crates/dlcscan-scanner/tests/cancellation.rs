mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dlcscan_scanner::selection::SelectionRegistry;
use dlcscan_scanner::steam::{AppInfo, AppInfoCache, MetadataClient};
use dlcscan_scanner::{CancelToken, Discovery, Outcome};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use support::{dump, Fixture};

/// Trips the cancel token on the n-th lookup and records the registry as it was at that moment.
struct TripWire {
    inner: AppInfoCache,
    calls: AtomicUsize,
    trip_at: usize,
    cancel: CancelToken,
    registry: Arc<SelectionRegistry>,
    frozen: Mutex<Option<serde_json::Value>>,
}

impl MetadataClient for TripWire {
    fn app_info(&self, id: u32, branch: Option<&str>, build_id: Option<u32>) -> Option<AppInfo> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.trip_at {
            self.cancel.cancel();
            *self.frozen.lock() = Some(dump(&self.registry));
        }
        self.inner.app_info(id, branch, build_id)
    }
}

fn populated() -> Fixture {
    let fixture = Fixture::new();
    for game in 0..4u32 {
        let id = 1000 + game * 10;
        let name = format!("Game {game}");
        fixture.install(id, &name, 1);
        let dlc: Vec<(u32, String)> = (1..=3)
            .map(|offset| (id + offset, format!("{name} DLC {offset}")))
            .collect();
        let dlc: Vec<(u32, &str)> = dlc.iter().map(|(id, name)| (*id, name.as_str())).collect();
        fixture.app_info(id, &name, 1, &dlc);
    }
    fixture
}

#[test]
fn no_registry_write_happens_after_cancellation() {
    let fixture = populated();
    let lookups = 4 + 4 * 3;
    for round in 0..2 {
        for trip_at in 1..=lookups {
            let registry = SelectionRegistry::new().shared();
            let cancel = CancelToken::new();
            let wire = Arc::new(TripWire {
                inner: AppInfoCache::new(fixture.cache()),
                calls: AtomicUsize::new(0),
                trip_at,
                cancel: cancel.clone(),
                registry: Arc::clone(&registry),
                frozen: Mutex::new(None),
            });
            let mut options = fixture.options();
            options.select_all_new = true;
            let discovery = Discovery::new(options, Arc::clone(&wire) as Arc<dyn MetadataClient>);

            let report = discovery.run(&registry, &cancel).unwrap();
            assert_eq!(report.outcome, Outcome::Cancelled, "round {round}, trip {trip_at}");
            let frozen = wire.frozen.lock().take().expect("token was tripped");
            assert_eq!(dump(&registry), frozen, "round {round}, trip {trip_at}");
        }
    }
}

#[test]
fn cancelled_rescan_keeps_earlier_results() {
    let fixture = populated();
    let registry = SelectionRegistry::new().shared();
    fixture
        .discovery(fixture.options())
        .run(&registry, &CancelToken::new())
        .unwrap();
    assert_eq!(registry.len(), 4);
    assert!(registry.toggle_addable(1000, 1001, true));
    let before = dump(&registry);

    let cancel = CancelToken::new();
    let wire = Arc::new(TripWire {
        inner: AppInfoCache::new(fixture.cache()),
        calls: AtomicUsize::new(0),
        trip_at: 1,
        cancel: cancel.clone(),
        registry: Arc::clone(&registry),
        frozen: Mutex::new(None),
    });
    let report = Discovery::new(fixture.options(), wire)
        .run(&registry, &cancel)
        .unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.applied, 0);
    assert!(!registry.is_empty());
    assert_eq!(registry.usable().len(), 4);
    assert_eq!(registry.usable_enabled().len(), 1);
    assert_eq!(dump(&registry), before);
}
