// ── Device store ──
//
// Holds the latest poll snapshot plus the slower-moving mode and preset
// tables. Snapshots publish through a `watch` channel so subscribers only
// ever see whole cycles; the tables sit behind `ArcSwap` and are replaced,
// never edited.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Mode, Preset, PresetCatalog, Snapshot};
use frontier_api::DeviceInfo;

pub struct DeviceStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
    last_poll: watch::Sender<Option<DateTime<Utc>>>,
    modes: ArcSwap<Vec<Mode>>,
    presets: ArcSwap<BTreeMap<String, Vec<Preset>>>,
    device_info: ArcSwap<DeviceInfo>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::unavailable()));
        let (last_poll, _) = watch::channel(None);
        Self {
            snapshot,
            last_poll,
            modes: ArcSwap::from_pointee(Vec::new()),
            presets: ArcSwap::from_pointee(BTreeMap::new()),
            device_info: ArcSwap::from_pointee(DeviceInfo::default()),
        }
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Replace the current snapshot. Receivers are notified even when the
    /// new snapshot equals the old one; a completed cycle is news too.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(Arc::clone(&snapshot));
        self.last_poll.send_replace(Some(Utc::now()));
        snapshot
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        *self.last_poll.borrow()
    }

    // ── Tables ───────────────────────────────────────────────────────

    pub fn modes(&self) -> Arc<Vec<Mode>> {
        self.modes.load_full()
    }

    pub(crate) fn set_modes(&self, modes: Vec<Mode>) {
        self.modes.store(Arc::new(modes));
    }

    pub fn presets(&self) -> Arc<BTreeMap<String, Vec<Preset>>> {
        self.presets.load_full()
    }

    pub(crate) fn set_presets(&self, presets: BTreeMap<String, Vec<Preset>>) {
        self.presets.store(Arc::new(presets));
    }

    pub fn device_info(&self) -> Arc<DeviceInfo> {
        self.device_info.load_full()
    }

    pub(crate) fn set_device_info(&self, info: DeviceInfo) {
        self.device_info.store(Arc::new(info));
    }

    pub fn preset_catalog(&self, unnamed_labels: &[String]) -> PresetCatalog {
        PresetCatalog::build(&self.presets(), &self.modes(), unnamed_labels)
    }

    /// Forget everything device-specific. Used on shutdown.
    pub(crate) fn clear(&self) {
        self.snapshot.send_replace(Arc::new(Snapshot::unavailable()));
        self.set_modes(Vec::new());
        self.set_presets(BTreeMap::new());
        self.set_device_info(DeviceInfo::default());
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_notifies_subscribers() {
        let store = DeviceStore::new();
        let mut rx = store.subscribe();
        assert!(!store.snapshot().is_available());
        assert!(store.last_poll().is_none());

        store.publish(Snapshot::standby());

        assert!(rx.has_changed().unwrap_or(false));
        assert!(rx.borrow_and_update().is_available());
        assert!(store.last_poll().is_some());
    }

    #[test]
    fn catalog_reads_current_tables() {
        let store = DeviceStore::new();
        let mut presets = BTreeMap::new();
        presets.insert(
            "4".to_owned(),
            vec![Preset {
                key: "0".into(),
                name: Some("Classic".into()),
            }],
        );
        store.set_presets(presets);

        let catalog = store.preset_catalog(&[]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].display, "[FM] Classic");
    }
}
