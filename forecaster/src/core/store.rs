//! Keyed record store with change notification
//!
//! Every mutation reports which keys were added, removed or changed to all
//! live subscribers before returning.

use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;

use shared::{ForecastRecord, KeyedRecord, RecordKey, WindThreshold};

/// Keys touched by one mutation, or between two snapshots
///
/// The three sets are always disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    pub added: BTreeSet<RecordKey>,
    pub removed: BTreeSet<RecordKey>,
    pub changed: BTreeSet<RecordKey>,
}

impl ChangeEvent {
    pub fn added(key: RecordKey) -> Self {
        Self {
            added: BTreeSet::from([key]),
            ..Default::default()
        }
    }

    pub fn removed(key: RecordKey) -> Self {
        Self {
            removed: BTreeSet::from([key]),
            ..Default::default()
        }
    }

    pub fn changed(key: RecordKey) -> Self {
        Self {
            changed: BTreeSet::from([key]),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of keys touched
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Immutable copy of a store's contents
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreSnapshot {
    records: BTreeMap<RecordKey, ForecastRecord>,
}

impl StoreSnapshot {
    pub fn get(&self, key: &RecordKey) -> Option<&ForecastRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys that differ going from `self` to `newer`
    pub fn diff(&self, newer: &StoreSnapshot) -> ChangeEvent {
        let mut event = ChangeEvent::default();
        for (key, record) in &newer.records {
            match self.records.get(key) {
                None => {
                    event.added.insert(key.clone());
                }
                Some(old) if old != record => {
                    event.changed.insert(key.clone());
                }
                Some(_) => {}
            }
        }
        for key in self.records.keys() {
            if !newer.records.contains_key(key) {
                event.removed.insert(key.clone());
            }
        }
        event
    }
}

/// Ordered map of forecast records
#[derive(Debug, Default)]
pub struct RecordStore {
    records: BTreeMap<RecordKey, ForecastRecord>,
    subscribers: Vec<mpsc::UnboundedSender<ChangeEvent>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records without notifying anyone
    pub fn from_records(records: impl IntoIterator<Item = (RecordKey, ForecastRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber for change events
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChangeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Insert or replace a record
    ///
    /// Always notifies, even when the stored value is unchanged.
    pub fn put(&mut self, key: RecordKey, record: ForecastRecord) -> Option<ForecastRecord> {
        let previous = self.records.insert(key.clone(), record);
        let event = if previous.is_some() {
            ChangeEvent::changed(key)
        } else {
            ChangeEvent::added(key)
        };
        self.notify(event);
        previous
    }

    pub fn get(&self, key: &RecordKey) -> Option<&ForecastRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    /// Remove a record, notifying only when something was removed
    pub fn remove(&mut self, key: &RecordKey) -> Option<ForecastRecord> {
        let removed = self.records.remove(key);
        if removed.is_some() {
            self.notify(ChangeEvent::removed(key.clone()));
        }
        removed
    }

    /// Key for a lead/threshold, taking aid and cycle from any stored record
    pub fn key_for(&self, lead_hours: i32, threshold: WindThreshold) -> Option<RecordKey> {
        self.records
            .keys()
            .next()
            .map(|any| RecordKey::new(any.aid.clone(), any.cycle, lead_hours, threshold))
    }

    pub fn lookup(&self, lead_hours: i32, threshold: WindThreshold) -> Option<&ForecastRecord> {
        let key = self.key_for(lead_hours, threshold)?;
        self.records.get(&key)
    }

    /// The record carrying the intensity for a lead: 34kt, else the radii-less one
    pub fn lookup_base(&self, lead_hours: i32) -> Option<(RecordKey, &ForecastRecord)> {
        [WindThreshold::Kt34, WindThreshold::None]
            .into_iter()
            .filter_map(|threshold| self.key_for(lead_hours, threshold))
            .find_map(|key| self.records.get(&key).map(|record| (key, record)))
    }

    /// Keys of every record at a lead, lowest threshold first
    pub fn keys_at(&self, lead_hours: i32) -> Vec<RecordKey> {
        self.records
            .keys()
            .filter(|key| key.lead_hours == lead_hours)
            .cloned()
            .collect()
    }

    /// Distinct lead times present, ascending
    pub fn leads(&self) -> BTreeSet<i32> {
        self.records.keys().map(|key| key.lead_hours).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &ForecastRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.records.clone(),
        }
    }

    pub fn to_keyed(&self) -> Vec<KeyedRecord> {
        self.records
            .iter()
            .map(|(key, record)| KeyedRecord::new(key.clone(), record.clone()))
            .collect()
    }

    fn notify(&mut self, event: ChangeEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CycleTime, FORECAST_AID};

    fn key(lead: i32, threshold: WindThreshold) -> RecordKey {
        RecordKey::new(FORECAST_AID, CycleTime::from_dtg("2024091012").unwrap(), lead, threshold)
    }

    #[test]
    fn test_identical_puts_each_fire_an_event() {
        let mut store = RecordStore::new();
        let mut rx = store.subscribe();
        let record = ForecastRecord {
            max_wind: 50,
            ..Default::default()
        };

        for _ in 0..3 {
            store.put(key(12, WindThreshold::Kt34), record.clone());
        }

        let first = rx.try_recv().unwrap();
        assert_eq!(first.added.len(), 1);
        assert!(first.changed.is_empty());
        assert_eq!(rx.try_recv().unwrap().changed.len(), 1);
        assert_eq!(rx.try_recv().unwrap().changed.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_remove_absent_key_is_silent() {
        let mut store = RecordStore::new();
        let mut rx = store.subscribe();

        assert!(store.remove(&key(12, WindThreshold::Kt34)).is_none());
        assert!(rx.try_recv().is_err());

        store.put(key(12, WindThreshold::Kt34), ForecastRecord::default());
        store.remove(&key(12, WindThreshold::Kt34));
        let _ = rx.try_recv().unwrap();
        assert_eq!(rx.try_recv().unwrap().removed.len(), 1);
    }

    #[test]
    fn test_every_subscriber_is_notified_and_closed_ones_pruned() {
        let mut store = RecordStore::new();
        let mut a = store.subscribe();
        let b = store.subscribe();
        drop(b);

        store.put(key(24, WindThreshold::Kt34), ForecastRecord::default());

        assert_eq!(a.try_recv().unwrap().len(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_lookup_derives_aid_and_cycle() {
        let mut store = RecordStore::new();
        assert!(store.lookup(12, WindThreshold::Kt34).is_none());

        store.put(
            key(24, WindThreshold::None),
            ForecastRecord {
                max_wind: 30,
                ..Default::default()
            },
        );
        store.put(
            key(12, WindThreshold::Kt34),
            ForecastRecord {
                max_wind: 45,
                ..Default::default()
            },
        );

        assert_eq!(store.lookup(12, WindThreshold::Kt34).unwrap().max_wind, 45);
        assert!(store.lookup(12, WindThreshold::Kt50).is_none());
        let (base_key, base) = store.lookup_base(24).unwrap();
        assert_eq!(base_key.threshold, WindThreshold::None);
        assert_eq!(base.max_wind, 30);
    }

    #[test]
    fn test_snapshot_diff_sets_are_disjoint() {
        let mut store = RecordStore::new();
        store.put(key(12, WindThreshold::Kt34), ForecastRecord::default());
        store.put(key(24, WindThreshold::Kt34), ForecastRecord::default());
        let before = store.snapshot();

        store.put(
            key(12, WindThreshold::Kt34),
            ForecastRecord {
                max_wind: 70,
                ..Default::default()
            },
        );
        store.put(key(24, WindThreshold::Kt34), ForecastRecord::default());
        store.remove(&key(24, WindThreshold::Kt34));
        store.put(key(36, WindThreshold::Kt34), ForecastRecord::default());

        let diff = before.diff(&store.snapshot());
        assert_eq!(diff.changed, BTreeSet::from([key(12, WindThreshold::Kt34)]));
        assert_eq!(diff.removed, BTreeSet::from([key(24, WindThreshold::Kt34)]));
        assert_eq!(diff.added, BTreeSet::from([key(36, WindThreshold::Kt34)]));
    }
}
