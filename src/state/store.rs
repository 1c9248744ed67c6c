//! Durable key-value store for timer records
//!
//! Maps a timer identity to its record, with an optional JSON snapshot
//! file flushed after every successful mutation so timers survive a
//! server restart. All operations complete or fail before returning.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::TimerError;
use super::timer::{TimerKey, TimerRecord};

/// On-disk snapshot. Carries the id counter so ids stay unique across
/// restarts.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    timers: Vec<TimerRecord>,
}

#[derive(Debug, Clone)]
struct Inner {
    next_id: u64,
    timers: HashMap<TimerKey, TimerRecord>,
}

impl Inner {
    fn empty() -> Self {
        Self {
            next_id: 1,
            timers: HashMap::new(),
        }
    }
}

/// Durable mapping from timer identity to record.
///
/// Mutations stage their changes, flush the snapshot, then commit, so a
/// failed write leaves both memory and disk at the previous state.
#[derive(Debug)]
pub struct TimerStore {
    inner: Mutex<Inner>,
    path: Option<PathBuf>,
}

impl TimerStore {
    /// In-memory store with no snapshot file.
    pub fn ephemeral() -> Self {
        Self {
            inner: Mutex::new(Inner::empty()),
            path: None,
        }
    }

    /// Open a store backed by the given snapshot file, loading any
    /// previous snapshot.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TimerError> {
        let path = path.into();
        let inner = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_json::from_str(&raw)?;
            info!(
                "Loaded {} timers from {}",
                snapshot.timers.len(),
                path.display()
            );
            Inner {
                next_id: snapshot.next_id.max(1),
                timers: snapshot
                    .timers
                    .into_iter()
                    .map(|record| (record.key(), record))
                    .collect(),
            }
        } else {
            Inner::empty()
        };
        Ok(Self {
            inner: Mutex::new(inner),
            path: Some(path),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, TimerError> {
        self.inner
            .lock()
            .map_err(|e| TimerError::Store(format!("store lock poisoned: {e}")))
    }

    /// Stage a mutation, persist it, then commit. Same-identity races
    /// serialize here; last write wins.
    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Inner) -> Result<T, TimerError>,
    ) -> Result<T, TimerError> {
        let mut inner = self.lock()?;
        let mut staged = inner.clone();
        let out = apply(&mut staged)?;
        self.persist(&staged)?;
        *inner = staged;
        Ok(out)
    }

    fn persist(&self, inner: &Inner) -> Result<(), TimerError> {
        let Some(path) = &self.path else { return Ok(()) };
        let mut timers: Vec<TimerRecord> = inner.timers.values().cloned().collect();
        timers.sort_by_key(|record| record.id);
        let snapshot = Snapshot {
            next_id: inner.next_id,
            timers,
        };
        let raw = serde_json::to_string_pretty(&snapshot)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn get(&self, key: &TimerKey) -> Result<Option<TimerRecord>, TimerError> {
        Ok(self.lock()?.timers.get(key).cloned())
    }

    /// All records, ordered by id for stable listings.
    pub fn list(&self) -> Result<Vec<TimerRecord>, TimerError> {
        let inner = self.lock()?;
        let mut records: Vec<TimerRecord> = inner.timers.values().cloned().collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    pub fn len(&self) -> Result<usize, TimerError> {
        Ok(self.lock()?.timers.len())
    }

    /// Insert or overwrite the record for `key`. The builder receives
    /// the existing record (so its id can be reused) and the id to
    /// assign to a fresh one.
    pub fn upsert(
        &self,
        key: &TimerKey,
        build: impl FnOnce(Option<&TimerRecord>, u64) -> TimerRecord,
    ) -> Result<TimerRecord, TimerError> {
        self.mutate(|inner| {
            let fresh_id = inner.next_id;
            let record = build(inner.timers.get(key), fresh_id);
            if !inner.timers.contains_key(key) {
                inner.next_id += 1;
            }
            inner.timers.insert(key.clone(), record.clone());
            Ok(record)
        })
    }

    /// Apply a transition to the stored record for `key` and persist
    /// the result. `NotFound` when absent; on any error the stored
    /// state is untouched.
    pub fn update<T>(
        &self,
        key: &TimerKey,
        apply: impl FnOnce(&mut TimerRecord) -> Result<T, TimerError>,
    ) -> Result<T, TimerError> {
        self.mutate(|inner| {
            let record = inner
                .timers
                .get_mut(key)
                .ok_or_else(|| TimerError::not_found(key))?;
            apply(record)
        })
    }

    /// Remove the record for `key`. Idempotent: removing an absent
    /// identity is not an error. Returns whether a record was removed.
    pub fn remove(&self, key: &TimerKey) -> Result<bool, TimerError> {
        self.mutate(|inner| Ok(inner.timers.remove(key).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::timer::TimerStatus;

    const T0: i64 = 1_700_000_000_000;

    fn upsert_started(
        store: &TimerStore,
        key: &TimerKey,
        duration_ms: i64,
    ) -> TimerRecord {
        store
            .upsert(key, |existing, fresh_id| {
                let id = existing.map(|r| r.id).unwrap_or(fresh_id);
                TimerRecord::started(id, key, duration_ms, T0)
            })
            .unwrap()
    }

    #[test]
    fn upsert_assigns_sequential_ids() {
        let store = TimerStore::ephemeral();
        let first = upsert_started(&store, &TimerKey::new(1, "raid"), 300_000);
        let second = upsert_started(&store, &TimerKey::new(1, "siege"), 60_000);
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn upsert_reuses_id_on_overwrite() {
        let store = TimerStore::ephemeral();
        let key = TimerKey::new(1, "raid");
        let first = upsert_started(&store, &key, 300_000);
        let second = upsert_started(&store, &key, 120_000);
        assert_eq!(first.id, second.id);
        assert_eq!(second.duration_remaining, 120_000);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn update_missing_key_is_not_found() {
        let store = TimerStore::ephemeral();
        let err = store
            .update(&TimerKey::new(9, "ghost"), |record| record.pause(T0))
            .unwrap_err();
        assert!(matches!(err, TimerError::NotFound { .. }));
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let store = TimerStore::ephemeral();
        let key = TimerKey::new(1, "raid");
        upsert_started(&store, &key, 300_000);
        // Pause twice; the second fails with InvalidState.
        store.update(&key, |record| record.pause(T0 + 1_000)).unwrap();
        store
            .update(&key, |record| record.pause(T0 + 2_000))
            .unwrap_err();
        let record = store.get(&key).unwrap().unwrap();
        assert_eq!(record.status, TimerStatus::Paused);
        assert_eq!(record.duration_remaining, 299_000);
    }

    #[test]
    fn remove_is_idempotent() {
        let store = TimerStore::ephemeral();
        let key = TimerKey::new(1, "raid");
        upsert_started(&store, &key, 300_000);
        assert!(store.remove(&key).unwrap());
        assert!(!store.remove(&key).unwrap());
        assert!(store.get(&key).unwrap().is_none());
    }

    #[test]
    fn list_orders_by_id() {
        let store = TimerStore::ephemeral();
        upsert_started(&store, &TimerKey::new(2, "b"), 1_000);
        upsert_started(&store, &TimerKey::new(1, "a"), 1_000);
        upsert_started(&store, &TimerKey::new(3, "c"), 1_000);
        let ids: Vec<u64> = store.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");
        let key = TimerKey::new(4, "raid");

        let store = TimerStore::open(&path).unwrap();
        upsert_started(&store, &key, 300_000);
        store.update(&key, |record| record.pause(T0 + 60_000)).unwrap();
        drop(store);

        let reopened = TimerStore::open(&path).unwrap();
        let record = reopened.get(&key).unwrap().unwrap();
        assert_eq!(record.status, TimerStatus::Paused);
        assert_eq!(record.duration_remaining, 240_000);

        // Id counter restored: a new identity gets a fresh id.
        let other = upsert_started(&reopened, &TimerKey::new(5, "siege"), 1_000);
        assert_eq!(other.id, 2);
    }

    #[test]
    fn corrupt_snapshot_is_a_store_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timers.json");
        fs::write(&path, "not json").unwrap();
        let err = TimerStore::open(&path).unwrap_err();
        assert!(matches!(err, TimerError::Store(_)));
    }
}
