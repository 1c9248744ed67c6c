//! Main application state management

use std::{sync::Mutex, time::Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::TimerError;
use super::{
    store::TimerStore,
    timer::{duration_ms_from_minutes, TimerKey, TimerRecord, TimerSummary},
};

/// Application state: the timer store plus server metadata.
///
/// Each timer operation is one read-compute-write against the store,
/// performed without yielding, so operations on different identities
/// never interfere and same-identity races serialize in the store.
#[derive(Debug)]
pub struct AppState {
    store: TimerStore,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(store: TimerStore, port: u16, host: String) -> Self {
        Self {
            store,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Create-or-overwrite by identity. An existing timer keeps its id;
    /// the budget and start instant are replaced wholesale and the
    /// timer is set running.
    pub fn create_timer(
        &self,
        key: TimerKey,
        duration_minutes: f64,
    ) -> Result<TimerSummary, TimerError> {
        let duration_ms = duration_ms_from_minutes(duration_minutes)?;
        let now = Self::now_ms();
        let record = self.store.upsert(&key, |existing, fresh_id| {
            let id = existing.map(|r| r.id).unwrap_or(fresh_id);
            TimerRecord::started(id, &key, duration_ms, now)
        })?;
        info!(
            "Timer {} set to {} minutes (id {})",
            key, duration_minutes, record.id
        );
        self.record_action("create");
        Ok(record.summarize(now))
    }

    /// Freeze a running countdown. Returns the remaining budget at the
    /// pause instant.
    pub fn pause_timer(&self, key: &TimerKey) -> Result<i64, TimerError> {
        let now = Self::now_ms();
        let remaining = self.store.update(key, |record| record.pause(now))?;
        info!("Timer {} paused with {}ms remaining", key, remaining);
        self.record_action("pause");
        Ok(remaining)
    }

    /// Restart a paused timer's clock against its frozen budget.
    pub fn resume_timer(&self, key: &TimerKey) -> Result<(), TimerError> {
        let now = Self::now_ms();
        self.store.update(key, |record| record.resume(now))?;
        info!("Timer {} resumed", key);
        self.record_action("start");
        Ok(())
    }

    /// Restart the current budget from now, forcing the timer to run.
    pub fn reset_timer(&self, key: &TimerKey) -> Result<(), TimerError> {
        let now = Self::now_ms();
        self.store.update(key, |record| {
            record.reset(now);
            Ok(())
        })?;
        info!("Timer {} reset", key);
        self.record_action("reset");
        Ok(())
    }

    /// Delete by identity. Idempotent: deleting an absent timer is not
    /// an error.
    pub fn delete_timer(&self, key: &TimerKey) -> Result<(), TimerError> {
        if self.store.remove(key)? {
            info!("Timer {} deleted", key);
        } else {
            debug!("Delete for absent timer {}", key);
        }
        self.record_action("delete");
        Ok(())
    }

    pub fn get_timer(&self, key: &TimerKey) -> Result<TimerSummary, TimerError> {
        let now = Self::now_ms();
        let record = self
            .store
            .get(key)?
            .ok_or_else(|| TimerError::not_found(key))?;
        Ok(record.summarize(now))
    }

    /// All timers with remaining time derived at call time.
    pub fn list_timers(&self) -> Result<Vec<TimerSummary>, TimerError> {
        let now = Self::now_ms();
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|record| record.summarize(now))
            .collect())
    }

    pub fn timer_count(&self) -> Result<usize, TimerError> {
        self.store.len()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
