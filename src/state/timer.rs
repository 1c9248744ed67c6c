//! Timer records and the pure transition logic applied to them
//!
//! A timer is stored as an absolute start instant plus a millisecond
//! budget. Remaining time is always derived at read time from those two
//! fields, never decremented in storage, so no background clock exists
//! anywhere in the server.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Boundary conversion factor: requests carry minutes, storage uses ms.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Composite identity addressing one timer. Unique per store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerKey {
    pub server: u32,
    pub event: String,
}

impl TimerKey {
    pub fn new(server: u32, event: impl Into<String>) -> Self {
        Self {
            server,
            event: event.into(),
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.event)
    }
}

/// Stored timer status.
///
/// There is deliberately no `Exhausted` variant: a fully elapsed timer
/// keeps `Running` status and reports remaining = 0 until a client
/// pauses or resets it. Exhaustion is a read-time derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerStatus::Running => write!(f, "running"),
            TimerStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Persisted timer state.
///
/// `start_time` is epoch milliseconds and only meaningful while running.
/// While running, `duration_remaining` is the budget at the moment
/// `start_time` was last set; while paused it is the exact remaining
/// time frozen at the pause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: u64,
    pub server: u32,
    pub event: String,
    pub start_time: i64,
    pub duration_remaining: i64,
    pub status: TimerStatus,
}

impl TimerRecord {
    /// Fresh running record with a full budget starting now.
    pub fn started(id: u64, key: &TimerKey, duration_ms: i64, now_ms: i64) -> Self {
        Self {
            id,
            server: key.server,
            event: key.event.clone(),
            start_time: now_ms,
            duration_remaining: duration_ms,
            status: TimerStatus::Running,
        }
    }

    pub fn key(&self) -> TimerKey {
        TimerKey::new(self.server, self.event.clone())
    }

    /// Remaining countdown at `now_ms`, derived from stored absolute
    /// state. Never negative.
    pub fn remaining_at(&self, now_ms: i64) -> i64 {
        match self.status {
            TimerStatus::Running => {
                (self.duration_remaining - (now_ms - self.start_time)).max(0)
            }
            TimerStatus::Paused => self.duration_remaining.max(0),
        }
    }

    /// Freeze the remaining budget and stop the clock. Returns the
    /// frozen remaining value.
    pub fn pause(&mut self, now_ms: i64) -> Result<i64, TimerError> {
        if self.status != TimerStatus::Running {
            return Err(TimerError::InvalidState {
                expected: TimerStatus::Running,
                actual: self.status,
            });
        }
        let remaining = self.remaining_at(now_ms);
        self.duration_remaining = remaining;
        self.status = TimerStatus::Paused;
        Ok(remaining)
    }

    /// Restart the clock against the frozen budget.
    pub fn resume(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if self.status != TimerStatus::Paused {
            return Err(TimerError::InvalidState {
                expected: TimerStatus::Paused,
                actual: self.status,
            });
        }
        self.start_time = now_ms;
        self.status = TimerStatus::Running;
        Ok(())
    }

    /// Restart the current `duration_remaining` budget from now and
    /// force the timer to run. Restoring the originally configured
    /// duration is the client's job: re-issue a create with it.
    pub fn reset(&mut self, now_ms: i64) {
        self.start_time = now_ms;
        self.status = TimerStatus::Running;
    }

    /// Derived read-only view for clients.
    pub fn summarize(&self, now_ms: i64) -> TimerSummary {
        TimerSummary {
            id: self.id,
            server: self.server,
            event: self.event.clone(),
            status: self.status,
            remaining: self.remaining_at(now_ms),
        }
    }
}

/// What clients see: identity, status, and the derived remaining time.
///
/// The raw `start_time` and stored budget stay server-side so clients
/// cannot miscompute remaining time across clock skew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSummary {
    pub id: u64,
    pub server: u32,
    pub event: String,
    pub status: TimerStatus,
    pub remaining: i64,
}

/// Convert the boundary duration (minutes) to the internal ms budget,
/// rejecting non-positive and non-finite values.
pub fn duration_ms_from_minutes(minutes: f64) -> Result<i64, TimerError> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(TimerError::InvalidDuration(minutes));
    }
    Ok((minutes * MS_PER_MINUTE).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn five_minute_record() -> TimerRecord {
        TimerRecord::started(1, &TimerKey::new(3, "raid"), 300_000, T0)
    }

    #[test]
    fn remaining_counts_down_while_running() {
        let record = five_minute_record();
        assert_eq!(record.remaining_at(T0), 300_000);
        assert_eq!(record.remaining_at(T0 + 60_000), 240_000);
        assert_eq!(record.remaining_at(T0 + 299_999), 1);
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let record = five_minute_record();
        assert_eq!(record.remaining_at(T0 + 300_000), 0);
        assert_eq!(record.remaining_at(T0 + 400_000), 0);
    }

    #[test]
    fn exhausted_timer_stays_running() {
        let record = five_minute_record();
        assert_eq!(record.remaining_at(T0 + 1_000_000), 0);
        assert_eq!(record.status, TimerStatus::Running);
    }

    #[test]
    fn pause_freezes_remaining() {
        let mut record = five_minute_record();
        let frozen = record.pause(T0 + 60_000).unwrap();
        assert_eq!(frozen, 240_000);
        assert_eq!(record.status, TimerStatus::Paused);
        // No drift while paused, however late we look.
        assert_eq!(record.remaining_at(T0 + 70_000), 240_000);
        assert_eq!(record.remaining_at(T0 + 10_000_000), 240_000);
    }

    #[test]
    fn pause_after_exhaustion_freezes_at_zero() {
        let mut record = five_minute_record();
        let frozen = record.pause(T0 + 400_000).unwrap();
        assert_eq!(frozen, 0);
        assert_eq!(record.duration_remaining, 0);
    }

    #[test]
    fn pause_requires_running() {
        let mut record = five_minute_record();
        record.pause(T0 + 1_000).unwrap();
        let err = record.pause(T0 + 2_000).unwrap_err();
        assert!(matches!(
            err,
            TimerError::InvalidState {
                expected: TimerStatus::Running,
                actual: TimerStatus::Paused,
            }
        ));
        assert_eq!(record.duration_remaining, 299_000);
    }

    #[test]
    fn resume_requires_paused() {
        let mut record = five_minute_record();
        let err = record.resume(T0 + 1_000).unwrap_err();
        assert!(matches!(
            err,
            TimerError::InvalidState {
                expected: TimerStatus::Paused,
                actual: TimerStatus::Running,
            }
        ));
    }

    #[test]
    fn resume_restarts_clock_against_frozen_budget() {
        let mut record = five_minute_record();
        record.pause(T0 + 60_000).unwrap();
        record.resume(T0 + 70_000).unwrap();
        assert_eq!(record.status, TimerStatus::Running);
        // The 10s spent paused never counts against the budget.
        assert_eq!(record.remaining_at(T0 + 80_000), 230_000);
    }

    #[test]
    fn reset_restarts_current_budget_and_forces_running() {
        let mut record = five_minute_record();
        record.pause(T0 + 60_000).unwrap();
        record.reset(T0 + 100_000);
        assert_eq!(record.status, TimerStatus::Running);
        assert_eq!(record.remaining_at(T0 + 100_000), 240_000);

        // On a running timer, reset rewinds to the budget of the
        // current interval, not the original duration.
        let mut record = five_minute_record();
        record.pause(T0 + 120_000).unwrap();
        record.resume(T0 + 130_000).unwrap();
        record.reset(T0 + 200_000);
        assert_eq!(record.remaining_at(T0 + 200_000), 180_000);
    }

    #[test]
    fn five_minute_lifecycle_scenario() {
        let mut record = five_minute_record();
        assert_eq!(record.remaining_at(T0), 300_000);

        // One minute in.
        assert_eq!(record.remaining_at(T0 + 60_000), 240_000);

        // Pause; remaining frozen regardless of elapsed wall time.
        assert_eq!(record.pause(T0 + 60_000).unwrap(), 240_000);
        assert_eq!(record.remaining_at(T0 + 70_000), 240_000);

        // Resume and run out the budget.
        record.resume(T0 + 70_000).unwrap();
        assert_eq!(record.remaining_at(T0 + 70_000 + 240_000), 0);
        assert_eq!(record.status, TimerStatus::Running);
    }

    #[test]
    fn duration_conversion_and_validation() {
        assert_eq!(duration_ms_from_minutes(5.0).unwrap(), 300_000);
        assert_eq!(duration_ms_from_minutes(0.5).unwrap(), 30_000);
        assert!(matches!(
            duration_ms_from_minutes(0.0),
            Err(TimerError::InvalidDuration(_))
        ));
        assert!(matches!(
            duration_ms_from_minutes(-3.0),
            Err(TimerError::InvalidDuration(_))
        ));
        assert!(matches!(
            duration_ms_from_minutes(f64::NAN),
            Err(TimerError::InvalidDuration(_))
        ));
        assert!(matches!(
            duration_ms_from_minutes(f64::INFINITY),
            Err(TimerError::InvalidDuration(_))
        ));
    }
}
