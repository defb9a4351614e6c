//! Time-based expiration.
//!
//! Expiry is a pure predicate over a paste's metadata and a point in time.
//! Physical reclamation of an expired paste is a separate, best-effort step
//! handed to a [`Reclaimer`]; its success never changes what the access that
//! discovered the expiry returned.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::id::PasteId;
use crate::storage::types::PasteMeta;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        let next = chrono::Duration::from_std(by)
            .ok()
            .and_then(|step| now.checked_add_signed(step));
        *now = next.unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid timestamp
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// When a paste stops being readable, or `None` if it never expires.
///
/// An interval too large for the calendar is treated as "never".
pub fn expires_at(meta: &PasteMeta) -> Option<DateTime<Utc>> {
    let interval = chrono::Duration::from_std(meta.expire_interval?).ok()?;
    meta.created_at.checked_add_signed(interval)
}

/// Whether a paste is logically gone at `now`.
pub fn is_expired(meta: &PasteMeta, now: DateTime<Utc>) -> bool {
    expires_at(meta).is_some_and(|deadline| now >= deadline)
}

/// Time left before expiry, saturating at zero. `None` means "never".
pub fn remaining(meta: &PasteMeta, now: DateTime<Utc>) -> Option<Duration> {
    let deadline = expires_at(meta)?;
    Some((deadline - now).to_std().unwrap_or(Duration::ZERO))
}

/// How lazily discovered expired pastes are physically removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeMode {
    /// Reclaim on a detached worker thread.
    #[default]
    Background,
    /// Reclaim on the calling thread after the outcome is decided.
    Inline,
    /// Leave reclamation to an explicit sweep.
    Disabled,
}

/// Runs best-effort reclamation tasks according to a [`PurgeMode`].
#[derive(Debug, Clone, Copy)]
pub struct Reclaimer {
    mode: PurgeMode,
}

impl Reclaimer {
    pub fn new(mode: PurgeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PurgeMode {
        self.mode
    }

    /// Hand off reclamation of `id`.
    ///
    /// The task reports whether it removed anything. Errors are logged and
    /// dropped.
    pub fn schedule<F>(&self, id: &PasteId, task: F)
    where
        F: FnOnce() -> Result<bool> + Send + 'static,
    {
        match self.mode {
            PurgeMode::Disabled => {}
            PurgeMode::Inline => run_purge(id, task),
            PurgeMode::Background => {
                let owned = id.clone();
                let spawned = std::thread::Builder::new()
                    .name("pastebox-purge".to_string())
                    .spawn(move || run_purge(&owned, task));
                if let Err(err) = spawned {
                    tracing::warn!(paste_id = %id, error = %err, "failed to spawn purge worker");
                }
            }
        }
    }
}

fn run_purge<F>(id: &PasteId, task: F)
where
    F: FnOnce() -> Result<bool>,
{
    match task() {
        Ok(true) => tracing::debug!(paste_id = %id, "purged expired paste"),
        Ok(false) => {}
        Err(err) => tracing::warn!(paste_id = %id, error = %err, "purge of expired paste failed"),
    }
}
