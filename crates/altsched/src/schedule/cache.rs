//! TTL-based caching of parsed schedules.
//!
//! One entry per group. Fresh entries are served without touching the
//! network; an expired entry is kept around so a failed refresh can still
//! answer with stale data instead of nothing. Refreshes for the same group
//! collapse to a single in-flight fetch via a per-group lock; distinct
//! groups never block each other.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::ScheduleError;
use super::types::Schedule;

/// Default time-to-live before a refresh is attempted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Thread-safe schedule cache keyed by group name.
pub struct ScheduleCache {
    entries: DashMap<String, Arc<Schedule>>,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
}

impl ScheduleCache {
    /// Creates an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            refresh_locks: DashMap::new(),
            ttl,
        }
    }

    /// Creates an empty cache with the one-hour default TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Returns the cached schedule if present and still fresh.
    ///
    /// Expired entries are left in place - they remain usable as a stale
    /// fallback after a failed refresh.
    pub fn get_fresh(&self, group: &str) -> Option<Arc<Schedule>> {
        self.entries
            .get(group)
            .filter(|entry| self.is_fresh(entry.value()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the cached schedule regardless of freshness.
    pub fn get_any(&self, group: &str) -> Option<Arc<Schedule>> {
        self.entries
            .get(group)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Replaces the entry for the schedule's group.
    pub fn insert(&self, schedule: Schedule) {
        self.entries
            .insert(schedule.group.clone(), Arc::new(schedule));
    }

    /// Returns the cached schedule, refreshing it through `refresh` when
    /// missing or expired.
    ///
    /// On refresh failure a pre-existing entry (fresh or stale, with its
    /// original `created_at`) is served as a degraded fallback; `None` means
    /// there is nothing at all to serve.
    pub async fn get_or_refresh<F, Fut>(&self, group: &str, refresh: F) -> Option<Arc<Schedule>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Schedule, ScheduleError>>,
    {
        if let Some(schedule) = self.get_fresh(group) {
            debug!(group, "serving cached schedule");
            return Some(schedule);
        }

        let lock = self.refresh_lock(group);
        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(schedule) = self.get_fresh(group) {
            debug!(group, "serving schedule refreshed by concurrent caller");
            return Some(schedule);
        }

        match refresh().await {
            Ok(schedule) => {
                info!(group, weeks = schedule.weeks.len(), "schedule refreshed");
                let schedule = Arc::new(schedule);
                self.entries
                    .insert(group.to_string(), Arc::clone(&schedule));
                Some(schedule)
            }
            Err(error) => {
                warn!(group, error = %error, "schedule refresh failed");
                let stale = self.get_any(group);
                if stale.is_some() {
                    info!(group, "serving stale schedule after failed refresh");
                }
                stale
            }
        }
    }

    /// Removes the entry for a group.
    pub fn invalidate(&self, group: &str) {
        self.entries.remove(group);
    }

    /// Number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no schedules are cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, schedule: &Schedule) -> bool {
        match (Utc::now() - schedule.created_at).to_std() {
            Ok(age) => age < self.ttl,
            // created_at in the future: clock skew, treat as fresh
            Err(_) => true,
        }
    }

    fn refresh_lock(&self, group: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(group.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Default for ScheduleCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::error::FetchError;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn schedule_for(group: &str) -> Schedule {
        Schedule::new(group)
    }

    fn stale_schedule_for(group: &str) -> Schedule {
        let mut schedule = Schedule::new(group);
        schedule.created_at = Utc::now() - ChronoDuration::hours(2);
        schedule
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_refresh() {
        let cache = ScheduleCache::with_default_ttl();
        cache.insert(schedule_for("ИБ-41"));

        let calls = AtomicUsize::new(0);
        let result = cache
            .get_or_refresh("ИБ-41", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(schedule_for("ИБ-41")) }
            })
            .await;

        assert!(result.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_preserves_previous_entry() {
        let cache = ScheduleCache::with_default_ttl();
        let stale = stale_schedule_for("ИБ-41");
        let original_created_at = stale.created_at;
        cache.insert(stale);

        let result = cache
            .get_or_refresh("ИБ-41", || async {
                Err(ScheduleError::Fetch(FetchError::Timeout))
            })
            .await;

        let served = result.expect("stale schedule must be served");
        assert_eq!(served.created_at, original_created_at);
        // The entry is still there for the next caller too.
        assert_eq!(cache.get_any("ИБ-41").unwrap().created_at, original_created_at);
    }

    #[tokio::test]
    async fn test_miss_with_failed_refresh_is_none() {
        let cache = ScheduleCache::with_default_ttl();
        let result = cache
            .get_or_refresh("ИБ-42", || async {
                Err(ScheduleError::Fetch(FetchError::Timeout))
            })
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_is_replaced_on_successful_refresh() {
        let cache = ScheduleCache::with_default_ttl();
        let stale = stale_schedule_for("ИБ-41");
        let old_created_at = stale.created_at;
        cache.insert(stale);

        let result = cache
            .get_or_refresh("ИБ-41", || async { Ok(schedule_for("ИБ-41")) })
            .await;

        assert!(result.unwrap().created_at > old_created_at);
    }

    #[tokio::test]
    async fn test_groups_are_independent() {
        let cache = ScheduleCache::with_default_ttl();
        cache.insert(schedule_for("ИБ-41"));

        let result = cache
            .get_or_refresh("ИБ-42", || async { Ok(schedule_for("ИБ-42")) })
            .await;

        assert_eq!(result.unwrap().group, "ИБ-42");
        assert_eq!(cache.len(), 2);
    }
}
