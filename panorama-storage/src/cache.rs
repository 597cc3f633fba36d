//! Cache-fronted session listing.
//!
//! A single-slot snapshot cache in front of the session list query. The
//! cached snapshot holds full session rows captured at fill time, but warm
//! reads reuse only its *identifier list*: every id is re-resolved against
//! the live store and the active/inactive filter runs on those fresh rows.
//! The set of candidate ids may therefore be stale for up to the TTL, while
//! field values and the filter are always current. That bounded staleness is
//! the documented trade-off, not an accident.
//!
//! The key and TTL are injected through [`CacheConfig`] so every test can
//! construct an isolated instance instead of sharing process-wide state.

use crate::StorageTrait;
use chrono::Utc;
use panorama_core::{ActiveFilter, EntityId, PanoramaResult, Session, StorageError, Timestamp};
use std::sync::RwLock;
use std::time::Duration;

/// Configuration for the session-list cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache key reported by debug reads.
    pub key: String,
    /// How long a snapshot stays usable after fill.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key: "cached_sessions".to_string(),
            ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl CacheConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache key.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Snapshot of the session table taken at fill time.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub key: String,
    pub cached_at: Timestamp,
    pub sessions: Vec<Session>,
}

impl SessionSnapshot {
    /// The candidate identifier set, the only part warm reads reuse.
    pub fn session_ids(&self) -> Vec<EntityId> {
        self.sessions.iter().map(|s| s.session_id).collect()
    }

    /// Whether the snapshot has outlived the TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age.to_std().map_or(true, |elapsed| elapsed >= ttl)
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Warm reads that reused a snapshot's id list.
    pub hits: u64,
    /// Cold or expired reads that re-queried the full session list.
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-accelerating cache for the session list.
///
/// Two observable states: **cold** (no snapshot) and **warm** (a snapshot
/// younger than the TTL). The cache is never a source of truth; concurrent
/// fills may race and the last writer wins.
#[derive(Debug, Default)]
pub struct SessionListCache {
    config: CacheConfig,
    slot: RwLock<Option<SessionSnapshot>>,
    stats: RwLock<CacheStats>,
}

impl SessionListCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            slot: RwLock::new(None),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Create a cache with the default key and one-hour TTL.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// The injected configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether a usable (non-expired) snapshot is present.
    pub fn is_warm(&self) -> PanoramaResult<bool> {
        let slot = self
            .slot
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(slot
            .as_ref()
            .map_or(false, |snap| !snap.is_expired(self.config.ttl)))
    }

    /// List sessions, reading through the cache.
    ///
    /// Cold (or expired): query all sessions from the store, fill the slot,
    /// and proceed warm. Warm: reuse the snapshot's id list without
    /// re-querying the full table. Either way, each candidate id is
    /// re-resolved against the live store and the filter applies to the
    /// fresh rows; ids whose sessions were deleted since the fill simply
    /// drop out.
    pub fn read<S>(&self, store: &S, filter: ActiveFilter) -> PanoramaResult<Vec<Session>>
    where
        S: StorageTrait + ?Sized,
    {
        let cached_ids = {
            let slot = self
                .slot
                .read()
                .map_err(|_| StorageError::LockPoisoned)?;
            slot.as_ref()
                .filter(|snap| !snap.is_expired(self.config.ttl))
                .map(|snap| snap.session_ids())
        };

        let ids = match cached_ids {
            Some(ids) => {
                self.bump(|stats| stats.hits += 1)?;
                ids
            }
            None => {
                let sessions = store.session_list()?;
                let snapshot = SessionSnapshot {
                    key: self.config.key.clone(),
                    cached_at: Utc::now(),
                    sessions: sessions.clone(),
                };
                let mut slot = self
                    .slot
                    .write()
                    .map_err(|_| StorageError::LockPoisoned)?;
                // Last writer wins on a fill race; both computed the same
                // snapshot under normal conditions.
                *slot = Some(snapshot);
                self.bump(|stats| stats.misses += 1)?;
                sessions.into_iter().map(|s| s.session_id).collect()
            }
        };

        let mut fresh = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(session) = store.session_get(id)? {
                if filter.matches(session.is_active) {
                    fresh.push(session);
                }
            }
        }
        Ok(fresh)
    }

    /// Debug read: the current snapshot, if any. Never fills the cache.
    pub fn peek(&self) -> PanoramaResult<Option<SessionSnapshot>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(slot.clone())
    }

    /// Remove the snapshot, returning the cache to cold.
    pub fn clear(&self) -> PanoramaResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }

    /// Usage counters.
    pub fn stats(&self) -> PanoramaResult<CacheStats> {
        let stats = self
            .stats
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(*stats)
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) -> PanoramaResult<()> {
        let mut stats = self
            .stats
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        update(&mut stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, SessionUpdate};
    use panorama_core::{Session, User};

    fn seeded_store(session_count: usize) -> (MemoryStore, Vec<Session>) {
        let store = MemoryStore::new();
        let subject = User::new("subject", "0f", "ab");
        store.user_insert(&subject).unwrap();
        let mut sessions = Vec::new();
        for i in 0..session_count {
            let session = Session::new(&format!("Session {}", i), subject.user_id);
            store.session_insert(&session).unwrap();
            sessions.push(session);
        }
        (store, sessions)
    }

    #[test]
    fn test_cold_read_fills_and_warms() {
        let (store, sessions) = seeded_store(3);
        let cache = SessionListCache::new(CacheConfig::new().with_key("test_sessions"));

        assert!(!cache.is_warm().unwrap());
        let listed = cache.read(&store, ActiveFilter::All).unwrap();
        assert_eq!(listed.len(), sessions.len());
        assert!(cache.is_warm().unwrap());

        let snapshot = cache.peek().unwrap().unwrap();
        assert_eq!(snapshot.key, "test_sessions");
        assert_eq!(snapshot.sessions.len(), 3);
    }

    #[test]
    fn test_peek_never_fills() {
        let (_store, _) = seeded_store(2);
        let cache = SessionListCache::with_defaults();

        assert!(cache.peek().unwrap().is_none());
        // Still cold afterwards.
        assert!(!cache.is_warm().unwrap());
    }

    #[test]
    fn test_clear_returns_to_cold() {
        let (store, _) = seeded_store(2);
        let cache = SessionListCache::with_defaults();

        cache.read(&store, ActiveFilter::All).unwrap();
        assert!(cache.is_warm().unwrap());

        cache.clear().unwrap();
        assert!(!cache.is_warm().unwrap());
        assert!(cache.peek().unwrap().is_none());
    }

    #[test]
    fn test_warm_read_reuses_id_set() {
        let (store, _) = seeded_store(2);
        let cache = SessionListCache::with_defaults();

        cache.read(&store, ActiveFilter::All).unwrap();
        cache.read(&store, ActiveFilter::All).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_filter_runs_against_fresh_rows() {
        let (store, sessions) = seeded_store(2);
        let cache = SessionListCache::with_defaults();

        cache.read(&store, ActiveFilter::All).unwrap();

        // Deactivate one session after the fill: the filter must see the
        // fresh flag, not the snapshot's.
        store
            .session_update(
                sessions[0].session_id,
                SessionUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        let active = cache.read(&store, ActiveFilter::Active).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].session_id, sessions[1].session_id);

        let inactive = cache.read(&store, ActiveFilter::Inactive).unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].session_id, sessions[0].session_id);
    }

    #[test]
    fn test_deleted_sessions_drop_out_of_warm_reads() {
        let (store, sessions) = seeded_store(2);
        let cache = SessionListCache::with_defaults();

        cache.read(&store, ActiveFilter::All).unwrap();
        store.session_delete(sessions[0].session_id).unwrap();

        let listed = cache.read(&store, ActiveFilter::All).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id, sessions[1].session_id);
    }

    #[test]
    fn test_created_sessions_absent_until_refill() {
        let (store, _) = seeded_store(1);
        let cache = SessionListCache::with_defaults();

        cache.read(&store, ActiveFilter::All).unwrap();

        let subject = store.user_get_by_username("subject").unwrap().unwrap();
        let late = Session::new("Late", subject.user_id);
        store.session_insert(&late).unwrap();

        // Bounded staleness: the new session is invisible within the TTL...
        let listed = cache.read(&store, ActiveFilter::All).unwrap();
        assert_eq!(listed.len(), 1);

        // ...and appears after an explicit clear.
        cache.clear().unwrap();
        let refreshed = cache.read(&store, ActiveFilter::All).unwrap();
        assert_eq!(refreshed.len(), 2);
    }

    #[test]
    fn test_expired_snapshot_refills() {
        let (store, _) = seeded_store(1);
        let cache = SessionListCache::new(CacheConfig::new().with_ttl(Duration::ZERO));

        cache.read(&store, ActiveFilter::All).unwrap();
        assert!(!cache.is_warm().unwrap());

        cache.read(&store, ActiveFilter::All).unwrap();
        let stats = cache.stats().unwrap();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = CacheStats { hits: 8, misses: 2 };
        assert!((stats.hit_rate() - 0.8).abs() < 1e-9);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
