//! # vtxcache - Cache des résolutions de flux
//!
//! Mémorise, pour une durée courte, le [`StreamDescriptor`] obtenu pour un
//! identifiant de piste afin de ne pas relancer tout le pipeline de
//! résolution à chaque lecture.
//!
//! - Expiration paresseuse : une entrée expirée est ignorée à la lecture.
//! - [`ResultCache::sweep`] retire les entrées expirées (appelé depuis le
//!   health check).
//! - Aucun cache négatif : seuls les succès sont stockés.
//! - Les entrées sont remplacées en bloc, jamais modifiées en place.
//!
//! ```rust
//! use std::time::Duration;
//! use vtxcache::{MemoryCache, ResultCache};
//! use vtxsource::{SourceKind, StreamDescriptor};
//!
//! let cache = MemoryCache::new(Duration::from_secs(1800));
//! let descriptor = StreamDescriptor::new(SourceKind::ProxyPoolB, "https://cdn/x").unwrap();
//! cache.put("dQw4w9WgXcQ".to_string(), descriptor.clone());
//! assert_eq!(cache.get("dQw4w9WgXcQ"), Some(descriptor));
//! ```

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;
use vtxsource::StreamDescriptor;

/// Durée de vie par défaut d'une résolution (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Short-lived memoization of resolved descriptors
///
/// Implementations must tolerate concurrent `get`/`put`; a lost update is
/// acceptable, a torn entry is not.
pub trait ResultCache: Send + Sync {
    /// Returns the live descriptor for `key`, if any
    fn get(&self, key: &str) -> Option<StreamDescriptor>;

    /// Stores `descriptor`, replacing any previous entry for `key`
    fn put(&self, key: String, descriptor: StreamDescriptor);

    /// Removes expired entries and returns how many were removed
    fn sweep(&self) -> usize;

    /// Number of stored entries, expired ones included
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops everything
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    descriptor: StreamDescriptor,
    inserted_at: Instant,
}

/// In-memory [`ResultCache`] with a fixed TTL
pub struct MemoryCache<C: Clock = SystemClock> {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: C,
}

impl MemoryCache<SystemClock> {
    /// Crée un cache utilisant l'horloge système
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<C: Clock> MemoryCache<C> {
    /// Crée un cache avec une horloge fournie (tests)
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn is_live(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }
}

impl<C: Clock> ResultCache for MemoryCache<C> {
    fn get(&self, key: &str) -> Option<StreamDescriptor> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap();
        entries
            .get(key)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.descriptor.clone())
    }

    fn put(&self, key: String, descriptor: StreamDescriptor) {
        let entry = CacheEntry {
            descriptor,
            inserted_at: self.clock.now(),
        };
        self.entries.write().unwrap().insert(key, entry);
    }

    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| self.is_live(entry, now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Swept expired stream resolutions");
        }
        removed
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vtxsource::SourceKind;

    fn descriptor(url: &str) -> StreamDescriptor {
        StreamDescriptor::new(SourceKind::ProxyPoolA, url).unwrap()
    }

    #[test]
    fn test_get_put() {
        let cache = MemoryCache::new(DEFAULT_TTL);
        assert!(cache.get("a").is_none());

        cache.put("a".into(), descriptor("https://one"));
        assert_eq!(cache.get("a").unwrap().upstream_url(), "https://one");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let cache = MemoryCache::new(DEFAULT_TTL);
        cache.put("a".into(), descriptor("https://one").with_bitrate(128));
        cache.put("a".into(), descriptor("https://two"));

        let got = cache.get("a").unwrap();
        assert_eq!(got.upstream_url(), "https://two");
        assert_eq!(got.bitrate_kbps, 0);
    }

    #[test]
    fn test_expired_entries_are_absent() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.put("a".into(), descriptor("https://one"));

        clock.advance(Duration::from_secs(59));
        assert!(cache.get("a").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("a").is_none());
        // Lazy: still stored until swept
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(Duration::from_secs(60), clock.clone());
        cache.put("old".into(), descriptor("https://old"));
        clock.advance(Duration::from_secs(45));
        cache.put("new".into(), descriptor("https://new"));
        clock.advance(Duration::from_secs(30));

        assert_eq!(cache.sweep(), 1);
        assert!(cache.get("new").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = MemoryCache::default();
        cache.put("a".into(), descriptor("https://one"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
