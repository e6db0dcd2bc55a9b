//! Resolution orchestrator
//!
//! A request goes through the following stages, stopping at the first
//! success:
//!
//! 1. result cache lookup;
//! 2. identifier normalization (catalog id to native id by metadata search);
//! 3. racing stage: every instance of every pool at once, first descriptor
//!    passing the [`DurationTolerance`] wins and the others are cancelled;
//! 4. sequential fallback through the heavier adapters, in order.
//!
//! Stages 2 to 4 run under one overall deadline. Successful resolutions are
//! cached, failures are not.

use crate::error::{ResolveError, Result};
use crate::filter::DurationTolerance;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vtxcache::{MemoryCache, ResultCache};
use vtxsource::{
    InstancePool, Lookup, StreamDescriptor, StreamSource, TrackId, TrackRequest, TrackSearch,
    is_native_id, race,
};

/// Upper bound for one whole resolution
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(25);

/// Upper bound for the metadata search of a catalog identifier
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(4);

pub const DEFAULT_WARMUP_MAX_TRACKS: usize = 10;
pub const DEFAULT_WARMUP_CONCURRENCY: usize = 4;

/// Limits applied by [`Resolver::warm_up`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmUpSettings {
    /// Requests beyond this count are ignored
    pub max_tracks: usize,
    /// Resolutions running at the same time
    pub concurrency: usize,
}

impl Default for WarmUpSettings {
    fn default() -> Self {
        Self {
            max_tracks: DEFAULT_WARMUP_MAX_TRACKS,
            concurrency: DEFAULT_WARMUP_CONCURRENCY,
        }
    }
}

/// Multi-source stream resolver
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Resolver {
    pools: Vec<Arc<dyn InstancePool>>,
    fallbacks: Vec<Arc<dyn StreamSource>>,
    search: Option<Arc<dyn TrackSearch>>,
    cache: Arc<dyn ResultCache>,
    tolerance: DurationTolerance,
    deadline: Duration,
    search_timeout: Duration,
    warm_up: WarmUpSettings,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("pools", &self.pools)
            .field("fallbacks", &self.fallbacks)
            .field("search", &self.search)
            .field("cached", &self.cache.len())
            .field("tolerance", &self.tolerance)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    pub fn tolerance(&self) -> DurationTolerance {
        self.tolerance
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn warm_up_settings(&self) -> WarmUpSettings {
        self.warm_up
    }

    /// Pools plus fallback adapters
    pub fn source_count(&self) -> usize {
        self.pools.len() + self.fallbacks.len()
    }

    /// Cached descriptor for `request`, without resolving anything
    pub fn cached(&self, request: &TrackRequest) -> Option<StreamDescriptor> {
        self.cache.get(&request.cache_key())
    }

    /// Number of cached resolutions, expired ones included
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Drops expired cache entries and returns how many were removed
    pub fn sweep_cache(&self) -> usize {
        self.cache.sweep()
    }

    /// Resolves `request` into a playable stream
    ///
    /// Returns [`ResolveError::Exhausted`] when every source failed and
    /// [`ResolveError::DeadlineExceeded`] when the overall deadline expired
    /// first. Neither outcome is cached.
    pub async fn resolve(&self, request: &TrackRequest) -> Result<StreamDescriptor> {
        let key = request.cache_key();
        if let Some(descriptor) = self.cache.get(&key) {
            debug!(track = %key, source = %descriptor.source_kind, "Cache hit");
            return Ok(descriptor);
        }

        let started = Instant::now();
        let descriptor = match tokio::time::timeout(self.deadline, self.run_pipeline(request)).await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(track = %key, "Resolution abandoned after {:?}", self.deadline);
                return Err(ResolveError::DeadlineExceeded(self.deadline));
            }
        };

        info!(
            track = %key,
            source = %descriptor.source_kind,
            bitrate = descriptor.bitrate_kbps,
            "Resolved in {} ms",
            started.elapsed().as_millis()
        );
        self.cache.put(key, descriptor.clone());
        Ok(descriptor)
    }

    async fn run_pipeline(&self, request: &TrackRequest) -> Result<StreamDescriptor> {
        let effective_id = self.normalize(request).await;
        let lookup = Lookup::new(&effective_id, request);

        if let Some(descriptor) = self.race_pools(&lookup).await {
            return Ok(descriptor);
        }
        if let Some(descriptor) = self.fallback(&lookup).await {
            return Ok(descriptor);
        }

        warn!(track = %request.track_id, "All sources exhausted");
        Err(ResolveError::Exhausted)
    }

    /// Maps a catalog identifier to a native one
    ///
    /// Native identifiers pass through. On any search failure the original
    /// identifier is kept as a last-ditch key.
    async fn normalize(&self, request: &TrackRequest) -> String {
        let id = match &request.track_id {
            TrackId::Native(id) => return id.clone(),
            TrackId::Catalog { id, .. } => id,
        };

        let (Some(search), Some(query)) = (&self.search, request.search_query()) else {
            debug!(track = %request.track_id, "No search hints, keeping catalog id");
            return id.clone();
        };

        let limit = self.search_timeout.min(search.timeout());
        match race::with_timeout(limit, search.find_native_id(&query)).await {
            Ok(Some(native)) if is_native_id(&native) => {
                debug!(track = %request.track_id, native = %native, "Catalog id mapped");
                native
            }
            Ok(_) => {
                debug!(track = %request.track_id, query = %query, "Search found no match");
                id.clone()
            }
            Err(e) => {
                warn!(track = %request.track_id, "Search failed: {}", e);
                id.clone()
            }
        }
    }

    /// Races every (pool, instance) pair
    async fn race_pools(&self, lookup: &Lookup<'_>) -> Option<StreamDescriptor> {
        let video_id = lookup.effective_id;
        if self.pools.is_empty() || !is_native_id(video_id) {
            return None;
        }

        let candidates = self
            .pools
            .iter()
            .flat_map(|pool| {
                let limit = pool.instance_timeout();
                pool.instances().into_iter().map(move |instance| async move {
                    let result = race::with_timeout(limit, pool.query(&instance, video_id)).await;
                    if let Err(e) = &result {
                        debug!(source = %pool.kind(), instance = %instance, "Instance failed: {}", e);
                    }
                    result
                })
            })
            .collect::<Vec<_>>();
        let raced = candidates.len();

        let expected = lookup.request.expected_duration_seconds;
        let outcome = race::first_accepted(candidates, |descriptor: &StreamDescriptor| {
            let accepted = self.tolerance.accepts_descriptor(descriptor, lookup.request);
            if !accepted {
                debug!(
                    source = %descriptor.source_kind,
                    "Rejected candidate lasting {:?}s, expected {:?}s",
                    descriptor.duration_seconds,
                    expected
                );
            }
            accepted
        })
        .await;

        match outcome.winner {
            Some(descriptor) => {
                debug!(
                    failed = outcome.failed,
                    rejected = outcome.rejected,
                    abandoned = outcome.abandoned,
                    "Race won by {}",
                    descriptor.source_kind
                );
                Some(descriptor)
            }
            None => {
                warn!(
                    failed = outcome.failed,
                    rejected = outcome.rejected,
                    "No acceptable answer from {} pool instances",
                    raced
                );
                None
            }
        }
    }

    /// Tries the heavier adapters one after the other
    async fn fallback(&self, lookup: &Lookup<'_>) -> Option<StreamDescriptor> {
        for source in &self.fallbacks {
            if !source.accepts(lookup.request) {
                debug!(source = %source.kind(), "Skipped, request not applicable");
                continue;
            }
            match race::with_timeout(source.timeout(), source.resolve(lookup)).await {
                Ok(descriptor) => return Some(descriptor),
                Err(e) => warn!(source = %source.kind(), "Fallback failed: {}", e),
            }
        }
        None
    }

    /// Keeps the requests worth warming: uncached, deduplicated, capped
    pub fn select_for_warm_up(&self, requests: Vec<TrackRequest>) -> Vec<TrackRequest> {
        let mut seen = std::collections::HashSet::new();
        requests
            .into_iter()
            .filter(|r| seen.insert(r.cache_key()))
            .filter(|r| self.cached(r).is_none())
            .take(self.warm_up.max_tracks)
            .collect()
    }

    /// Resolves a batch ahead of playback so later requests hit the cache
    ///
    /// Cached requests are skipped and at most `max_tracks` are resolved,
    /// `concurrency` at a time. Returns the number of successful resolutions.
    pub async fn warm_up(&self, requests: Vec<TrackRequest>) -> usize {
        let selected = self.select_for_warm_up(requests);
        if selected.is_empty() {
            return 0;
        }
        debug!("Warming up {} tracks", selected.len());

        let resolved = stream::iter(selected)
            .map(|request| async move { self.resolve(&request).await.is_ok() })
            .buffer_unordered(self.warm_up.concurrency.max(1))
            .filter(|ok| futures::future::ready(*ok))
            .count()
            .await;

        info!("Warm-up resolved {} tracks", resolved);
        resolved
    }
}

/// Builder for [`Resolver`]
///
/// Pools are raced together; fallbacks are tried in insertion order.
pub struct ResolverBuilder {
    pools: Vec<Arc<dyn InstancePool>>,
    fallbacks: Vec<Arc<dyn StreamSource>>,
    search: Option<Arc<dyn TrackSearch>>,
    cache: Option<Arc<dyn ResultCache>>,
    tolerance: DurationTolerance,
    deadline: Duration,
    search_timeout: Duration,
    warm_up: WarmUpSettings,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            pools: Vec::new(),
            fallbacks: Vec::new(),
            search: None,
            cache: None,
            tolerance: DurationTolerance::default(),
            deadline: DEFAULT_DEADLINE,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            warm_up: WarmUpSettings::default(),
        }
    }
}

impl ResolverBuilder {
    pub fn pool(mut self, pool: Arc<dyn InstancePool>) -> Self {
        self.pools.push(pool);
        self
    }

    pub fn fallback(mut self, source: Arc<dyn StreamSource>) -> Self {
        self.fallbacks.push(source);
        self
    }

    pub fn search(mut self, search: Arc<dyn TrackSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn tolerance(mut self, tolerance: DurationTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn warm_up(mut self, settings: WarmUpSettings) -> Self {
        self.warm_up = settings;
        self
    }

    /// Without an explicit cache, a [`MemoryCache`] with the default TTL is used
    pub fn build(self) -> Resolver {
        let cache: Arc<dyn ResultCache> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCache::default()),
        };
        Resolver {
            pools: self.pools,
            fallbacks: self.fallbacks,
            search: self.search,
            cache,
            tolerance: self.tolerance,
            deadline: self.deadline,
            search_timeout: self.search_timeout,
            warm_up: self.warm_up,
        }
    }
}
