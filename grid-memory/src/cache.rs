// Copyright 2026 grid Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Debug, hash::Hash, sync::Arc, time::Duration};

use ahash::RandomState;
use grid_common::{
    code::{HashBuilder, Key, Value},
    error::Result,
    event::EventListener,
};
use hashbrown::Equivalent;

use crate::{
    config::{EvictionConfig, EvictionStrategy},
    controller::EvictionController,
    eviction::{fifo::Fifo, lirs::Lirs, lru::Lru, noop::Noop, unordered::Unordered},
    metrics::Metrics,
    raw::{RawCache, RawCacheConfig},
    record::CacheEntry,
};

/// Cache with LRU eviction.
pub type LruCache<K, V, S = RandomState> = RawCache<Lru<K>, V, S>;
/// Cache with LIRS eviction.
pub type LirsCache<K, V, S = RandomState> = RawCache<Lirs<K>, V, S>;
/// Cache with FIFO eviction.
pub type FifoCache<K, V, S = RandomState> = RawCache<Fifo<K>, V, S>;
/// Cache with unordered eviction.
pub type UnorderedCache<K, V, S = RandomState> = RawCache<Unordered<K>, V, S>;
/// Cache without eviction.
pub type UnboundedCache<K, V, S = RandomState> = RawCache<Noop<K>, V, S>;

/// Default shard count with lock striping.
pub const DEFAULT_SHARDS: usize = 16;

/// In-memory cache builder.
pub struct CacheBuilder<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    config: EvictionConfig,
    shards: usize,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
    hash_builder: S,
}

impl<K, V> CacheBuilder<K, V, RandomState>
where
    K: Key,
    V: Value,
{
    /// Create a builder of an LRU cache bounded to `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self {
            config: EvictionConfig {
                max_entries,
                strategy: EvictionStrategy::Lru,
                ..Default::default()
            },
            shards: DEFAULT_SHARDS,
            event_listener: None,
            hash_builder: RandomState::default(),
        }
    }
}

impl<K, V, S> CacheBuilder<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    /// Replace the whole eviction configuration, including the bound.
    pub fn with_eviction_config(mut self, config: EvictionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the eviction strategy.
    pub fn with_strategy(mut self, strategy: EvictionStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the background sweep period. [`Duration::ZERO`] disables the sweep.
    pub fn with_wake_up_interval(mut self, interval: Duration) -> Self {
        self.config.wake_up_interval_millis = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// Partition entries over [`CacheBuilder::with_shards`] independently locked shards.
    ///
    /// Without striping the cache has a single shard and ordered strategies are exact.
    pub fn with_lock_striping(mut self, use_lock_striping: bool) -> Self {
        self.config.use_lock_striping = use_lock_striping;
        self
    }

    /// Set the shard count used with lock striping.
    ///
    /// The default value is 16.
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Set the listener notified of leaving entries.
    pub fn with_event_listener(mut self, event_listener: Arc<dyn EventListener<Key = K, Value = V>>) -> Self {
        self.event_listener = Some(event_listener);
        self
    }

    /// Set the hash builder.
    pub fn with_hash_builder<OS>(self, hash_builder: OS) -> CacheBuilder<K, V, OS>
    where
        OS: HashBuilder,
    {
        CacheBuilder {
            config: self.config,
            shards: self.shards,
            event_listener: self.event_listener,
            hash_builder,
        }
    }

    /// Validate the configuration, build the cache and start its eviction controller.
    pub fn build(self) -> Result<Cache<K, V, S>> {
        let shards = if self.config.use_lock_striping { self.shards } else { 1 };
        let strategy = self.config.strategy;
        let lirs = self.config.lirs.clone();
        let controller = EvictionController::new(self.config)?;

        tracing::debug!(
            "[cache]: build cache, strategy: {strategy}, max entries: {}, shards: {shards}",
            controller.config().max_entries
        );

        let metrics = Arc::new(Metrics::default());
        let event_listener = self.event_listener;
        let hash_builder = self.hash_builder;

        macro_rules! raw {
            ($eviction_config:expr) => {
                RawCache::new(
                    RawCacheConfig {
                        shards,
                        eviction_config: $eviction_config,
                        hash_builder,
                        event_listener,
                        metrics,
                    },
                    controller,
                )?
            };
        }

        let cache = match strategy {
            EvictionStrategy::Lru => Cache::Lru(raw!(())),
            EvictionStrategy::Lirs => Cache::Lirs(raw!(lirs)),
            EvictionStrategy::Fifo => Cache::Fifo(raw!(())),
            EvictionStrategy::Unordered => Cache::Unordered(raw!(())),
            EvictionStrategy::None => Cache::Unbounded(raw!(())),
        };
        Ok(cache)
    }
}

/// A bounded in-memory cache. Cheap to clone, all clones share the same entries.
pub enum Cache<K, V, S = RandomState>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    /// LRU eviction.
    Lru(LruCache<K, V, S>),
    /// LIRS eviction.
    Lirs(LirsCache<K, V, S>),
    /// FIFO eviction.
    Fifo(FifoCache<K, V, S>),
    /// Unordered eviction.
    Unordered(UnorderedCache<K, V, S>),
    /// No eviction.
    Unbounded(UnboundedCache<K, V, S>),
}

macro_rules! dispatch {
    ($cache:expr, $raw:ident => $body:expr) => {
        match $cache {
            Cache::Lru($raw) => $body,
            Cache::Lirs($raw) => $body,
            Cache::Fifo($raw) => $body,
            Cache::Unordered($raw) => $body,
            Cache::Unbounded($raw) => $body,
        }
    };
}

impl<K, V, S> Debug for Cache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        dispatch!(self, cache => f.debug_tuple("Cache").field(cache).finish())
    }
}

impl<K, V, S> Clone for Cache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn clone(&self) -> Self {
        match self {
            Self::Lru(cache) => Self::Lru(cache.clone()),
            Self::Lirs(cache) => Self::Lirs(cache.clone()),
            Self::Fifo(cache) => Self::Fifo(cache.clone()),
            Self::Unordered(cache) => Self::Unordered(cache.clone()),
            Self::Unbounded(cache) => Self::Unbounded(cache.clone()),
        }
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    /// Insert or overwrite an entry.
    ///
    /// Overwriting is not growth and never evicts. Growing the cache past its bound evicts a small batch inline.
    pub fn insert(&self, key: K, value: V) -> CacheEntry<K, V> {
        dispatch!(self, cache => cache.insert(key, value))
    }

    /// Look up an entry. Counts as an access for LRU and LIRS.
    pub fn get<Q>(&self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        dispatch!(self, cache => cache.get(key))
    }

    /// Membership test. Does not count as an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        dispatch!(self, cache => cache.contains(key))
    }

    /// Remove an entry explicitly.
    pub fn remove<Q>(&self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        dispatch!(self, cache => cache.remove(key))
    }

    /// Remove all entries.
    pub fn clear(&self) {
        dispatch!(self, cache => cache.clear())
    }

    /// Relaxed entry count.
    pub fn len(&self) -> usize {
        dispatch!(self, cache => cache.len())
    }

    /// Whether the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        dispatch!(self, cache => cache.is_empty())
    }

    /// The entry bound, `None` if the cache is unbounded.
    pub fn max_entries(&self) -> Option<usize> {
        dispatch!(self, cache => cache.max_entries())
    }

    /// The eviction strategy.
    pub fn strategy(&self) -> EvictionStrategy {
        self.config().strategy
    }

    /// The eviction configuration the cache was built with.
    pub fn config(&self) -> &EvictionConfig {
        dispatch!(self, cache => cache.controller().config())
    }

    /// Count of shards.
    pub fn shards(&self) -> usize {
        dispatch!(self, cache => cache.shards())
    }

    /// Operation counters.
    pub fn metrics(&self) -> &Metrics {
        dispatch!(self, cache => cache.metrics().as_ref())
    }

    /// Evict down to the bound on the calling thread. Returns the count of evicted entries.
    pub fn sweep(&self) -> usize {
        dispatch!(self, cache => cache.sweep())
    }

    /// Stop the eviction controller and join its sweeper. Idempotent.
    pub fn stop(&self) {
        dispatch!(self, cache => cache.stop())
    }

    /// Whether the eviction controller is running.
    pub fn is_running(&self) -> bool {
        dispatch!(self, cache => cache.is_running())
    }
}
