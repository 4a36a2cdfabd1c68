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

use std::{
    fmt::Debug,
    hash::Hash,
    sync::{
        atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering},
        Arc,
    },
};

use grid_common::{
    code::{HashBuilder, Value},
    error::{Error, Result},
    event::{Event, EventListener},
};
use hashbrown::{Equivalent, HashTable};
use itertools::Itertools;
use parking_lot::RwLock;

use crate::{
    controller::{EvictionController, Sweep},
    eviction::Eviction,
    metrics::Metrics,
    record::{CacheEntry, Record},
};

/// Victims evicted at most by the inline check of a single insertion.
pub const INLINE_EVICTION_BATCH: usize = 8;

type Shared<E, V> = Arc<Record<<E as Eviction>::Key, V>>;

/// Configurations of [`RawCache`] besides the eviction controller.
pub struct RawCacheConfig<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    /// Count of independently locked shards.
    pub shards: usize,
    /// Strategy specific configuration, shared by all shards.
    pub eviction_config: E::Config,
    /// Hash builder for shard selection and lookups.
    pub hash_builder: S,
    /// Listener notified of leaving entries.
    pub event_listener: Option<Arc<dyn EventListener<Key = E::Key, Value = V>>>,
    /// Counters shared with the owner.
    pub metrics: Arc<Metrics>,
}

struct RawCacheShard<E, V>
where
    E: Eviction,
    V: Value,
{
    table: HashTable<Shared<E, V>>,
    eviction: E,
}

impl<E, V> RawCacheShard<E, V>
where
    E: Eviction,
    V: Value,
{
    /// Insert or overwrite. Returns the overwritten record.
    fn emplace(&mut self, record: Shared<E, V>) -> Option<Shared<E, V>> {
        let hash = record.hash();
        match self.table.find_mut(hash, |r| r.key() == record.key()) {
            Some(slot) => {
                let old = std::mem::replace(slot, record);
                self.eviction.access(old.key());
                Some(old)
            }
            None => {
                self.eviction.push(record.key().clone());
                self.table.insert_unique(hash, record, |r| r.hash());
                None
            }
        }
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::shard::remove"))]
    fn remove<Q>(&mut self, hash: u64, key: &Q) -> Option<Shared<E, V>>
    where
        Q: Hash + Equivalent<E::Key> + ?Sized,
    {
        let (record, _) = self.table.find_entry(hash, |r| key.equivalent(r.key())).ok()?.remove();
        self.eviction.remove(record.key());
        Some(record)
    }

    #[cfg_attr(
        feature = "tracing",
        fastrace::trace(name = "grid::memory::raw::shard::get_immutable")
    )]
    fn get_immutable<Q>(&self, hash: u64, key: &Q) -> Option<Shared<E, V>>
    where
        Q: Hash + Equivalent<E::Key> + ?Sized,
    {
        self.table.find(hash, |r| key.equivalent(r.key())).cloned()
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::shard::get_mutable"))]
    fn get_mutable<Q>(&mut self, hash: u64, key: &Q) -> Option<Shared<E, V>>
    where
        Q: Hash + Equivalent<E::Key> + ?Sized,
    {
        let record = self.table.find(hash, |r| key.equivalent(r.key())).cloned()?;
        self.eviction.access(record.key());
        Some(record)
    }

    /// Remove the next victim of the strategy. Victims already gone from the table are skipped.
    fn evict<S>(&mut self, hash_builder: &S) -> Option<Shared<E, V>>
    where
        S: HashBuilder,
    {
        while let Some(key) = self.eviction.pop() {
            let hash = hash_builder.hash_one(&key);
            if let Ok(entry) = self.table.find_entry(hash, |r| r.key() == &key) {
                return Some(entry.remove().0);
            }
        }
        None
    }

    fn clear(&mut self, garbages: &mut Vec<Shared<E, V>>) -> usize {
        self.eviction.clear();
        let before = garbages.len();
        garbages.extend(self.table.drain());
        garbages.len() - before
    }
}

struct RawCacheInner<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    shards: Vec<RwLock<RawCacheShard<E, V>>>,

    /// `None` if the cache is unbounded.
    max_entries: Option<usize>,
    /// Live entries minus in-flight eviction claims.
    ///
    /// Only changed with the owning shard locked, except by claims.
    len: AtomicIsize,
    /// Shard the next sweep starts at.
    cursor: AtomicUsize,
    running: Arc<AtomicBool>,

    hash_builder: S,
    metrics: Arc<Metrics>,
    event_listener: Option<Arc<dyn EventListener<Key = E::Key, Value = V>>>,
}

impl<E, V, S> RawCacheInner<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    fn shard(&self, hash: u64) -> usize {
        // Low bits are left to the bucket index of the shard table.
        (hash >> 32) as usize % self.shards.len()
    }

    fn notify(&self, event: Event, records: impl IntoIterator<Item = Shared<E, V>>) {
        if let Some(listener) = self.event_listener.as_ref() {
            for record in records {
                listener.on_leave(event, record.key(), record.value());
            }
        }
    }

    /// Evict until the cache is within its bound or `limit` victims are evicted.
    ///
    /// Every victim is claimed before it is removed, so concurrent callers never evict below the bound. The search
    /// starts at shard `start` and walks the others round-robin.
    fn evict_overflow(&self, start: usize, limit: usize) -> Vec<Shared<E, V>> {
        let Some(max) = self.max_entries else {
            return vec![];
        };
        let max = isize::try_from(max).unwrap_or(isize::MAX);

        let mut evicted = vec![];
        while evicted.len() < limit {
            let claimed = self
                .len
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |len| (len > max).then_some(len - 1))
                .is_ok();
            if !claimed {
                break;
            }
            match self.pop_any(start) {
                Some(record) => evicted.push(record),
                None => {
                    // Raced with removals, nothing left to evict.
                    self.len.fetch_add(1, Ordering::AcqRel);
                    break;
                }
            }
        }
        evicted
    }

    fn pop_any(&self, start: usize) -> Option<Shared<E, V>> {
        let shards = self.shards.len();
        (0..shards).find_map(|i| self.shards[(start + i) % shards].write().evict(&self.hash_builder))
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::inner::clear"))]
    fn clear(&self) {
        let mut garbages = vec![];

        for shard in self.shards.iter() {
            let mut shard = shard.write();
            let cleared = shard.clear(&mut garbages);
            self.len.fetch_sub(cleared as isize, Ordering::AcqRel);
        }

        // Notify out of the lock critical section.
        self.notify(Event::Clear, garbages);
    }
}

impl<E, V, S> Sweep for RawCacheInner<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::inner::sweep"))]
    fn sweep(&self) -> usize {
        if !self.running.load(Ordering::Acquire) {
            return 0;
        }
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % self.shards.len();
        let evicted = self.evict_overflow(start, usize::MAX);
        let count = evicted.len();

        self.metrics.sweep(1);
        self.metrics.evict(count as u64);
        self.notify(Event::Evict, evicted);
        count
    }
}

impl<E, V, S> Drop for RawCacheInner<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    fn drop(&mut self) {
        self.clear();
    }
}

/// A sharded bounded cache with a fixed eviction strategy `E`.
///
/// Cheap to clone. The controller stops when the last handle is dropped.
pub struct RawCache<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    inner: Arc<RawCacheInner<E, V, S>>,
    controller: Arc<EvictionController>,
}

impl<E, V, S> Debug for RawCache<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawCache")
            .field("shards", &self.inner.shards.len())
            .field("len", &self.len())
            .field("controller", &self.controller)
            .finish()
    }
}

impl<E, V, S> Clone for RawCache<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<E, V, S> RawCache<E, V, S>
where
    E: Eviction,
    V: Value,
    S: HashBuilder,
{
    /// Create the cache and start the sweeper of `controller` on it.
    pub fn new(config: RawCacheConfig<E, V, S>, controller: EvictionController) -> Result<Self> {
        if config.shards == 0 {
            return Err(Error::config("shards must be greater than zero").with_context("shards", config.shards));
        }

        let eviction = controller.config();
        let max_entries = eviction.strategy.is_enabled().then_some(eviction.max_entries);
        let shard_capacity = max_entries.map(|max| max.div_ceil(config.shards)).unwrap_or_default();

        let shards = (0..config.shards)
            .map(|_| RawCacheShard {
                table: HashTable::new(),
                eviction: E::new(shard_capacity, &config.eviction_config),
            })
            .map(RwLock::new)
            .collect_vec();

        let inner = Arc::new(RawCacheInner {
            shards,
            max_entries,
            len: AtomicIsize::new(0),
            cursor: AtomicUsize::new(0),
            running: controller.running(),
            hash_builder: config.hash_builder,
            metrics: config.metrics,
            event_listener: config.event_listener,
        });

        let target: Arc<dyn Sweep> = inner.clone();
        controller.start(Arc::downgrade(&target))?;

        Ok(Self {
            inner,
            controller: Arc::new(controller),
        })
    }

    /// Insert or overwrite an entry. Growing the cache runs the inline bound check.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::insert"))]
    pub fn insert(&self, key: E::Key, value: V) -> CacheEntry<E::Key, V> {
        let hash = self.inner.hash_builder.hash_one(&key);
        let record = Arc::new(Record::new(key, value, hash));
        let shard = self.inner.shard(hash);

        let replaced = {
            let mut guard = self.inner.shards[shard].write();
            let replaced = guard.emplace(record.clone());
            if replaced.is_none() {
                self.inner.len.fetch_add(1, Ordering::AcqRel);
            }
            replaced
        };

        match replaced {
            Some(old) => {
                self.inner.metrics.replace(1);
                self.inner.notify(Event::Replace, Some(old));
            }
            None => {
                self.inner.metrics.insert(1);
                if self.inner.running.load(Ordering::Acquire) {
                    let evicted = self.inner.evict_overflow(shard, INLINE_EVICTION_BATCH);
                    self.inner.metrics.evict(evicted.len() as u64);
                    self.inner.notify(Event::Evict, evicted);
                }
            }
        }

        CacheEntry::new(record)
    }

    /// Look up an entry and record the access.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::get"))]
    pub fn get<Q>(&self, key: &Q) -> Option<CacheEntry<E::Key, V>>
    where
        Q: Hash + Equivalent<E::Key> + ?Sized,
    {
        let hash = self.inner.hash_builder.hash_one(key);
        let shard = &self.inner.shards[self.inner.shard(hash)];

        let record = if E::TRACKS_ACCESS {
            shard.write().get_mutable(hash, key)
        } else {
            shard.read().get_immutable(hash, key)
        };

        match record {
            Some(record) => {
                self.inner.metrics.hit(1);
                Some(CacheEntry::new(record))
            }
            None => {
                self.inner.metrics.miss(1);
                None
            }
        }
    }

    /// Membership test. Does not count as an access.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::contains"))]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<E::Key> + ?Sized,
    {
        let hash = self.inner.hash_builder.hash_one(key);
        self.inner.shards[self.inner.shard(hash)]
            .read()
            .get_immutable(hash, key)
            .is_some()
    }

    /// Remove an entry explicitly.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "grid::memory::raw::remove"))]
    pub fn remove<Q>(&self, key: &Q) -> Option<CacheEntry<E::Key, V>>
    where
        Q: Hash + Equivalent<E::Key> + ?Sized,
    {
        let hash = self.inner.hash_builder.hash_one(key);

        let record = {
            let mut shard = self.inner.shards[self.inner.shard(hash)].write();
            let record = shard.remove(hash, key)?;
            self.inner.len.fetch_sub(1, Ordering::AcqRel);
            record
        };

        self.inner.metrics.remove(1);
        self.inner.notify(Event::Remove, Some(record.clone()));
        Some(CacheEntry::new(record))
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Relaxed entry count. Entries being evicted concurrently may already be excluded.
    pub fn len(&self) -> usize {
        self.inner.len.load(Ordering::Relaxed).max(0) as usize
    }

    /// Whether [`RawCache::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a sweep on the calling thread. Returns the count of evicted entries.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    /// `None` if the cache is unbounded.
    pub fn max_entries(&self) -> Option<usize> {
        self.inner.max_entries
    }

    /// Count of shards.
    pub fn shards(&self) -> usize {
        self.inner.shards.len()
    }

    /// Operation counters.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Hash builder of the cache.
    pub fn hash_builder(&self) -> &S {
        &self.inner.hash_builder
    }

    /// Eviction controller of the cache.
    pub fn controller(&self) -> &EvictionController {
        &self.controller
    }

    /// Stop the eviction controller. The cache stays usable but unbounded.
    pub fn stop(&self) {
        self.controller.stop();
    }

    /// Whether the eviction controller is running.
    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ahash::RandomState;
    use parking_lot::Mutex;
    use rand::Rng;

    use super::*;
    use crate::{
        config::{EvictionConfig, EvictionStrategy},
        eviction::{fifo::Fifo, lru::Lru, noop::Noop, unordered::Unordered},
    };

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<(Event, u64, u64)>>);

    impl EventListener for Recorder {
        type Key = u64;
        type Value = u64;

        fn on_leave(&self, reason: Event, key: &u64, value: &u64) {
            self.0.lock().push((reason, *key, *value));
        }
    }

    impl Recorder {
        fn take(&self, event: Event) -> Vec<u64> {
            let mut events = self.0.lock();
            let keys = events.iter().filter(|(e, _, _)| *e == event).map(|(_, k, _)| *k).collect_vec();
            events.retain(|(e, _, _)| *e != event);
            keys
        }
    }

    fn cache<E>(
        strategy: EvictionStrategy,
        max_entries: usize,
        shards: usize,
        wake_up_interval_millis: i64,
        listener: Option<Arc<Recorder>>,
    ) -> RawCache<E, u64, RandomState>
    where
        E: Eviction<Key = u64, Config = ()>,
    {
        let controller = EvictionController::new(EvictionConfig {
            max_entries,
            wake_up_interval_millis,
            strategy,
            ..Default::default()
        })
        .unwrap();
        RawCache::new(
            RawCacheConfig {
                shards,
                eviction_config: (),
                hash_builder: RandomState::default(),
                event_listener: listener.map(|l| l as Arc<dyn EventListener<Key = u64, Value = u64>>),
                metrics: Arc::new(Metrics::default()),
            },
            controller,
        )
        .unwrap()
    }

    fn usage<E, V, S>(cache: &RawCache<E, V, S>) -> usize
    where
        E: Eviction,
        V: Value,
        S: HashBuilder,
    {
        cache.inner.shards.iter().map(|shard| shard.read().table.len()).sum()
    }

    #[test]
    fn test_zero_shards() {
        let controller = EvictionController::new(EvictionConfig::default()).unwrap();
        let res = RawCache::<Noop<u64>, u64, RandomState>::new(
            RawCacheConfig {
                shards: 0,
                eviction_config: (),
                hash_builder: RandomState::default(),
                event_listener: None,
                metrics: Arc::new(Metrics::default()),
            },
            controller,
        );
        assert!(res.is_err());
    }

    #[test_log::test]
    fn test_insert_replace_remove() {
        let recorder = Arc::new(Recorder::default());
        let cache = cache::<Lru<u64>>(EvictionStrategy::Lru, 16, 4, 0, Some(recorder.clone()));

        let e = cache.insert(1, 10);
        assert_eq!((*e.key(), *e.value()), (1, 10));
        cache.insert(2, 20);
        assert_eq!(cache.len(), 2);

        // replace is not growth
        let e = cache.insert(1, 11);
        assert_eq!(*e, 11);
        assert_eq!(cache.len(), 2);
        assert_eq!(recorder.take(Event::Replace), vec![1]);

        assert_eq!(cache.get(&1).map(|e| *e), Some(11));
        assert!(cache.get(&3).is_none());
        assert!(cache.contains(&2));

        assert_eq!(cache.remove(&2).map(|e| *e), Some(20));
        assert!(cache.remove(&2).is_none());
        assert_eq!(recorder.take(Event::Remove), vec![2]);
        assert_eq!(cache.len(), 1);
        assert_eq!(usage(&cache), 1);

        let metrics = cache.metrics().snapshot();
        assert_eq!((metrics.insert, metrics.replace), (2, 1));
        assert_eq!((metrics.hit, metrics.miss, metrics.remove), (1, 1, 1));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(recorder.take(Event::Clear), vec![1]);
    }

    #[test_log::test]
    fn test_inline_eviction_lru() {
        let recorder = Arc::new(Recorder::default());
        let cache = cache::<Lru<u64>>(EvictionStrategy::Lru, 4, 1, 0, Some(recorder.clone()));

        (0..4).for_each(|i| {
            cache.insert(i, i);
        });
        cache.get(&0);
        cache.insert(4, 4);

        assert_eq!(recorder.take(Event::Evict), vec![1]);
        assert_eq!(cache.len(), 4);
        assert!(cache.contains(&0));
        assert_eq!(cache.metrics().snapshot().evict, 1);

        (5..20).for_each(|i| {
            cache.insert(i, i);
            assert_eq!(cache.len(), 4);
        });
        assert!((16..20).all(|i| cache.contains(&i)));
    }

    #[test_log::test]
    fn test_inline_eviction_fifo_ignores_access() {
        let cache = cache::<Fifo<u64>>(EvictionStrategy::Fifo, 2, 1, 0, None);
        cache.insert(0, 0);
        cache.insert(1, 1);
        cache.get(&0);
        cache.insert(0, 100);
        cache.insert(2, 2);
        assert!(!cache.contains(&0));
        assert!(cache.contains(&1) && cache.contains(&2));
    }

    #[test_log::test]
    fn test_unbounded() {
        let cache = cache::<Noop<u64>>(EvictionStrategy::None, 0, 4, 10, None);
        assert_eq!(cache.max_entries(), None);
        (0..1000).for_each(|i| {
            cache.insert(i, i);
        });
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.sweep(), 0);
        assert_eq!(usage(&cache), 1000);
    }

    #[test_log::test]
    fn test_concurrent_writers_never_over_evict() {
        const MAX: usize = 64;
        let cache = cache::<Unordered<u64>>(EvictionStrategy::Unordered, MAX, 8, 0, None);

        let handles = (0..16)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    let mut rng = rand::rng();
                    for i in 0..2000u64 {
                        cache.insert((t << 32) | i, i);
                        if rng.random_bool(0.05) {
                            cache.get(&((t << 32) | rng.random_range(0..=i)));
                        }
                    }
                })
            })
            .collect_vec();
        handles.into_iter().for_each(|handle| handle.join().unwrap());

        assert!(usage(&cache) >= MAX);
        cache.sweep();
        assert_eq!(cache.len(), MAX);
        assert_eq!(usage(&cache), MAX);

        let metrics = cache.metrics().snapshot();
        assert_eq!(metrics.insert - metrics.evict, MAX as u64);
    }

    #[test_log::test]
    fn test_sweeper_restores_bound() {
        let cache = cache::<Fifo<u64>>(EvictionStrategy::Fifo, 8, 2, 10, None);
        // Bypass the inline check to simulate raced writers.
        for i in 0..32u64 {
            let hash = cache.inner.hash_builder.hash_one(i);
            let mut shard = cache.inner.shards[cache.inner.shard(hash)].write();
            shard.emplace(Arc::new(Record::new(i, i, hash)));
            cache.inner.len.fetch_add(1, Ordering::AcqRel);
        }
        assert_eq!(cache.len(), 32);

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while cache.len() > 8 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(cache.len(), 8);
        assert_eq!(usage(&cache), 8);
        assert!(cache.metrics().snapshot().sweep > 0);
    }

    #[test_log::test]
    fn test_stopped_cache_stops_evicting() {
        let cache = cache::<Lru<u64>>(EvictionStrategy::Lru, 2, 1, 10, None);
        let clone = cache.clone();
        clone.stop();
        assert!(!cache.is_running());

        (0..10).for_each(|i| {
            cache.insert(i, i);
        });
        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.len(), 10);
    }

    #[test_log::test]
    fn test_eviction_races_with_remove_and_clear() {
        use std::sync::atomic::AtomicBool;

        const MAX: usize = 64;
        let recorder = Arc::new(Recorder::default());
        let cache = cache::<Lru<u64>>(EvictionStrategy::Lru, MAX, 4, 0, Some(recorder.clone()));
        let done = Arc::new(AtomicBool::new(false));

        let writers = (0..4u64)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..5000u64 {
                        cache.insert((t << 32) | i, i);
                    }
                })
            })
            .collect_vec();
        let removers = (0..4u64)
            .map(|_| {
                let cache = cache.clone();
                let done = done.clone();
                std::thread::spawn(move || {
                    let mut rng = rand::rng();
                    while !done.load(Ordering::Acquire) {
                        let key = (rng.random_range(0..4u64) << 32) | rng.random_range(0..5000u64);
                        cache.remove(&key);
                    }
                })
            })
            .collect_vec();
        let clearer = {
            let cache = cache.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    cache.clear();
                    std::thread::sleep(Duration::from_millis(1));
                }
            })
        };
        let sweeper = {
            let cache = cache.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    cache.sweep();
                }
            })
        };

        writers.into_iter().for_each(|handle| handle.join().unwrap());
        done.store(true, Ordering::Release);
        removers.into_iter().for_each(|handle| handle.join().unwrap());
        clearer.join().unwrap();
        sweeper.join().unwrap();

        assert!(cache.inner.len.load(Ordering::Acquire) >= 0);
        assert_eq!(cache.len(), usage(&cache));

        cache.sweep();
        assert!(cache.len() <= MAX);
        assert_eq!(cache.len(), usage(&cache));

        // every insert left through exactly one path or is still cached
        let left = [Event::Evict, Event::Remove, Event::Clear]
            .into_iter()
            .map(|event| recorder.take(event).len())
            .sum::<usize>();
        assert_eq!(left + cache.len(), 4 * 5000);
    }
}
