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

use std::fmt::Debug;

use grid_common::code::Key;

/// Victim selection contract shared by all eviction strategies.
///
/// A strategy tracks the keys resident in one shard. The shard calls it under its own write lock, so the strategy
/// never needs internal synchronization and always agrees with the shard's entry map.
///
/// Implementations must never fail on an empty or under-bound shard: [`Eviction::pop`] simply returns `None`.
/// Equal-ranked candidates are broken deterministically, the same history always yields the same victim.
pub trait Eviction: Send + Sync + 'static {
    /// Tracked key type.
    type Key: Key;
    /// Strategy specific configuration.
    type Config: Clone + Debug + Send + Sync + 'static;

    /// Whether [`Eviction::access`] does anything.
    ///
    /// Lookups take the shard read lock when this is `false` and the write lock otherwise.
    const TRACKS_ACCESS: bool;

    /// Create an empty strategy for a shard holding up to `capacity` entries.
    fn new(capacity: usize, config: &Self::Config) -> Self
    where
        Self: Sized;

    /// Track a newly inserted key.
    fn push(&mut self, key: Self::Key);

    /// Record an access (lookup or overwrite) of a tracked key.
    fn access(&mut self, key: &Self::Key);

    /// Stop tracking a key removed outside of eviction.
    fn remove(&mut self, key: &Self::Key);

    /// Pick the next victim and stop tracking it.
    fn pop(&mut self) -> Option<Self::Key>;

    /// Count of tracked resident keys.
    fn len(&self) -> usize;

    /// Whether no key is tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all keys.
    fn clear(&mut self);
}

pub mod fifo;
pub mod lirs;
pub mod lru;
pub mod noop;
pub mod queue;
pub mod unordered;

#[cfg(test)]
pub mod test_utils;
