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

use grid_common::code::Key;
use hashbrown::HashMap;

use super::Eviction;

/// Bounds the shard with the least bookkeeping possible: a dense slot vector with swap-remove.
///
/// The victim is whatever occupies the last slot. All operations are `O(1)`.
#[derive(Debug)]
pub struct Unordered<K>
where
    K: Key,
{
    slots: Vec<K>,
    index: HashMap<K, usize>,
}

impl<K> Eviction for Unordered<K>
where
    K: Key,
{
    type Key = K;
    type Config = ();

    const TRACKS_ACCESS: bool = false;

    fn new(capacity: usize, _: &Self::Config) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn push(&mut self, key: Self::Key) {
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.slots.len());
        self.slots.push(key);
    }

    fn access(&mut self, _: &Self::Key) {}

    fn remove(&mut self, key: &Self::Key) {
        let Some(slot) = self.index.remove(key) else {
            return;
        };
        self.slots.swap_remove(slot);
        if let Some(moved) = self.slots.get(slot) {
            self.index.insert(moved.clone(), slot);
        }
    }

    fn pop(&mut self) -> Option<Self::Key> {
        let key = self.slots.pop()?;
        self.index.remove(&key);
        Some(key)
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}
