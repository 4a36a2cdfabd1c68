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

use std::collections::BTreeMap;

use grid_common::code::Key;
use hashbrown::HashMap;

/// A queue of unique keys ordered by a strictly increasing sequence number.
///
/// Every (re)insertion takes a fresh sequence, so no two keys ever share a rank.
/// All operations are `O(log n)`.
#[derive(Debug)]
pub struct SequenceQueue<K>
where
    K: Key,
{
    order: BTreeMap<u64, K>,
    seqs: HashMap<K, u64>,
    next: u64,
}

impl<K> Default for SequenceQueue<K>
where
    K: Key,
{
    fn default() -> Self {
        Self {
            order: BTreeMap::new(),
            seqs: HashMap::new(),
            next: 0,
        }
    }
}

impl<K> SequenceQueue<K>
where
    K: Key,
{
    /// Append `key` at the back. A key already queued is moved to the back.
    pub fn push_back(&mut self, key: K) {
        let seq = self.next;
        self.next += 1;
        if let Some(old) = self.seqs.insert(key.clone(), seq) {
            self.order.remove(&old);
        }
        self.order.insert(seq, key);
    }

    /// Move a queued key to the back. Returns `false` if the key is not queued.
    pub fn touch(&mut self, key: &K) -> bool {
        let Some(seq) = self.seqs.get_mut(key) else {
            return false;
        };
        let fresh = self.next;
        self.next += 1;
        let old = std::mem::replace(seq, fresh);
        if let Some(key) = self.order.remove(&old) {
            self.order.insert(fresh, key);
        }
        true
    }

    /// Remove `key` wherever it is. Returns `false` if the key is not queued.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.seqs.remove(key) {
            Some(seq) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    /// Pop the key at the front.
    pub fn pop_front(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.seqs.remove(&key);
        Some(key)
    }

    /// Peek the key at the front.
    pub fn front(&self) -> Option<&K> {
        self.order.first_key_value().map(|(_, key)| key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.seqs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seqs.clear();
    }

    /// Iterate from front to back.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }
}
