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

use std::{fmt::Debug, ops::Deref, sync::Arc};

use grid_common::code::{Key, Value};

/// [`Record`] holds a cached entry and the hash it is indexed by.
pub struct Record<K, V> {
    key: K,
    value: V,
    hash: u64,
}

impl<K, V> Debug for Record<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("key", &self.key)
            .field("hash", &self.hash)
            .finish()
    }
}

impl<K, V> Record<K, V> {
    pub fn new(key: K, value: V, hash: u64) -> Self {
        Self { key, value, hash }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// A shared handle to a cached entry.
///
/// The handle stays valid after the entry leaves the cache.
pub struct CacheEntry<K, V> {
    record: Arc<Record<K, V>>,
}

impl<K, V> CacheEntry<K, V> {
    pub(crate) fn new(record: Arc<Record<K, V>>) -> Self {
        Self { record }
    }

    /// Key of the entry.
    pub fn key(&self) -> &K {
        self.record.key()
    }

    /// Value of the entry.
    pub fn value(&self) -> &V {
        self.record.value()
    }

    /// Hash of the key, as computed by the cache hash builder.
    pub fn hash(&self) -> u64 {
        self.record.hash()
    }

    /// Whether both handles point to the same inserted entry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

impl<K, V> Clone for CacheEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
        }
    }
}

impl<K, V> Deref for CacheEntry<K, V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}

impl<K, V> Debug for CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}
