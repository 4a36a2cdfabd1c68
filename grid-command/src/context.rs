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
use hashbrown::HashSet;

use crate::tx::{Address, GlobalTransaction};

/// Per-invocation state handed through the chain of command handlers.
#[derive(Debug)]
pub struct InvocationContext<K>
where
    K: Key,
{
    gtx: Option<GlobalTransaction>,
    origin: Option<Address>,
    locked_keys: HashSet<K>,
}

impl<K> Default for InvocationContext<K>
where
    K: Key,
{
    fn default() -> Self {
        Self {
            gtx: None,
            origin: None,
            locked_keys: HashSet::new(),
        }
    }
}

impl<K> InvocationContext<K>
where
    K: Key,
{
    /// Context of a non-transactional, local invocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context of an invocation within `gtx`.
    pub fn for_transaction(gtx: GlobalTransaction) -> Self {
        Self {
            gtx: Some(gtx),
            ..Default::default()
        }
    }

    /// Mark the invocation as received from a remote node.
    pub fn with_origin(mut self, origin: Address) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Transaction of the invocation, if any.
    pub fn gtx(&self) -> Option<&GlobalTransaction> {
        self.gtx.as_ref()
    }

    /// `None` if the invocation is local.
    pub fn origin(&self) -> Option<&Address> {
        self.origin.as_ref()
    }

    /// Whether the invocation started on this node.
    pub fn is_origin_local(&self) -> bool {
        self.origin.is_none()
    }

    /// Keys locked on behalf of this invocation.
    pub fn locked_keys(&self) -> &HashSet<K> {
        &self.locked_keys
    }

    /// Whether `key` is locked on behalf of this invocation.
    pub fn has_locked_key(&self, key: &K) -> bool {
        self.locked_keys.contains(key)
    }

    /// Record granted locks.
    pub fn add_locked_keys(&mut self, keys: impl IntoIterator<Item = K>) {
        self.locked_keys.extend(keys);
    }

    /// Record released locks.
    pub fn remove_locked_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>) {
        keys.into_iter().for_each(|key| {
            self.locked_keys.remove(key);
        });
    }

    /// Forget all locks, e.g. after the transaction released everything it held.
    pub fn clear_locked_keys(&mut self) {
        self.locked_keys.clear();
    }
}
