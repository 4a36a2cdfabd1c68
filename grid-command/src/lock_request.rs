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

use std::fmt::Display;

use grid_common::{code::Key, error::Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    command::{TransactionBoundaryCommand, VisitableCommand, Visitor},
    context::InvocationContext,
    tx::TxBoundary,
};

/// Command id of [`LockRequest`].
///
/// Reserved: a lock request is never marshalled on its own, it always travels inside its transaction boundary.
pub const LOCK_REQUEST_COMMAND_ID: u8 = 0;

/// Whether a [`LockRequest`] acquires or releases its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    /// Lock the keys.
    Acquire,
    /// Unlock the keys.
    Release,
}

/// Acquire or release cluster-wide locks on a set of keys within a transaction boundary.
///
/// The key collection is fixed at construction. Equality and hashing cover the boundary, the keys and the mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockRequest<K>
where
    K: Key,
{
    boundary: TxBoundary,
    keys: Vec<K>,
    mode: LockMode,
}

impl<K> LockRequest<K>
where
    K: Key,
{
    /// Create a request. An empty key collection is legal and a no-op for the coordinator.
    pub fn new(boundary: TxBoundary, keys: impl IntoIterator<Item = K>, mode: LockMode) -> Self {
        Self {
            boundary,
            keys: keys.into_iter().collect(),
            mode,
        }
    }

    /// Create a request that locks `keys`.
    pub fn acquire(boundary: TxBoundary, keys: impl IntoIterator<Item = K>) -> Self {
        Self::new(boundary, keys, LockMode::Acquire)
    }

    /// Create a request that unlocks `keys`.
    pub fn release(boundary: TxBoundary, keys: impl IntoIterator<Item = K>) -> Self {
        Self::new(boundary, keys, LockMode::Release)
    }

    /// Keys in request order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Lock mode.
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Whether the request locks its keys. The complement of [`LockRequest::is_unlock`].
    pub fn is_lock(&self) -> bool {
        self.mode == LockMode::Acquire
    }

    /// Whether the request unlocks its keys. The complement of [`LockRequest::is_lock`].
    pub fn is_unlock(&self) -> bool {
        !self.is_lock()
    }
}

impl<K> VisitableCommand<K> for LockRequest<K>
where
    K: Key,
{
    fn accept_visitor<V>(&self, ctx: &mut InvocationContext<K>, visitor: &V) -> Result<V::Output>
    where
        V: Visitor<K> + ?Sized,
    {
        visitor.visit_lock_request(ctx, self)
    }

    fn command_id(&self) -> u8 {
        LOCK_REQUEST_COMMAND_ID
    }
}

impl<K> TransactionBoundaryCommand for LockRequest<K>
where
    K: Key,
{
    fn boundary(&self) -> &TxBoundary {
        &self.boundary
    }
}

impl<K> Display for LockRequest<K>
where
    K: Key,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LockRequest {{ mode: {:?}, keys: [{}], gtx: {} }}",
            self.mode,
            self.keys.iter().map(|key| format!("{key:?}")).join(", "),
            self.boundary.gtx()
        )
    }
}
