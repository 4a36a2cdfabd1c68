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

use std::sync::Arc;

use grid_common::{code::Key, error::Result};

use crate::{context::InvocationContext, lock_request::LockRequest, tx::TxBoundary};

/// A handler that can process commands, one method per command kind.
///
/// Any number of handlers may implement this trait. Commands never know which one is active.
pub trait Visitor<K>
where
    K: Key,
{
    /// Result of a successful visit.
    type Output;

    /// Process a [`LockRequest`].
    fn visit_lock_request(&self, ctx: &mut InvocationContext<K>, cmd: &LockRequest<K>) -> Result<Self::Output>;
}

impl<K, V> Visitor<K> for Arc<V>
where
    K: Key,
    V: Visitor<K> + ?Sized,
{
    type Output = V::Output;

    fn visit_lock_request(&self, ctx: &mut InvocationContext<K>, cmd: &LockRequest<K>) -> Result<Self::Output> {
        self.as_ref().visit_lock_request(ctx, cmd)
    }
}

/// A command dispatched through a [`Visitor`].
pub trait VisitableCommand<K>
where
    K: Key,
{
    /// Hand the command to the matching method of `visitor`.
    ///
    /// Errors raised by the visitor are returned unchanged.
    fn accept_visitor<V>(&self, ctx: &mut InvocationContext<K>, visitor: &V) -> Result<V::Output>
    where
        V: Visitor<K> + ?Sized;

    /// Wire identifier of the command.
    fn command_id(&self) -> u8;
}

/// A command scoped to a transaction boundary.
pub trait TransactionBoundaryCommand {
    /// Transaction attributes of the command.
    fn boundary(&self) -> &TxBoundary;
}
