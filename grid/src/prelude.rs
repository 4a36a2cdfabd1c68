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


pub use crate::{
    command::{
        Address, GlobalTransaction, InvocationContext, LockMode, LockRequest, LockTable, TransactionBoundaryCommand,
        TxBoundary, VisitableCommand, Visitor, DEFAULT_LOCK_STRIPES, LOCK_REQUEST_COMMAND_ID,
    },
    common::{
        code::{Externalizer, HashBuilder, Key, Value},
        error::{Error, ErrorKind, Result},
        event::{Event, EventListener},
    },
    memory::{
        Cache, CacheBuilder, CacheEntry, EvictionConfig, EvictionController, EvictionStrategy, FifoCache, LirsCache,
        LirsConfig, LruCache, Metrics, MetricsSnapshot, UnboundedCache, UnorderedCache, DEFAULT_SHARDS,
        INLINE_EVICTION_BATCH,
    },
    meta::{NameSetExternalizer, ReplicatedNameSet, NAME_SET_EXTERNALIZER_ID},
};
