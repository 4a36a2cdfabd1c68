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

use crate::code::{Key, Value};

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Removed by the eviction controller to respect the capacity bound.
    Evict,
    /// Overwritten by an insertion with the same key.
    Replace,
    /// Removed explicitly.
    Remove,
    /// Dropped by a cache clear.
    Clear,
}

/// Trait for the customized event listener.
///
/// Listeners are always called outside of any cache lock, so they may call back into the cache.
pub trait EventListener: Send + Sync + 'static {
    /// Associated key type.
    type Key: Key;
    /// Associated value type.
    type Value: Value;

    /// Called when a cache entry leaves the cache with the reason.
    #[expect(unused_variables)]
    fn on_leave(&self, reason: Event, key: &Self::Key, value: &Self::Value) {}
}
