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

//! A size-bounded in-memory cache for grid.
//!
//! The cache stays near its configured entry bound while many threads insert concurrently:
//!
//! - every insertion that grows the cache runs an inline bound check that evicts a small batch of victims;
//! - a background sweeper wakes up periodically and evicts down to the exact bound.
//!
//! Victim selection is delegated to a pluggable [`Eviction`] strategy (LRU, LIRS, FIFO, unordered, or none).

mod cache;
mod config;
mod controller;
mod eviction;
mod metrics;
mod raw;
mod record;

mod prelude;
pub use prelude::*;
