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


//! grid is the concurrency and capacity core of a data-grid cache.
//!
//! It bundles three independent pieces:
//!
//! - a bounded in-memory [`Cache`] whose [`EvictionController`] keeps it at its configured capacity under
//!   concurrent writers, with an inline bound check and a background sweeper;
//! - the [`LockRequest`] command and its [`Visitor`] dispatch contract, with [`LockTable`] as the in-process lock
//!   coordinator;
//! - [`ReplicatedNameSet`], a lock-guarded set of names with a compact binary encoding.

use grid_command as command;
use grid_common as common;
use grid_memory as memory;
use grid_meta as meta;

mod prelude;
pub use prelude::*;
