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


//! Small pieces of replicated cache metadata for grid.
//!
//! [`ReplicatedNameSet`] is a set of names guarded by a single read/write lock, with a compact binary encoding
//! registered through [`NameSetExternalizer`]. The internal set never leaves the lock: callers only see copies or
//! encoded bytes.

mod name_set;

mod prelude;
pub use prelude::*;
