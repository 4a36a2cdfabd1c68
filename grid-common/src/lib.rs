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

//! Shared components for grid.

/// Key and value bounds, and the externalizer codec contract.
pub mod code;
/// The structured error type shared by all grid crates.
pub mod error;
/// Events reported when entries leave the cache.
pub mod event;
/// Wire primitives used by externalizers.
pub mod wire;
