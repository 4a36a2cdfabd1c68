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

use super::Eviction;

/// Expose the internal order of a strategy to tests.
pub trait Dump: Eviction {
    type Output;
    fn dump(&self) -> Self::Output;
}

/// Pop until the strategy is exhausted.
pub fn drain<E: Eviction>(eviction: &mut E) -> Vec<E::Key> {
    std::iter::from_fn(|| eviction.pop()).collect()
}
