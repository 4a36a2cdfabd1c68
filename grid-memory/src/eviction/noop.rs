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

use std::marker::PhantomData;

use grid_common::code::Key;

use super::Eviction;

/// The null strategy. Tracks nothing and never yields a victim.
#[derive(Debug)]
pub struct Noop<K> {
    _marker: PhantomData<K>,
}

impl<K> Eviction for Noop<K>
where
    K: Key,
{
    type Key = K;
    type Config = ();

    const TRACKS_ACCESS: bool = false;

    fn new(_: usize, _: &Self::Config) -> Self {
        Self { _marker: PhantomData }
    }

    fn push(&mut self, _: Self::Key) {}

    fn access(&mut self, _: &Self::Key) {}

    fn remove(&mut self, _: &Self::Key) {}

    fn pop(&mut self) -> Option<Self::Key> {
        None
    }

    fn len(&self) -> usize {
        0
    }

    fn clear(&mut self) {}
}
