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

use grid_common::code::Key;

use super::{queue::SequenceQueue, Eviction};

/// Evicts the oldest inserted key. Accesses and overwrites do not refresh a key.
#[derive(Debug)]
pub struct Fifo<K>
where
    K: Key,
{
    queue: SequenceQueue<K>,
}

impl<K> Eviction for Fifo<K>
where
    K: Key,
{
    type Key = K;
    type Config = ();

    const TRACKS_ACCESS: bool = false;

    fn new(_: usize, _: &Self::Config) -> Self {
        Self {
            queue: SequenceQueue::default(),
        }
    }

    fn push(&mut self, key: Self::Key) {
        self.queue.push_back(key);
    }

    fn access(&mut self, _: &Self::Key) {}

    fn remove(&mut self, key: &Self::Key) {
        self.queue.remove(key);
    }

    fn pop(&mut self) -> Option<Self::Key> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}
