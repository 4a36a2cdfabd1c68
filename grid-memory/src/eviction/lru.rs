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

/// Evicts the least recently accessed key.
#[derive(Debug)]
pub struct Lru<K>
where
    K: Key,
{
    // front: least recent
    queue: SequenceQueue<K>,
}

impl<K> Eviction for Lru<K>
where
    K: Key,
{
    type Key = K;
    type Config = ();

    const TRACKS_ACCESS: bool = true;

    fn new(_: usize, _: &Self::Config) -> Self {
        Self {
            queue: SequenceQueue::default(),
        }
    }

    fn push(&mut self, key: Self::Key) {
        self.queue.push_back(key);
    }

    fn access(&mut self, key: &Self::Key) {
        self.queue.touch(key);
    }

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

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::eviction::test_utils::{drain, Dump};

    impl<K> Dump for Lru<K>
    where
        K: Key,
    {
        type Output = Vec<K>;

        fn dump(&self) -> Self::Output {
            self.queue.iter().cloned().collect_vec()
        }
    }

    #[test]
    fn test_lru() {
        let mut lru = Lru::<u64>::new(8, &());

        (0..5).for_each(|i| lru.push(i));
        assert_eq!(lru.dump(), vec![0, 1, 2, 3, 4]);

        lru.access(&0);
        lru.access(&2);
        assert_eq!(lru.dump(), vec![1, 3, 4, 0, 2]);

        // untracked keys are ignored
        lru.access(&42);
        lru.remove(&42);

        assert_eq!(lru.pop(), Some(1));
        lru.remove(&4);
        assert_eq!(drain(&mut lru), vec![3, 0, 2]);
        assert_eq!(lru.pop(), None);
    }

    #[test]
    fn test_lru_deterministic() {
        let run = || {
            let mut lru = Lru::<String>::new(8, &());
            ["a", "b", "c", "d"].iter().for_each(|k| lru.push(k.to_string()));
            lru.access(&"b".to_string());
            lru.access(&"a".to_string());
            drain(&mut lru)
        };
        assert_eq!(run(), run());
        assert_eq!(run(), vec!["c", "d", "b", "a"]);
    }
}
