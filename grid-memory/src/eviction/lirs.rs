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

use grid_common::{
    code::Key,
    error::{Error, ErrorKind, Result},
};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{queue::SequenceQueue, Eviction};

/// LIRS eviction configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LirsConfig {
    /// Share of the shard capacity reserved for resident cold (HIR) entries.
    ///
    /// Must be in `(0, 1)`. At least one slot is always reserved.
    pub hir_ratio: f64,
}

impl Default for LirsConfig {
    fn default() -> Self {
        Self { hir_ratio: 0.01 }
    }
}

impl LirsConfig {
    /// Reject a ratio outside `(0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if !(self.hir_ratio > 0.0 && self.hir_ratio < 1.0) {
            return Err(Error::new(ErrorKind::Config, "lirs hir ratio must be in (0, 1)")
                .with_context("hir_ratio", self.hir_ratio));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// Hot, resident, always in the stack.
    Lir,
    /// Cold and resident, always in the cold queue, maybe in the stack.
    ResidentHir,
    /// Evicted but still remembered by the stack.
    Ghost,
}

/// Low inter-reference recency set eviction.
///
/// Keys re-referenced while they are still remembered by the recency stack become hot (LIR). Everything else stays
/// cold (HIR) and is evicted first, so a long scan of one-shot keys cannot flush the hot set.
///
/// The stack bottom is always a LIR key. Ghost keys are bounded by the shard capacity.
#[derive(Debug)]
pub struct Lirs<K>
where
    K: Key,
{
    // front: bottom, back: top
    stack: SequenceQueue<K>,
    // front: next victim
    cold: SequenceQueue<K>,
    ghosts: SequenceQueue<K>,
    status: HashMap<K, Status>,

    lir_count: usize,
    lir_capacity: usize,
    ghost_capacity: usize,
}

impl<K> Lirs<K>
where
    K: Key,
{
    fn promote(&mut self, key: &K) {
        self.status.insert(key.clone(), Status::Lir);
        self.lir_count += 1;
        while self.lir_count > self.lir_capacity {
            if !self.demote_bottom() {
                break;
            }
        }
    }

    /// Turn the bottom LIR key into a resident HIR key.
    fn demote_bottom(&mut self) -> bool {
        self.prune();
        let Some(key) = self.stack.pop_front() else {
            return false;
        };
        self.status.insert(key.clone(), Status::ResidentHir);
        self.lir_count -= 1;
        self.cold.push_back(key);
        self.prune();
        true
    }

    /// Drop non-LIR keys from the stack bottom. Dropped ghosts are forgotten entirely.
    fn prune(&mut self) {
        while let Some(bottom) = self.stack.front() {
            match self.status.get(bottom) {
                Some(Status::Lir) => break,
                Some(Status::Ghost) => {
                    let Some(key) = self.stack.pop_front() else { break };
                    self.ghosts.remove(&key);
                    self.status.remove(&key);
                }
                _ => {
                    self.stack.pop_front();
                }
            }
        }
    }

    fn bury(&mut self, key: K) {
        self.status.insert(key.clone(), Status::Ghost);
        self.ghosts.push_back(key);
        while self.ghosts.len() > self.ghost_capacity {
            let Some(ghost) = self.ghosts.pop_front() else { break };
            self.stack.remove(&ghost);
            self.status.remove(&ghost);
        }
    }
}

impl<K> Eviction for Lirs<K>
where
    K: Key,
{
    type Key = K;
    type Config = LirsConfig;

    const TRACKS_ACCESS: bool = true;

    fn new(capacity: usize, config: &Self::Config) -> Self {
        let hir_capacity = ((capacity as f64 * config.hir_ratio) as usize).max(1);
        let lir_capacity = capacity.saturating_sub(hir_capacity);
        Self {
            stack: SequenceQueue::default(),
            cold: SequenceQueue::default(),
            ghosts: SequenceQueue::default(),
            status: HashMap::new(),
            lir_count: 0,
            lir_capacity,
            ghost_capacity: capacity.max(1),
        }
    }

    fn push(&mut self, key: Self::Key) {
        match self.status.get(&key).copied() {
            Some(Status::Lir) | Some(Status::ResidentHir) => self.access(&key),
            Some(Status::Ghost) => {
                // Re-referenced within the stack: its reuse distance beats the bottom LIR key.
                self.ghosts.remove(&key);
                self.stack.push_back(key.clone());
                self.promote(&key);
            }
            None if self.lir_count < self.lir_capacity => {
                self.status.insert(key.clone(), Status::Lir);
                self.lir_count += 1;
                self.stack.push_back(key);
            }
            None => {
                self.status.insert(key.clone(), Status::ResidentHir);
                self.stack.push_back(key.clone());
                self.cold.push_back(key);
            }
        }
    }

    fn access(&mut self, key: &Self::Key) {
        match self.status.get(key).copied() {
            Some(Status::Lir) => {
                let bottom = self.stack.front() == Some(key);
                self.stack.touch(key);
                if bottom {
                    self.prune();
                }
            }
            Some(Status::ResidentHir) if self.stack.contains(key) => {
                self.stack.touch(key);
                self.cold.remove(key);
                self.promote(key);
            }
            Some(Status::ResidentHir) => {
                self.stack.push_back(key.clone());
                self.cold.touch(key);
            }
            Some(Status::Ghost) | None => {}
        }
    }

    fn remove(&mut self, key: &Self::Key) {
        match self.status.remove(key) {
            Some(Status::Lir) => {
                self.lir_count -= 1;
                self.stack.remove(key);
                self.prune();
            }
            Some(Status::ResidentHir) => {
                self.stack.remove(key);
                self.cold.remove(key);
            }
            Some(Status::Ghost) => {
                self.stack.remove(key);
                self.ghosts.remove(key);
            }
            None => {}
        }
    }

    fn pop(&mut self) -> Option<Self::Key> {
        if let Some(key) = self.cold.pop_front() {
            if self.stack.contains(&key) {
                self.bury(key.clone());
            } else {
                self.status.remove(&key);
            }
            return Some(key);
        }

        // No cold key left, fall back to the least recent hot key.
        self.prune();
        let key = self.stack.pop_front()?;
        self.status.remove(&key);
        self.lir_count -= 1;
        self.prune();
        Some(key)
    }

    fn len(&self) -> usize {
        self.lir_count + self.cold.len()
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.cold.clear();
        self.ghosts.clear();
        self.status.clear();
        self.lir_count = 0;
    }
}
