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


//! Transactional writes: lock the keys through the lock coordinator, write the cache, release.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use grid::{
    Address, Cache, CacheBuilder, ErrorKind, EvictionStrategy, GlobalTransaction, InvocationContext, LockRequest,
    LockTable, Result, TxBoundary, VisitableCommand,
};
use itertools::Itertools;

const THREADS: u64 = 8;
const INCREMENTS: u64 = 200;

struct Node {
    address: Address,
    next_tx: AtomicU64,
    locks: Arc<LockTable<String>>,
    cache: Cache<String, u64>,
}

impl Node {
    fn begin(&self) -> TxBoundary {
        TxBoundary::new(GlobalTransaction::new(
            self.address.clone(),
            self.next_tx.fetch_add(1, Ordering::Relaxed),
        ))
    }

    /// Read-modify-write `keys` in one transaction.
    fn increment(&self, keys: &[&str]) -> Result<()> {
        let boundary = self.begin();
        let keys = keys.iter().map(|key| key.to_string()).collect_vec();
        let mut ctx = InvocationContext::for_transaction(boundary.gtx().clone());

        let lock = LockRequest::acquire(boundary.clone(), keys.clone());
        lock.accept_visitor(&mut ctx, &self.locks)?;
        assert!(keys.iter().all(|key| ctx.has_locked_key(key)));

        for key in &keys {
            let current = self.cache.get(key).map(|entry| *entry).unwrap_or_default();
            self.cache.insert(key.clone(), current + 1);
        }

        let unlock = LockRequest::release(boundary, keys);
        unlock.accept_visitor(&mut ctx, &self.locks)?;
        assert!(ctx.locked_keys().is_empty());
        Ok(())
    }
}

fn node(timeout: Duration) -> Arc<Node> {
    Arc::new(Node {
        address: Address::new("node-1"),
        next_tx: AtomicU64::new(0),
        locks: Arc::new(LockTable::new(timeout)),
        cache: CacheBuilder::new(1024)
            .with_strategy(EvictionStrategy::Lru)
            .with_wake_up_interval(Duration::from_millis(50))
            .build()
            .unwrap(),
    })
}

#[test_log::test]
fn test_no_lost_updates_under_locks() {
    let node = node(Duration::from_secs(10));

    let handles = (0..THREADS)
        .map(|t| {
            let node = node.clone();
            thread::spawn(move || {
                let own = format!("own-{t}");
                for _ in 0..INCREMENTS {
                    node.increment(&["counter", &own]).unwrap();
                }
            })
        })
        .collect_vec();
    handles.into_iter().for_each(|handle| handle.join().unwrap());

    assert_eq!(*node.cache.get("counter").unwrap(), THREADS * INCREMENTS);
    for t in 0..THREADS {
        assert_eq!(*node.cache.get(&format!("own-{t}")).unwrap(), INCREMENTS);
    }
    assert_eq!(node.locks.locked_count(), 0);
}

#[test_log::test]
fn test_conflict_leaves_no_partial_locks() {
    let node = node(Duration::ZERO);

    let holder = node.begin();
    let mut holder_ctx = InvocationContext::for_transaction(holder.gtx().clone());
    LockRequest::acquire(holder.clone(), ["held".to_string()])
        .accept_visitor(&mut holder_ctx, &node.locks)
        .unwrap();

    let contender = node.begin();
    let mut ctx = InvocationContext::for_transaction(contender.gtx().clone());
    let err = LockRequest::acquire(contender.clone(), ["free".to_string(), "held".to_string()])
        .accept_visitor(&mut ctx, &node.locks)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LockConflict);
    assert!(ctx.locked_keys().is_empty());
    assert!(!node.locks.is_locked(&"free".to_string()));
    assert_eq!(node.locks.owner(&"held".to_string()).as_ref(), Some(holder.gtx()));

    // the contender cannot release what it does not hold
    LockRequest::release(contender.clone(), ["held".to_string()])
        .accept_visitor(&mut ctx, &node.locks)
        .unwrap();
    assert!(node.locks.is_locked(&"held".to_string()));

    LockRequest::release(holder, ["held".to_string()])
        .accept_visitor(&mut holder_ctx, &node.locks)
        .unwrap();
    assert_eq!(node.locks.locked_count(), 0);

    // an empty request is a no-op for the coordinator
    LockRequest::<String>::acquire(contender, [])
        .accept_visitor(&mut ctx, &node.locks)
        .unwrap();
    assert_eq!(node.locks.locked_count(), 0);
}
