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

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use ahash::RandomState;
use grid_common::{
    code::{HashBuilder, Key},
    error::{Error, ErrorKind, Result},
};
use hashbrown::HashMap;
use itertools::Itertools;
use parking_lot::{Condvar, Mutex};

use crate::{
    command::{TransactionBoundaryCommand, Visitor},
    context::InvocationContext,
    lock_request::{LockMode, LockRequest},
    tx::GlobalTransaction,
};

/// Default stripe count of [`LockTable`].
pub const DEFAULT_LOCK_STRIPES: usize = 64;

#[derive(Debug)]
struct Stripe<K>
where
    K: Key,
{
    owners: Mutex<HashMap<K, GlobalTransaction>>,
    released: Condvar,
}

#[derive(Debug, PartialEq, Eq)]
enum Grant {
    Fresh,
    Reentrant,
}

/// An in-process lock coordinator.
///
/// Each key is owned by at most one transaction. Locks are reentrant per transaction: acquiring an owned key again is
/// a no-op, and a single release frees it. A request is granted as a whole or not at all.
///
/// Owners are partitioned over independently locked stripes. A blocked acquisition waits on its stripe until a
/// release or the lock acquisition timeout.
pub struct LockTable<K, S = RandomState>
where
    K: Key,
    S: HashBuilder,
{
    stripes: Vec<Stripe<K>>,
    hash_builder: S,
    timeout: Duration,
}

impl<K, S> Debug for LockTable<K, S>
where
    K: Key,
    S: HashBuilder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockTable")
            .field("stripes", &self.stripes.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<K> LockTable<K, RandomState>
where
    K: Key,
{
    /// Create a lock table that waits up to `timeout` for a contended key.
    ///
    /// A zero timeout fails fast with [`ErrorKind::LockConflict`]. A timeout too large to be a deadline, e.g.
    /// [`Duration::MAX`], waits until the key is released.
    pub fn new(timeout: Duration) -> Self {
        Self::with_hash_builder(DEFAULT_LOCK_STRIPES, timeout, RandomState::default())
    }
}

impl<K, S> LockTable<K, S>
where
    K: Key,
    S: HashBuilder,
{
    /// Create a lock table with `stripes` stripes. A zero stripe count is raised to one.
    pub fn with_hash_builder(stripes: usize, timeout: Duration, hash_builder: S) -> Self {
        let stripes = (0..stripes.max(1))
            .map(|_| Stripe {
                owners: Mutex::new(HashMap::new()),
                released: Condvar::new(),
            })
            .collect_vec();
        Self {
            stripes,
            hash_builder,
            timeout,
        }
    }

    fn stripe(&self, key: &K) -> &Stripe<K> {
        let hash = self.hash_builder.hash_one(key);
        &self.stripes[hash as usize % self.stripes.len()]
    }

    /// Lock acquisition timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current owner of `key`.
    pub fn owner(&self, key: &K) -> Option<GlobalTransaction> {
        self.stripe(key).owners.lock().get(key).cloned()
    }

    /// Whether any transaction owns `key`.
    pub fn is_locked(&self, key: &K) -> bool {
        self.stripe(key).owners.lock().contains_key(key)
    }

    /// Count of locked keys over all stripes.
    pub fn locked_count(&self) -> usize {
        self.stripes.iter().map(|stripe| stripe.owners.lock().len()).sum()
    }

    /// Lock all `keys` for `gtx`, or none of them.
    ///
    /// Returns the keys newly locked by this call, keys already owned by `gtx` excluded. On failure the keys locked
    /// by this call are released again and keys owned before the call are kept.
    pub fn acquire(&self, gtx: &GlobalTransaction, keys: &[K]) -> Result<Vec<K>> {
        // `None` waits without a deadline.
        let deadline = Instant::now().checked_add(self.timeout);
        let mut granted = vec![];

        for key in keys.iter().unique() {
            match self.acquire_one(gtx, key, deadline) {
                Ok(Grant::Fresh) => granted.push(key.clone()),
                Ok(Grant::Reentrant) => {}
                Err(e) => {
                    self.release(gtx, &granted);
                    return Err(e);
                }
            }
        }

        tracing::debug!("[lock table]: {gtx} acquired {} keys", granted.len());
        Ok(granted)
    }

    fn acquire_one(&self, gtx: &GlobalTransaction, key: &K, deadline: Option<Instant>) -> Result<Grant> {
        let stripe = self.stripe(key);
        let mut owners = stripe.owners.lock();
        let mut timed_out = false;

        loop {
            match owners.get(key) {
                None => {
                    owners.insert(key.clone(), gtx.clone());
                    return Ok(Grant::Fresh);
                }
                Some(owner) if owner == gtx => return Ok(Grant::Reentrant),
                Some(owner) if self.timeout.is_zero() => {
                    return Err(Error::new(ErrorKind::LockConflict, "key is locked by another transaction")
                        .with_context("key", format!("{key:?}"))
                        .with_context("owner", owner)
                        .with_context("requester", gtx));
                }
                Some(owner) if timed_out => {
                    tracing::warn!("[lock table]: {gtx} timed out waiting for {key:?} held by {owner}");
                    return Err(Error::new(ErrorKind::LockTimeout, "timed out waiting for the lock")
                        .with_context("key", format!("{key:?}"))
                        .with_context("owner", owner)
                        .with_context("requester", gtx)
                        .with_context("timeout", format!("{:?}", self.timeout)));
                }
                Some(_) => match deadline {
                    Some(deadline) => timed_out = stripe.released.wait_until(&mut owners, deadline).timed_out(),
                    None => stripe.released.wait(&mut owners),
                },
            }
        }
    }

    /// Release `keys` owned by `gtx`. Keys owned by other transactions or not locked at all are ignored.
    ///
    /// Returns the count of released keys.
    pub fn release(&self, gtx: &GlobalTransaction, keys: &[K]) -> usize {
        let mut released = 0;
        for (index, chunk) in &keys
            .iter()
            .unique()
            .chunk_by(|key| self.hash_builder.hash_one(key) as usize % self.stripes.len())
        {
            let stripe = &self.stripes[index];
            let mut owners = stripe.owners.lock();
            let before = released;
            for key in chunk {
                if owners.get(key) == Some(gtx) {
                    owners.remove(key);
                    released += 1;
                }
            }
            drop(owners);
            if released > before {
                stripe.released.notify_all();
            }
        }
        tracing::trace!("[lock table]: {gtx} released {released} keys");
        released
    }

    /// Release every key owned by `gtx`, e.g. on rollback.
    pub fn release_all(&self, gtx: &GlobalTransaction) -> Vec<K> {
        let mut released = vec![];
        for stripe in self.stripes.iter() {
            let mut owners = stripe.owners.lock();
            let before = released.len();
            owners.retain(|key, owner| {
                if owner == gtx {
                    released.push(key.clone());
                    false
                } else {
                    true
                }
            });
            drop(owners);
            if released.len() > before {
                stripe.released.notify_all();
            }
        }
        released
    }
}

impl<K, S> Visitor<K> for LockTable<K, S>
where
    K: Key,
    S: HashBuilder,
{
    type Output = ();

    fn visit_lock_request(&self, ctx: &mut InvocationContext<K>, cmd: &LockRequest<K>) -> Result<()> {
        if cmd.keys().is_empty() {
            return Ok(());
        }
        let gtx = cmd.boundary().gtx();
        match cmd.mode() {
            LockMode::Acquire => {
                // Reentrant keys are recorded too, they may predate the context.
                self.acquire(gtx, cmd.keys())?;
                ctx.add_locked_keys(cmd.keys().iter().cloned());
            }
            LockMode::Release => {
                self.release(gtx, cmd.keys());
                ctx.remove_locked_keys(cmd.keys());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;
    use crate::{
        command::VisitableCommand,
        tx::{Address, TxBoundary},
    };

    fn gtx(id: u64) -> GlobalTransaction {
        GlobalTransaction::new(Address::new("node-1"), id)
    }

    fn request(id: u64, keys: &[u64], mode: LockMode) -> LockRequest<u64> {
        LockRequest::new(TxBoundary::new(gtx(id)), keys.iter().copied(), mode)
    }

    #[test_log::test]
    fn test_acquire_release() {
        let table = LockTable::<u64>::new(Duration::ZERO);

        assert_eq!(table.acquire(&gtx(1), &[1, 2, 2, 3]).unwrap(), vec![1, 2, 3]);
        assert_eq!(table.locked_count(), 3);
        assert_eq!(table.owner(&2), Some(gtx(1)));

        // reentrant
        assert_eq!(table.acquire(&gtx(1), &[3, 4]).unwrap(), vec![4]);

        // foreign releases are ignored
        assert_eq!(table.release(&gtx(2), &[1, 2, 3, 4]), 0);
        assert_eq!(table.release(&gtx(1), &[1, 5]), 1);
        assert!(!table.is_locked(&1));

        let mut released = table.release_all(&gtx(1));
        released.sort();
        assert_eq!(released, vec![2, 3, 4]);
        assert_eq!(table.locked_count(), 0);
    }

    #[test_log::test]
    fn test_all_or_nothing() {
        let table = LockTable::<u64>::with_hash_builder(4, Duration::ZERO, RandomState::default());
        table.acquire(&gtx(2), &[5]).unwrap();
        table.acquire(&gtx(1), &[1]).unwrap();

        let err = table.acquire(&gtx(1), &[1, 2, 3, 5, 6]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LockConflict);

        // keys granted before the conflict are rolled back, keys owned before the call are kept
        assert!(!table.is_locked(&2) && !table.is_locked(&3) && !table.is_locked(&6));
        assert_eq!(table.owner(&1), Some(gtx(1)));
        assert_eq!(table.owner(&5), Some(gtx(2)));
    }

    #[test_log::test]
    fn test_timeout() {
        let table = LockTable::<u64>::new(Duration::from_millis(50));
        table.acquire(&gtx(1), &[1]).unwrap();

        let start = Instant::now();
        let err = table.acquire(&gtx(2), &[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LockTimeout);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test_log::test]
    fn test_wait_for_release() {
        let table = Arc::new(LockTable::<u64>::new(Duration::from_secs(10)));
        table.acquire(&gtx(1), &[1, 2]).unwrap();

        let acquired = Arc::new(AtomicBool::new(false));
        let handle = {
            let table = table.clone();
            let acquired = acquired.clone();
            std::thread::spawn(move || {
                table.acquire(&gtx(2), &[2, 3]).unwrap();
                acquired.store(true, Ordering::Release);
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::Acquire));

        table.release(&gtx(1), &[1, 2]);
        handle.join().unwrap();
        assert!(acquired.load(Ordering::Acquire));
        assert_eq!(table.owner(&2), Some(gtx(2)));
        assert_eq!(table.owner(&3), Some(gtx(2)));
    }

    #[test_log::test]
    fn test_unbounded_timeout() {
        let table = Arc::new(LockTable::<u64>::new(Duration::MAX));
        assert_eq!(table.acquire(&gtx(1), &[1]).unwrap(), vec![1]);

        let acquired = Arc::new(AtomicBool::new(false));
        let handle = {
            let table = table.clone();
            let acquired = acquired.clone();
            std::thread::spawn(move || {
                table.acquire(&gtx(2), &[1]).unwrap();
                acquired.store(true, Ordering::Release);
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::Acquire));

        table.release(&gtx(1), &[1]);
        handle.join().unwrap();
        assert!(acquired.load(Ordering::Acquire));
        assert_eq!(table.owner(&1), Some(gtx(2)));
    }

    #[test_log::test]
    fn test_visit_lock_request() {
        let table = LockTable::<u64>::new(Duration::ZERO);
        let mut ctx = InvocationContext::for_transaction(gtx(1));

        request(1, &[], LockMode::Acquire).accept_visitor(&mut ctx, &table).unwrap();
        assert_eq!(table.locked_count(), 0);

        request(1, &[1, 2], LockMode::Acquire)
            .accept_visitor(&mut ctx, &table)
            .unwrap();
        assert!(ctx.has_locked_key(&1) && ctx.has_locked_key(&2));

        // a conflicting transaction fails and its context is untouched
        let mut other = InvocationContext::for_transaction(gtx(2));
        let err = request(2, &[2, 3], LockMode::Acquire)
            .accept_visitor(&mut other, &table)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LockConflict);
        assert!(other.locked_keys().is_empty());
        assert!(!table.is_locked(&3));

        request(1, &[1], LockMode::Release)
            .accept_visitor(&mut ctx, &table)
            .unwrap();
        assert!(!ctx.has_locked_key(&1));
        assert!(ctx.has_locked_key(&2));
        assert!(!table.is_locked(&1));
    }

    #[test_log::test]
    fn test_concurrent_transactions() {
        use rand::seq::SliceRandom;

        let table = Arc::new(LockTable::<u64>::new(Duration::from_secs(30)));
        let counters = Arc::new((0..8).map(|_| Mutex::new(0u64)).collect_vec());

        let handles = (0..8u64)
            .map(|t| {
                let table = table.clone();
                let counters = counters.clone();
                std::thread::spawn(move || {
                    let mut rng = rand::rng();
                    for round in 0..200u64 {
                        let gtx = gtx(t * 1000 + round);
                        let mut keys = (0..8u64).collect_vec();
                        keys.shuffle(&mut rng);
                        keys.truncate(3);
                        // sorted to stay deadlock free under waiting
                        keys.sort();
                        table.acquire(&gtx, &keys).unwrap();
                        for key in keys.iter() {
                            let mut counter = counters[*key as usize].try_lock().unwrap();
                            *counter += 1;
                        }
                        assert_eq!(table.release(&gtx, &keys), 3);
                    }
                })
            })
            .collect_vec();
        handles.into_iter().for_each(|handle| handle.join().unwrap());

        assert_eq!(counters.iter().map(|c| *c.lock()).sum::<u64>(), 8 * 200 * 3);
        assert_eq!(table.locked_count(), 0);
    }
}
