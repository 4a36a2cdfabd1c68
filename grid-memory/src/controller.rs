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
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    thread::JoinHandle,
    time::Duration,
};

use flume::RecvTimeoutError;
use grid_common::error::{Error, Result};
use parking_lot::Mutex;

use crate::config::EvictionConfig;

/// A container the controller can bring back to its bound.
pub trait Sweep: Send + Sync + 'static {
    /// Evict down to the bound. Returns the count of evicted entries.
    fn sweep(&self) -> usize;
}

struct Sweeper {
    stop_tx: flume::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the size-bound policy of a cache.
///
/// The controller is `RUNNING` from construction until [`EvictionController::stop`], which is one-way. While running,
/// writers run the inline bound check themselves and a dedicated sweeper thread re-checks the bound every
/// `wake_up_interval`.
pub struct EvictionController {
    config: EvictionConfig,
    running: Arc<AtomicBool>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl std::fmt::Debug for EvictionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvictionController")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

impl EvictionController {
    /// Validate the configuration and create a running controller. The sweeper is not started yet.
    pub fn new(config: EvictionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            running: Arc::new(AtomicBool::new(true)),
            sweeper: Mutex::new(None),
        })
    }

    /// Start the background sweeper for `target`.
    ///
    /// No thread is spawned if the strategy never evicts or the sweep is disabled. The sweeper exits on its own once
    /// `target` is gone.
    pub fn start(&self, target: Weak<dyn Sweep>) -> Result<()> {
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() || !self.is_running() || !self.config.strategy.is_enabled() {
            return Ok(());
        }
        let Some(interval) = self.config.wake_up_interval() else {
            tracing::debug!("[eviction controller]: background sweep disabled");
            return Ok(());
        };

        let (stop_tx, stop_rx) = flume::bounded(1);
        let handle = std::thread::Builder::new()
            .name("grid-eviction-sweeper".to_string())
            .spawn(move || Self::run(target, stop_rx, interval))
            .map_err(Error::external)?;

        tracing::info!(
            "[eviction controller]: sweeper started, strategy: {}, interval: {:?}",
            self.config.strategy,
            interval
        );
        *sweeper = Some(Sweeper { stop_tx, handle });
        Ok(())
    }

    fn run(target: Weak<dyn Sweep>, stop_rx: flume::Receiver<()>, interval: Duration) {
        loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
            let Some(target) = target.upgrade() else { break };
            let evicted = target.sweep();
            if evicted > 0 {
                tracing::debug!("[eviction controller]: sweep evicted {evicted} entries");
            }
        }
        tracing::info!("[eviction controller]: sweeper exits");
    }

    /// Stop evicting and join the sweeper. Idempotent.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        let Some(Sweeper { stop_tx, handle }) = self.sweeper.lock().take() else {
            return;
        };
        drop(stop_tx);
        if handle.thread().id() == std::thread::current().id() {
            // Stopped from within a sweep. The loop sees the closed channel on its next wait.
            return;
        }
        if handle.join().is_err() {
            tracing::warn!("[eviction controller]: sweeper panicked");
        }
    }

    /// Whether the controller still enforces the bound.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Shared view of the running state for the write path.
    pub(crate) fn running(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &EvictionConfig {
        &self.config
    }
}

impl Drop for EvictionController {
    fn drop(&mut self) {
        self.stop();
    }
}
