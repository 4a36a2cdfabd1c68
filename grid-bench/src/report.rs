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


use std::{fmt::Display, time::Duration};

use grid::{EvictionStrategy, MetricsSnapshot};
use serde::Serialize;

/// Outcome of one bench run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub strategy: EvictionStrategy,
    pub max_entries: Option<usize>,
    pub writers: usize,
    pub inserts: u64,
    pub write_millis: u64,
    /// Largest length sampled while the writers ran.
    pub peak_len: usize,
    pub final_len: usize,
    /// Time from the writers stopping to the cache reaching its bound. `None` if it never did.
    pub settle_millis: Option<u64>,
    pub metrics: MetricsSnapshot,
}

impl Report {
    pub fn settled(&self) -> bool {
        self.settle_millis.is_some()
    }

    fn throughput(&self) -> f64 {
        match self.write_millis {
            0 => 0.0,
            ms => self.inserts as f64 * 1000.0 / ms as f64,
        }
    }
}

fn millis(ms: u64) -> humantime::FormattedDuration {
    humantime::format_duration(Duration::from_millis(ms))
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = self.max_entries.map_or_else(|| "unbounded".to_string(), |max| max.to_string());
        writeln!(f, "strategy:       {}", self.strategy)?;
        writeln!(f, "max entries:    {bound}")?;
        writeln!(f, "writers:        {}", self.writers)?;
        writeln!(
            f,
            "inserts:        {} in {} ({:.0}/s)",
            self.inserts,
            millis(self.write_millis),
            self.throughput()
        )?;
        writeln!(f, "peak len:       {}", self.peak_len)?;
        writeln!(f, "final len:      {}", self.final_len)?;
        match self.settle_millis {
            Some(ms) => writeln!(f, "settled after:  {}", millis(ms))?,
            None => writeln!(f, "settled after:  never")?,
        }
        write!(
            f,
            "evicted:        {} ({} sweeps, {} replaced)",
            self.metrics.evict, self.metrics.sweep, self.metrics.replace
        )
    }
}
