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

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Operation counters of a cache. All counters are relaxed.
#[derive(Debug, Default)]
pub struct Metrics {
    insert: AtomicU64,
    replace: AtomicU64,
    hit: AtomicU64,
    miss: AtomicU64,
    remove: AtomicU64,
    evict: AtomicU64,
    sweep: AtomicU64,
}

macro_rules! counter {
    ($($name:ident),*) => {
        impl Metrics {
            $(
                pub(crate) fn $name(&self, n: u64) {
                    self.$name.fetch_add(n, Ordering::Relaxed);
                }
            )*

            /// Point-in-time copy of all counters.
            pub fn snapshot(&self) -> MetricsSnapshot {
                MetricsSnapshot {
                    $($name: self.$name.load(Ordering::Relaxed),)*
                }
            }
        }
    };
}

counter! { insert, replace, hit, miss, remove, evict, sweep }

/// A copy of [`Metrics`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Inserts of absent keys.
    pub insert: u64,
    /// Inserts that overwrote a present key.
    pub replace: u64,
    /// Lookups that found an entry.
    pub hit: u64,
    /// Lookups that found nothing.
    pub miss: u64,
    /// Explicit removals.
    pub remove: u64,
    /// Entries evicted, inline or by the sweeper.
    pub evict: u64,
    /// Sweeps run, including ones that evicted nothing.
    pub sweep: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = Metrics::default();
        metrics.insert(3);
        metrics.hit(1);
        metrics.evict(2);
        metrics.evict(1);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                insert: 3,
                hit: 1,
                evict: 3,
                ..Default::default()
            }
        );
    }
}
