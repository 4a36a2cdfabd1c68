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

use std::{fmt::Display, str::FromStr, time::Duration};

use grid_common::error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

use crate::eviction::lirs::LirsConfig;

/// Victim selection policy used when the cache exceeds its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum EvictionStrategy {
    /// Evict the least recently accessed entry.
    Lru,
    /// Evict cold entries before hot ("recently and frequently used") ones.
    Lirs,
    /// Evict the oldest inserted entry.
    Fifo,
    /// No ordering guarantee. Minimum-overhead bounding.
    Unordered,
    /// Never evict. The cache is unbounded.
    #[default]
    None,
}

impl EvictionStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [EvictionStrategy; 5] = [
        EvictionStrategy::Lru,
        EvictionStrategy::Lirs,
        EvictionStrategy::Fifo,
        EvictionStrategy::Unordered,
        EvictionStrategy::None,
    ];

    /// Whether the strategy ever evicts.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, EvictionStrategy::None)
    }

    fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "LRU",
            EvictionStrategy::Lirs => "LIRS",
            EvictionStrategy::Fifo => "FIFO",
            EvictionStrategy::Unordered => "UNORDERED",
            EvictionStrategy::None => "NONE",
        }
    }
}

impl Display for EvictionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::new(ErrorKind::Config, "unknown eviction strategy").with_context("given", s))
    }
}

/// Eviction configuration of a cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvictionConfig {
    /// Bound on live entries. Must be positive unless the strategy is [`EvictionStrategy::None`].
    pub max_entries: usize,
    /// Period of the background sweep in milliseconds. Zero or negative disables the sweep.
    pub wake_up_interval_millis: i64,
    /// Victim selection policy.
    pub strategy: EvictionStrategy,
    /// Partition the entries over independently locked shards.
    ///
    /// Striping reduces contention between writers on unrelated keys at the price of per-shard bookkeeping.
    /// Victims are then chosen per shard, so ordered strategies are only ordered within a shard.
    pub use_lock_striping: bool,
    /// LIRS tuning. Ignored by other strategies.
    pub lirs: LirsConfig,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            max_entries: 0,
            wake_up_interval_millis: 5000,
            strategy: EvictionStrategy::None,
            use_lock_striping: true,
            lirs: LirsConfig::default(),
        }
    }
}

impl EvictionConfig {
    /// Background sweep period, `None` if the sweep is disabled.
    pub fn wake_up_interval(&self) -> Option<Duration> {
        (self.wake_up_interval_millis > 0).then(|| Duration::from_millis(self.wake_up_interval_millis as u64))
    }

    /// Reject configurations the cache cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.strategy.is_enabled() && self.max_entries == 0 {
            return Err(Error::new(ErrorKind::Config, "max entries must be positive when eviction is enabled")
                .with_context("strategy", self.strategy)
                .with_context("max_entries", self.max_entries));
        }
        if self.strategy == EvictionStrategy::Lirs {
            self.lirs.validate()?;
        }
        Ok(())
    }
}
