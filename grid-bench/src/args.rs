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


use std::time::Duration;

use clap::Parser;
use grid::EvictionStrategy;

/// Argument errors the parser cannot express on its own.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    /// A bounded strategy needs room for at least one entry.
    #[error("\"--max-entries\" must be positive with strategy {0}")]
    ZeroCapacity(EvictionStrategy),
    /// No writer would run.
    #[error("\"--writers\" must be positive")]
    NoWriters,
    /// Lock striping needs at least one shard.
    #[error("\"--shards\" must be positive")]
    NoShards,
    /// The key space is empty.
    #[error("\"--key-space\" must be positive")]
    EmptyKeySpace,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Capacity bound of the cache.
    #[arg(long, default_value_t = 1)]
    pub max_entries: usize,

    /// Eviction strategy.
    #[arg(long, value_enum, default_value_t = EvictionStrategy::Unordered)]
    pub strategy: EvictionStrategy,

    /// Period of the background sweep. "0s" disables it.
    #[arg(long, value_parser = humantime::parse_duration, default_value = "100ms")]
    pub wake_up_interval: Duration,

    /// Concurrent writer threads.
    #[arg(long, default_value_t = 20)]
    pub writers: usize,

    /// How long the writers run.
    #[arg(long, value_parser = humantime::parse_duration, default_value = "250ms")]
    pub duration: Duration,

    /// How long to wait for the cache to settle at its bound after the writers stop.
    #[arg(long, value_parser = humantime::parse_duration, default_value = "60s")]
    pub settle_timeout: Duration,

    /// Partition entries over independently locked shards.
    #[arg(long, default_value_t = false)]
    pub lock_striping: bool,

    /// Shard count with lock striping.
    #[arg(long, default_value_t = 16)]
    pub shards: usize,

    /// Writers draw keys uniformly from `0..key-space`.
    #[arg(long, default_value_t = u64::MAX)]
    pub key_space: u64,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Args {
    /// Reject combinations that cannot run.
    pub fn validate(&self) -> Result<(), ArgsError> {
        if self.strategy.is_enabled() && self.max_entries == 0 {
            return Err(ArgsError::ZeroCapacity(self.strategy));
        }
        if self.writers == 0 {
            return Err(ArgsError::NoWriters);
        }
        if self.lock_striping && self.shards == 0 {
            return Err(ArgsError::NoShards);
        }
        if self.key_space == 0 {
            return Err(ArgsError::EmptyKeySpace);
        }
        Ok(())
    }
}
