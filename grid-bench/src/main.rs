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


//! Drive concurrent writers against a bounded cache and report whether it settles at its bound.

mod args;
mod report;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail, Context};
use args::Args;
use clap::Parser;
use grid::{Cache, CacheBuilder};
use rand::Rng;
use report::Report;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

fn init_logger() {
    use tracing_subscriber::{prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_line_number(true))
        .with(EnvFilter::from_default_env())
        .init();
}

#[cfg(feature = "deadlock")]
fn detect_deadlocks() {
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(1));
        let deadlocks = parking_lot::deadlock::check_deadlock();
        if deadlocks.is_empty() {
            continue;
        }

        tracing::error!("[bench]: {} deadlocks detected", deadlocks.len());
        for (i, threads) in deadlocks.iter().enumerate() {
            tracing::error!("[bench]: deadlock #{i}");
            for t in threads {
                tracing::error!("[bench]: thread id {:#?}\n{:#?}", t.thread_id(), t.backtrace());
            }
        }
        std::process::exit(1);
    });
}

fn write(cache: Cache<u64, u64>, stop: Arc<AtomicBool>, key_space: u64) -> u64 {
    let mut rng = rand::rng();
    let mut inserts = 0;
    while !stop.load(Ordering::Relaxed) {
        cache.insert(rng.random_range(0..key_space), inserts);
        inserts += 1;
    }
    inserts
}

/// Wait for the cache to reach its bound. Returns how long it took.
fn settle(cache: &Cache<u64, u64>, timeout: Duration) -> Option<Duration> {
    let Some(max) = cache.max_entries() else {
        return Some(Duration::ZERO);
    };
    let start = Instant::now();
    loop {
        let len = cache.len();
        if len <= max {
            return Some(start.elapsed());
        }
        if start.elapsed() >= timeout {
            tracing::warn!("[bench]: gave up after {timeout:?} with {len} entries over a bound of {max}");
            return None;
        }
        tracing::trace!("[bench]: {len} entries over a bound of {max}");
        thread::sleep(SAMPLE_INTERVAL);
    }
}

fn run(args: &Args, cache: &Cache<u64, u64>) -> anyhow::Result<Report> {
    let stop = Arc::new(AtomicBool::new(false));

    let start = Instant::now();
    let writers = (0..args.writers)
        .map(|i| {
            let cache = cache.clone();
            let stop = stop.clone();
            let key_space = args.key_space;
            thread::Builder::new()
                .name(format!("grid-bench-writer-{i}"))
                .spawn(move || write(cache, stop, key_space))
        })
        .collect::<std::io::Result<Vec<JoinHandle<u64>>>>()
        .context("failed to spawn writers")?;

    let mut peak_len = 0;
    while start.elapsed() < args.duration {
        peak_len = peak_len.max(cache.len());
        thread::sleep(SAMPLE_INTERVAL.min(args.duration.saturating_sub(start.elapsed())));
    }
    stop.store(true, Ordering::Relaxed);

    let mut inserts = 0;
    for writer in writers {
        inserts += writer.join().map_err(|_| anyhow!("writer panicked"))?;
    }
    let write_elapsed = start.elapsed();
    peak_len = peak_len.max(cache.len());
    tracing::debug!("[bench]: writers stopped after {inserts} inserts, {} entries", cache.len());

    let settled = settle(cache, args.settle_timeout);

    Ok(Report {
        strategy: cache.strategy(),
        max_entries: cache.max_entries(),
        writers: args.writers,
        inserts,
        write_millis: write_elapsed.as_millis() as u64,
        peak_len,
        final_len: cache.len(),
        settle_millis: settled.map(|elapsed| elapsed.as_millis() as u64),
        metrics: cache.metrics().snapshot(),
    })
}

fn main() -> anyhow::Result<()> {
    init_logger();

    #[cfg(feature = "deadlock")]
    detect_deadlocks();

    let args = Args::parse();
    args.validate()?;
    tracing::info!("[bench]: {args:?}");

    let cache: Cache<u64, u64> = CacheBuilder::new(args.max_entries)
        .with_strategy(args.strategy)
        .with_wake_up_interval(args.wake_up_interval)
        .with_lock_striping(args.lock_striping)
        .with_shards(args.shards)
        .build()
        .context("failed to build cache")?;

    let report = run(&args, &cache)?;
    cache.stop();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    if !report.settled() {
        bail!(
            "cache did not settle at {} entries within {}",
            args.max_entries,
            humantime::format_duration(args.settle_timeout)
        );
    }
    Ok(())
}
