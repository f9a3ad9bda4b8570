// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod forest;
pub mod fs;
pub mod logging;
pub mod snapshot;
pub mod types;

mod tree;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::errors::{PollwatchError, Result};
use crate::events::{ChannelSink, FileEvent};
use crate::forest::WatchForest;
use crate::types::{LinkPolicy, WatchOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or direct positional paths)
/// - the watch forest
/// - a channel sink printing events to stdout
/// - the poll ticker and Ctrl-C handling
///
/// The engine itself owns no timing; this loop is the external scheduler
/// driving it.
pub async fn run(args: CliArgs) -> Result<()> {
    let plan = build_plan(&args)?;

    let mut forest = WatchForest::new();
    let (sink, rx) = ChannelSink::pair();
    for (path, options) in &plan.watches {
        let id = forest.add_watch(path, Box::new(sink.clone()), options.clone())?;
        info!(watch = %id, path = ?path, "watch registered");
    }
    drop(sink);

    if args.once {
        forest.poll();
        print_pending(&rx);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(plan.interval_ms));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                forest.poll();
                print_pending(&rx);
            }
            res = tokio::signal::ctrl_c() => {
                res.map_err(PollwatchError::Io)?;
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

struct WatchPlan {
    interval_ms: u64,
    watches: Vec<(PathBuf, WatchOptions)>,
}

/// Turn CLI arguments into a list of watches and a poll cadence.
///
/// Positional paths take precedence over the config file; they are
/// canonicalized here because the forest insists on absolute roots.
fn build_plan(args: &CliArgs) -> Result<WatchPlan> {
    if let Some(0) = args.interval_ms {
        return Err(PollwatchError::Config(
            "--interval-ms must be >= 1".to_string(),
        ));
    }

    if !args.paths.is_empty() {
        let options = WatchOptions {
            recursive: true,
            link_policy: LinkPolicy {
                follow_symlinks: args.follow_symlinks,
                allow_out_of_root: false,
            },
            content_hash: args.content_hash,
            exclude: Vec::new(),
        };
        let mut watches = Vec::with_capacity(args.paths.len());
        for path in &args.paths {
            let absolute = std::fs::canonicalize(path)?;
            watches.push((absolute, options.clone()));
        }
        return Ok(WatchPlan {
            interval_ms: args.interval_ms.unwrap_or(1000),
            watches,
        });
    }

    let cfg = load_and_validate(&args.config)?;
    debug!(config = %args.config, watches = cfg.watches.len(), "loaded config file");

    let watches = cfg
        .watches
        .iter()
        .map(|section| {
            (
                PathBuf::from(&section.path),
                cfg.watch_options(section),
            )
        })
        .collect();
    Ok(WatchPlan {
        interval_ms: args.interval_ms.unwrap_or(cfg.config.interval_ms),
        watches,
    })
}

fn print_pending(rx: &Receiver<FileEvent>) {
    while let Ok(event) = rx.try_recv() {
        println!("{event}");
    }
}
