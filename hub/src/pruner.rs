// hub/src/pruner.rs
//
// Periodic background sweep (§4.6), grounded directly on the teacher's
// housekeeping_loop: wake on a fixed interval, take the write lock just
// long enough to trim, go back to sleep. Exits promptly on shutdown
// rather than looping forever inside a detached task.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::watch;
use tracing::info;

use crate::pipeline::Pipeline;

pub async fn run(pipeline: Arc<Pipeline>, mut shutdown: watch::Receiver<bool>) {
    let interval = StdDuration::from_secs(pipeline.config().prune_interval_seconds);
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; skip it

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let before = pipeline.graph.stats().total_observations;
                pipeline.prune();
                let after = pipeline.graph.stats().total_observations;
                if before != after {
                    info!(evicted = before - after, "pruner evicted stale observations");
                }
            }
            _ = shutdown.changed() => {
                info!("pruner shutting down");
                break;
            }
        }
    }
}
