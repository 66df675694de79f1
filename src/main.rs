mod checkpoint;
mod config;
mod persistence;

use std::cell::RefCell;
use std::rc::Rc;

use tokio::task::LocalSet;

use crate::checkpoint::CheckpointTask;
use crate::config::Config;
use crate::persistence::{SnapshotFile, open_engine};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!(
        path = %config.snapshot_path.display(),
        checkpoint_ms = config.checkpoint_ms,
        preset_terrain = config.preset_terrain,
        start_x = config.start_cell.x,
        start_y = config.start_cell.y,
        "planboard configured"
    );

    let file = SnapshotFile::new(&config.snapshot_path);
    let engine = Rc::new(RefCell::new(open_engine(&file, &config)));

    LocalSet::new()
        .run_until(async move {
            let task = CheckpointTask::spawn(engine, file, config.checkpoint_delay());

            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");

            match task.stop().await {
                Ok(saved) => tracing::info!(saved, "planboard stopped"),
                Err(err) => tracing::error!(%err, "checkpoint task failed"),
            }
        })
        .await;
}
