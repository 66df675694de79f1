//! Periodic full-state checkpoint of the board.
//!
//! DESIGN
//! ======
//! The engine is single-threaded, so the task runs on the current thread's
//! `LocalSet` and shares the engine through `Rc<RefCell<_>>`. The borrow is
//! taken only for the synchronous `snapshot()` call and never held across an
//! await, so a checkpoint sees the whole board as of one point between input
//! events.
//!
//! Scheduling is fixed-delay: the next save starts `delay` after the previous
//! one finished. [`CheckpointTask::stop`] wakes the task, which writes one
//! final snapshot before exiting.

#[cfg(test)]
#[path = "checkpoint_test.rs"]
mod checkpoint_test;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use board::engine::Engine;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::persistence::SnapshotSink;

/// Handle to a running checkpoint task.
pub struct CheckpointTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl CheckpointTask {
    /// Start checkpointing `engine` into `sink`. The first save happens
    /// immediately. Must be called from within a `LocalSet`.
    pub fn spawn<S>(engine: Rc<RefCell<Engine>>, mut sink: S, delay: Duration) -> Self
    where
        S: SnapshotSink + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        info!(delay_ms, "checkpoint task started");

        let handle = tokio::task::spawn_local(async move {
            let mut saved = 0u64;
            loop {
                if save(&engine, &mut sink) {
                    saved += 1;
                }
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    _ = stop_rx.changed() => break,
                }
            }
            if save(&engine, &mut sink) {
                saved += 1;
            }
            info!(saved, "checkpoint task stopped");
            saved
        });

        Self { stop_tx, handle }
    }

    /// Stop the task after one final save. Returns the number of successful saves.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the task panicked or was aborted.
    pub async fn stop(self) -> Result<u64, JoinError> {
        if self.stop_tx.send(true).is_err() {
            debug!("checkpoint task already finished");
        }
        self.handle.await
    }
}

fn save<S: SnapshotSink>(engine: &RefCell<Engine>, sink: &mut S) -> bool {
    let snapshot = engine.borrow().snapshot();
    match sink.write(&snapshot) {
        Ok(()) => {
            debug!(
                objects = snapshot.placed_objects.len(),
                markers = snapshot.markers.len(),
                terrain = snapshot.terrain_cells.len(),
                "checkpoint written"
            );
            true
        }
        Err(err) => {
            error!(%err, "checkpoint write failed");
            false
        }
    }
}
