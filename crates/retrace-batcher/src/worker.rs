//! The background worker task owning the batcher.

use tokio::sync::mpsc;
use tracing::{debug, error};

use retrace_protocols::{BatchError, BatcherMessage, CompressedBatch, SessionMetadata};

use crate::batcher::Batcher;

/// Spawns and drives a [`Batcher`] on its own task.
pub struct BatcherWorker;

impl BatcherWorker {
    /// Spawn the background context. The task consumes pipeline messages
    /// in order and exits after `Shutdown` (or after the sender drops),
    /// flushing pending events first so already-queued work drains
    /// gracefully.
    pub fn spawn(
        impression_id: impl Into<String>,
        metadata: SessionMetadata,
        limit: usize,
        mut rx: mpsc::UnboundedReceiver<BatcherMessage>,
        out: mpsc::UnboundedSender<CompressedBatch>,
    ) -> tokio::task::JoinHandle<()> {
        let mut batcher = Batcher::new(impression_id, metadata.clone(), limit, out);
        tokio::spawn(async move {
            let mut last_time = metadata.started_at;
            while let Some(message) = rx.recv().await {
                match message {
                    BatcherMessage::AddEvent { event, time } => {
                        last_time = time;
                        if let Err(err) = batcher.add_event(event, time) {
                            report(&err);
                        }
                    }
                    BatcherMessage::ForceCompression { time } => {
                        last_time = time;
                        if let Err(err) = batcher.force(time) {
                            report(&err);
                        }
                    }
                    BatcherMessage::Shutdown => break,
                }
            }
            if let Err(err) = batcher.force(last_time) {
                report(&err);
            }
            debug!(sequence = batcher.sequence(), "batcher worker exited");
        })
    }
}

fn report(err: &BatchError) {
    match err {
        BatchError::ChannelClosed => debug!("batch receiver gone; output dropped"),
        other => error!("batch failed: {other}"),
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
