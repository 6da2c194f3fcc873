//! The upload seam: delivering compressed batches to the collector.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use retrace_pipeline::EventPipeline;
use retrace_protocols::{CompressedBatch, Instrumentation, UploadError};

/// Delivery seam to the collector endpoint.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Deliver one batch body. `compressed` tells the receiver whether the
    /// body is gzip or the raw fallback string.
    async fn deliver(
        &self,
        sequence_number: u64,
        body: &[u8],
        compressed: bool,
    ) -> Result<(), UploadError>;
}

/// HTTP collector client.
pub struct HttpCollector {
    client: reqwest::Client,
    url: String,
}

impl HttpCollector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn deliver(
        &self,
        sequence_number: u64,
        body: &[u8],
        compressed: bool,
    ) -> Result<(), UploadError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .query(&[("seq", sequence_number)]);
        if compressed {
            request = request.header("content-encoding", "gzip");
        }
        let response = request
            .body(body.to_vec())
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(UploadError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Drive uploads until the batch channel closes.
///
/// A failed compressed upload falls back to the retained raw string; only
/// when that fails too does an `XhrError` diagnostic enter the pipeline.
/// The batcher withholds a batch holding nothing but that diagnostic, so
/// one dead collector cannot breed an infinite report loop.
pub(crate) fn spawn_uploader(
    collector: Arc<dyn Collector>,
    mut rx: mpsc::UnboundedReceiver<CompressedBatch>,
    pipeline: Arc<EventPipeline>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            let sequence_number = batch.sequence_number;
            match collector
                .deliver(sequence_number, &batch.compressed, true)
                .await
            {
                Ok(()) => {
                    debug!(sequence_number, "batch uploaded");
                }
                Err(err) => {
                    warn!(sequence_number, "compressed upload failed: {err}; retrying raw");
                    if let Err(err) = collector
                        .deliver(sequence_number, batch.raw.as_bytes(), false)
                        .await
                    {
                        warn!(sequence_number, "raw upload failed: {err}");
                        pipeline.instrument(Instrumentation::XhrError {
                            status: err.status(),
                            sequence_number,
                        });
                    }
                }
            }
        }
        debug!("uploader exited");
    })
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
