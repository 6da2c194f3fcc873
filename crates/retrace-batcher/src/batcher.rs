//! The batching state machine.

use tokio::sync::mpsc;
use tracing::debug;

use retrace_protocols::{
    to_wire, AgentEvent, BatchError, CompressedBatch, Envelope, SessionMetadata, UploadPayload,
};

use crate::compress;

/// Accumulates events against a byte budget and emits framed batches.
///
/// Sequence numbers form a gap-free prefix of the naturals. A batch whose
/// only event is an `XhrError` diagnostic is withheld: shipping it would
/// let one failed upload breed another diagnostic, forever. The withheld
/// event stays in the batch and rides out with the next real one.
pub struct Batcher {
    impression_id: String,
    metadata: SessionMetadata,
    limit: usize,
    events: Vec<AgentEvent>,
    bytes: usize,
    sequence: u64,
    single_xhr_error: bool,
    out: mpsc::UnboundedSender<CompressedBatch>,
}

impl Batcher {
    pub fn new(
        impression_id: impl Into<String>,
        metadata: SessionMetadata,
        limit: usize,
        out: mpsc::UnboundedSender<CompressedBatch>,
    ) -> Self {
        Self {
            impression_id: impression_id.into(),
            metadata,
            limit,
            events: Vec::new(),
            bytes: 0,
            sequence: 0,
            single_xhr_error: false,
            out,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn pending_bytes(&self) -> usize {
        self.bytes
    }

    /// Accept one event. Flushes first when the event would overflow the
    /// budget, and again after when the batch has reached it (a lone
    /// oversize event ships by itself).
    pub fn add_event(&mut self, event: AgentEvent, time: f64) -> Result<(), BatchError> {
        let length = serde_json::to_string(&to_wire(&event))?.len();
        if self.bytes > 0 && self.bytes + length > self.limit {
            self.flush(time)?;
        }
        self.events.push(event);
        self.bytes += length;
        self.single_xhr_error = self.events.len() == 1 && self.events[0].is_xhr_error();
        if self.bytes >= self.limit {
            self.flush(time)?;
        }
        Ok(())
    }

    /// Flush whatever is pending.
    pub fn force(&mut self, time: f64) -> Result<(), BatchError> {
        self.flush(time)
    }

    fn flush(&mut self, time: f64) -> Result<(), BatchError> {
        if self.bytes == 0 {
            return Ok(());
        }
        if self.single_xhr_error {
            debug!("withholding lone upload-failure batch");
            return Ok(());
        }

        let envelope = Envelope {
            impression_id: self.impression_id.clone(),
            sequence_number: self.sequence,
            time,
        };
        let payload = UploadPayload {
            envelope,
            metadata: (self.sequence == 0).then(|| self.metadata.clone()),
            events: self.events.iter().map(to_wire).collect(),
        };
        let raw = serde_json::to_string(&payload)?;
        let compressed = compress::deflate(raw.as_bytes())?;
        debug!(
            sequence = self.sequence,
            events = self.events.len(),
            raw_bytes = raw.len(),
            compressed_bytes = compressed.len(),
            "batch flushed"
        );
        let batch = CompressedBatch {
            sequence_number: self.sequence,
            compressed,
            raw,
            event_count: self.events.len(),
        };
        if self.out.send(batch).is_err() {
            return Err(BatchError::ChannelClosed);
        }

        self.events.clear();
        self.bytes = 0;
        self.single_xhr_error = false;
        self.sequence += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "batcher_tests.rs"]
mod tests;
