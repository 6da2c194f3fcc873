//! Batch framing: envelopes, payloads, and the cross-context messages.

use serde::{Deserialize, Serialize};

use crate::event::AgentEvent;

/// Framing header attached to every batched payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub impression_id: String,
    /// Gap-free, starting at 0 per session. Sorting on this reassembles the
    /// causal order.
    pub sequence_number: u64,
    /// Wall-clock milliseconds at flush time.
    pub time: f64,
}

/// Session identity shipped only with sequence number 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub impression_id: String,
    pub page_url: String,
    pub user_agent: String,
    /// Wall-clock milliseconds at session start.
    pub started_at: f64,
    pub agent_version: String,
}

/// The uploaded document, pre-compression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    pub envelope: Envelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,
    /// Events in positional-array projection.
    pub events: Vec<serde_json::Value>,
}

/// Messages from the foreground pipeline to the background batcher.
///
/// Delivered in `add_event` call order; `Shutdown` is always last, so the
/// batcher drains naturally before exiting.
#[derive(Debug)]
pub enum BatcherMessage {
    AddEvent { event: AgentEvent, time: f64 },
    ForceCompression { time: f64 },
    Shutdown,
}

/// A framed, compressed batch emitted back to the foreground.
#[derive(Debug, Clone)]
pub struct CompressedBatch {
    pub sequence_number: u64,
    /// Opaque gzip bytes of the serialized payload.
    pub compressed: Vec<u8>,
    /// The uncompressed payload string, retained for the upload fallback.
    pub raw: String,
    pub event_count: usize,
}
