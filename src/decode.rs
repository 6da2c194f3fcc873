//! Decode a batch file back into readable JSON.

use std::fs;
use std::path::Path;

use retrace_batcher::inflate;
use retrace_protocols::{from_wire, UploadPayload};

pub(crate) fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let compressed = fs::read(file)?;
    let raw = String::from_utf8(inflate(&compressed)?)?;
    let payload: UploadPayload = serde_json::from_str(&raw)?;

    println!(
        "impression {} sequence {} time {:.1} ({} events)",
        payload.envelope.impression_id,
        payload.envelope.sequence_number,
        payload.envelope.time,
        payload.events.len(),
    );
    if let Some(metadata) = &payload.metadata {
        println!(
            "session: {} via {} (agent {})",
            metadata.page_url, metadata.user_agent, metadata.agent_version
        );
    }
    for wire in &payload.events {
        let event = from_wire(wire)?;
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}
