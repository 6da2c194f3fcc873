//! # Retrace Batcher
//!
//! The background batching context. Runs on its own task so compression
//! never janks the foreground: events arrive over a channel in pipeline
//! order, accumulate against a byte budget, and leave as gzip-compressed,
//! gap-free-sequenced [`CompressedBatch`](retrace_protocols::CompressedBatch)
//! frames.

mod batcher;
mod compress;
mod worker;

pub use batcher::Batcher;
pub use compress::{deflate, inflate};
pub use worker::BatcherWorker;
